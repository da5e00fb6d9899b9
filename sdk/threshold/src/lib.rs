//! Shade Threshold Tally
//!
//! Encrypted governance ballots decrypted by a t-of-n committee.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Encrypted Tally Flow                        │
//! │                                                                  │
//! │  1. Voters                 2. Anyone               3. Committee  │
//! │  ┌──────────┐              ┌──────────────┐        ┌──────────┐ │
//! │  │ Encrypt  │──ballots────▶│  Sum per     │──────▶ │ K-of-N   │ │
//! │  │ to P     │              │  option      │ totals │ shares   │ │
//! │  └──────────┘              └──────────────┘        └──────────┘ │
//! │                                                         │        │
//! │                                       DLEQ-checked, Lagrange    │
//! │                                       combined, small dlog      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod ballot;
pub mod committee;
pub mod dleq;
pub mod elgamal;
pub mod shares;

pub use ballot::{EncryptedBallot, tally};
pub use committee::{
    Committee, CommitteeConfig, CommitteeMember, DecryptionShare, LocalCommitteeMember,
    generate_committee,
};
pub use dleq::{DleqProof, WireDleqProof};
pub use elgamal::{ElGamalCiphertext, decrypt_to_point, recover_small};
pub use shares::{
    Share, ShareId, ThresholdError, WireShare, lagrange_coefficient, reconstruct_secret,
    split_secret,
};
