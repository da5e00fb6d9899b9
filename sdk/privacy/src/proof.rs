//! Groth16 Proof Encoding
//!
//! The on-chain verifier checks
//!
//! ```text
//! e(-A, B) · e(alpha, beta) · e(IC, gamma) · e(C, delta) == 1
//! ```
//!
//! so `A` is submitted negated. The 256-byte layout, every coordinate a
//! 32-byte big-endian BN254 base-field (`Fq`) element:
//!
//! ```text
//! [  0.. 32]  A.x
//! [ 32.. 64]  q - A.y
//! [ 64.. 96]  B.x.c1     imaginary part first
//! [ 96..128]  B.x.c0
//! [128..160]  B.y.c1
//! [160..192]  B.y.c0
//! [192..224]  C.x
//! [224..256]  C.y
//! ```
//!
//! Only `Fq` appears here. Commitment/hash values live in `Fr` and never mix
//! with these coordinates.

use ark_bn254::{Bn254, Fq};
use ark_ff::{BigInt, PrimeField, Zero};
use ark_groth16::Proof;
use serde::{Deserialize, Serialize};

use crate::error::{PrivacyError, PrivacyResult};
use crate::field::field_to_bytes;

pub const PROOF_LEN: usize = 256;

/// Affine G1 point; the point at infinity is `(0, 0)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G1Point {
    pub x: Fq,
    pub y: Fq,
}

/// Affine G2 point over `Fq2 = c0 + c1·u`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G2Point {
    pub x_c0: Fq,
    pub x_c1: Fq,
    pub y_c0: Fq,
    pub y_c1: Fq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
}

impl From<&Proof<Bn254>> for Groth16Proof {
    fn from(proof: &Proof<Bn254>) -> Self {
        let g1 = |p: &ark_bn254::G1Affine| {
            if p.infinity {
                G1Point {
                    x: Fq::zero(),
                    y: Fq::zero(),
                }
            } else {
                G1Point { x: p.x, y: p.y }
            }
        };

        Self {
            a: g1(&proof.a),
            b: G2Point {
                x_c0: proof.b.x.c0,
                x_c1: proof.b.x.c1,
                y_c0: proof.b.y.c0,
                y_c1: proof.b.y.c1,
            },
            c: g1(&proof.c),
        }
    }
}

/// Proof as emitted by snarkjs (`proof.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkjsProof {
    /// `[x, y, z]`
    pub pi_a: Vec<String>,
    /// `[[x.c0, x.c1], [y.c0, y.c1], [z.c0, z.c1]]`
    pub pi_b: Vec<Vec<String>>,
    /// `[x, y, z]`
    pub pi_c: Vec<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub curve: Option<String>,
}

impl TryFrom<&SnarkjsProof> for Groth16Proof {
    type Error = PrivacyError;

    fn try_from(proof: &SnarkjsProof) -> PrivacyResult<Self> {
        let b_x = pi_b_pair(proof, 0)?;
        let b_y = pi_b_pair(proof, 1)?;

        Ok(Self {
            a: G1Point {
                x: coordinate(&proof.pi_a, 0, "pi_a")?,
                y: coordinate(&proof.pi_a, 1, "pi_a")?,
            },
            b: G2Point {
                x_c0: coordinate(b_x, 0, "pi_b")?,
                x_c1: coordinate(b_x, 1, "pi_b")?,
                y_c0: coordinate(b_y, 0, "pi_b")?,
                y_c1: coordinate(b_y, 1, "pi_b")?,
            },
            c: G1Point {
                x: coordinate(&proof.pi_c, 0, "pi_c")?,
                y: coordinate(&proof.pi_c, 1, "pi_c")?,
            },
        })
    }
}

fn pi_b_pair(proof: &SnarkjsProof, i: usize) -> PrivacyResult<&[String]> {
    proof
        .pi_b
        .get(i)
        .map(Vec::as_slice)
        .ok_or(PrivacyError::InvalidProofElement("pi_b"))
}

/// Parse a canonical decimal `Fq` element
fn coordinate(values: &[String], i: usize, name: &'static str) -> PrivacyResult<Fq> {
    values
        .get(i)
        .and_then(|value| value.trim().parse::<BigInt<4>>().ok())
        .and_then(Fq::from_bigint)
        .ok_or(PrivacyError::InvalidProofElement(name))
}

/// The three byte ranges of a formatted proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofBytes {
    pub a: [u8; 64],
    pub b: [u8; 128],
    pub c: [u8; 64],
}

/// Encode a proof for the on-chain verifier, negating `A`
pub fn format_proof(proof: &Groth16Proof) -> [u8; PROOF_LEN] {
    let mut out = [0u8; PROOF_LEN];

    out[0..32].copy_from_slice(&field_to_bytes(&proof.a.x));
    out[32..64].copy_from_slice(&field_to_bytes(&(-proof.a.y)));

    out[64..96].copy_from_slice(&field_to_bytes(&proof.b.x_c1));
    out[96..128].copy_from_slice(&field_to_bytes(&proof.b.x_c0));
    out[128..160].copy_from_slice(&field_to_bytes(&proof.b.y_c1));
    out[160..192].copy_from_slice(&field_to_bytes(&proof.b.y_c0));

    out[192..224].copy_from_slice(&field_to_bytes(&proof.c.x));
    out[224..256].copy_from_slice(&field_to_bytes(&proof.c.y));
    out
}

/// Split a 256-byte proof into its `A`, `B`, `C` ranges
pub fn parse_proof(bytes: &[u8]) -> PrivacyResult<ProofBytes> {
    if bytes.len() != PROOF_LEN {
        return Err(PrivacyError::ProofLengthMismatch(bytes.len()));
    }

    let mut parsed = ProofBytes {
        a: [0u8; 64],
        b: [0u8; 128],
        c: [0u8; 64],
    };
    parsed.a.copy_from_slice(&bytes[0..64]);
    parsed.b.copy_from_slice(&bytes[64..192]);
    parsed.c.copy_from_slice(&bytes[192..256]);
    Ok(parsed)
}

/// Inverse of [`parse_proof`]
pub fn serialize_proof(proof: &ProofBytes) -> [u8; PROOF_LEN] {
    let mut out = [0u8; PROOF_LEN];
    out[0..64].copy_from_slice(&proof.a);
    out[64..192].copy_from_slice(&proof.b);
    out[192..256].copy_from_slice(&proof.c);
    out
}
