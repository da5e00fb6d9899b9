//! Twisted Edwards Curve Arithmetic
//!
//! BabyJubJub over BN254 `Fr`:
//!
//! ```text
//! a·x² + y² = 1 + d·x²·y²        a = 168700, d = 168696
//!
//! G         prime-order subgroup generator
//! l         subgroup order (Scalar modulus)
//! identity  (0, 1)
//! ```
//!
//! `a` is a square and `d` a non-square in `Fr`, so the affine addition law is
//! complete: no input pair on the curve hits a zero denominator. Points can
//! only be built through checked constructors, which keeps every
//! [`CurvePoint`] on the curve.

use std::ops::{Add, Mul, Neg, Sub};

use ark_ff::{
    BigInteger, BitIteratorBE, Field, MontFp, One, PrimeField, UniformRand, Zero,
    fields::{Fp256, MontBackend, MontConfig},
};
use rand::{CryptoRng, RngCore};

use crate::error::{PrivacyError, PrivacyResult};
use crate::field::{Fr, field_from_canonical_bytes, field_to_bytes, is_canonical};

/// Subgroup order of the curve generator.
#[derive(MontConfig)]
#[modulus = "2736030358979909402780800718157159386076813972158567259200215660948447373041"]
#[generator = "31"]
pub struct ScalarConfig;

/// Curve scalars, reduced mod the subgroup order.
pub type Scalar = Fp256<MontBackend<ScalarConfig, 4>>;

pub const CURVE_A: Fr = MontFp!("168700");
pub const CURVE_D: Fr = MontFp!("168696");

pub const GENERATOR: CurvePoint = CurvePoint {
    x: MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553"),
    y: MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203"),
};

pub const IDENTITY: CurvePoint = CurvePoint {
    x: MontFp!("0"),
    y: MontFp!("1"),
};

/// Affine point on the curve
///
/// Fields are private and every constructor checks the curve equation.
/// [`CurvePoint::add_point`] relies on that for a non-zero denominator, so
/// there is no public unchecked constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurvePoint {
    x: Fr,
    y: Fr,
}

impl CurvePoint {
    /// Build a point from coordinates, checking the curve equation
    pub fn new(x: Fr, y: Fr) -> PrivacyResult<Self> {
        let point = Self { x, y };
        if point.is_on_curve() {
            Ok(point)
        } else {
            Err(PrivacyError::InvalidPoint)
        }
    }

    pub fn x(&self) -> Fr {
        self.x
    }

    pub fn y(&self) -> Fr {
        self.y
    }

    pub fn is_identity(&self) -> bool {
        *self == IDENTITY
    }

    /// `a·x² + y² == 1 + d·x²·y²`
    pub fn is_on_curve(&self) -> bool {
        let x2 = self.x.square();
        let y2 = self.y.square();
        CURVE_A * x2 + y2 == Fr::one() + CURVE_D * x2 * y2
    }

    /// `l·P == identity`
    pub fn is_in_subgroup(&self) -> bool {
        self.mul_bigint(Scalar::MODULUS).is_identity()
    }

    pub fn double(&self) -> Self {
        self.add_point(self)
    }

    /// Affine Edwards addition
    pub fn add_point(&self, other: &Self) -> Self {
        let x1x2 = self.x * other.x;
        let y1y2 = self.y * other.y;
        let x1y2 = self.x * other.y;
        let y1x2 = self.y * other.x;
        let t = CURVE_D * x1x2 * y1y2;

        // One inversion for both denominators: 1/(1+t) = (1-t)/(1-t²)
        let inv = (Fr::one() - t.square())
            .inverse()
            .expect("edwards addition is complete for on-curve points");

        Self {
            x: (x1y2 + y1x2) * (Fr::one() - t) * inv,
            y: (y1y2 - CURVE_A * x1x2) * (Fr::one() + t) * inv,
        }
    }

    /// `(x, y) -> (-x, y)`
    pub fn negate(&self) -> Self {
        Self {
            x: -self.x,
            y: self.y,
        }
    }

    pub fn sub_point(&self, other: &Self) -> Self {
        self.add_point(&other.negate())
    }

    /// Scalar multiplication, scalar already reduced mod `l`
    pub fn mul_scalar(&self, scalar: &Scalar) -> Self {
        self.mul_bigint(scalar.into_bigint())
    }

    /// Double-and-add over an unreduced integer, most significant bit first
    pub fn mul_bigint<B: AsRef<[u64]>>(&self, scalar: B) -> Self {
        let mut acc = IDENTITY;
        for bit in BitIteratorBE::without_leading_zeros(scalar) {
            acc = acc.double();
            if bit {
                acc = acc.add_point(self);
            }
        }
        acc
    }

    /// `x(32) || y(32)`, big-endian
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&field_to_bytes(&self.x));
        out[32..].copy_from_slice(&field_to_bytes(&self.y));
        out
    }

    /// Parse an untrusted point: canonical coordinates, on the curve, in the subgroup
    pub fn from_bytes(bytes: &[u8; 64]) -> PrivacyResult<Self> {
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[..32]);
        y.copy_from_slice(&bytes[32..]);

        let x = field_from_canonical_bytes::<Fr>(&x).ok_or(PrivacyError::InvalidPoint)?;
        let y = field_from_canonical_bytes::<Fr>(&y).ok_or(PrivacyError::InvalidPoint)?;
        let point = Self::new(x, y)?;

        if !point.is_in_subgroup() {
            return Err(PrivacyError::InvalidPoint);
        }
        Ok(point)
    }
}

impl Default for CurvePoint {
    fn default() -> Self {
        IDENTITY
    }
}

impl Add for CurvePoint {
    type Output = CurvePoint;

    fn add(self, rhs: CurvePoint) -> CurvePoint {
        self.add_point(&rhs)
    }
}

impl Sub for CurvePoint {
    type Output = CurvePoint;

    fn sub(self, rhs: CurvePoint) -> CurvePoint {
        self.sub_point(&rhs)
    }
}

impl Neg for CurvePoint {
    type Output = CurvePoint;

    fn neg(self) -> CurvePoint {
        self.negate()
    }
}

impl Mul<Scalar> for CurvePoint {
    type Output = CurvePoint;

    fn mul(self, rhs: Scalar) -> CurvePoint {
        self.mul_scalar(&rhs)
    }
}

/// `sk·G`
pub fn derive_public_key(secret: &Scalar) -> CurvePoint {
    GENERATOR.mul_scalar(secret)
}

/// Sample a non-zero scalar
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let s = Scalar::rand(rng);
        if !s.is_zero() {
            return s;
        }
    }
}

/// Reduce an `Fr` element (e.g. a hash output) into a curve scalar
pub fn scalar_from_field(value: &Fr) -> Scalar {
    Scalar::from_be_bytes_mod_order(&field_to_bytes(value))
}

/// Parse a strict scalar; values at or above `l` are rejected
pub fn scalar_from_bytes(bytes: &[u8; 32]) -> PrivacyResult<Scalar> {
    if !is_canonical::<Scalar>(bytes) {
        return Err(PrivacyError::ScalarOutOfRange);
    }
    Ok(Scalar::from_be_bytes_mod_order(bytes))
}

pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
    field_to_bytes(scalar)
}

/// Bit length of the subgroup order
pub fn subgroup_order_bits() -> usize {
    Scalar::MODULUS.num_bits() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_generator_on_curve_and_in_subgroup() {
        assert!(GENERATOR.is_on_curve());
        assert!(GENERATOR.is_in_subgroup());
        assert!(IDENTITY.is_on_curve());
        assert!(IDENTITY.is_in_subgroup());
        assert_eq!(subgroup_order_bits(), 251);
    }

    #[test]
    fn test_identity_is_neutral() {
        assert_eq!(GENERATOR + IDENTITY, GENERATOR);
        assert_eq!(GENERATOR - GENERATOR, IDENTITY);
        assert_eq!(GENERATOR + (-GENERATOR), IDENTITY);
    }

    #[test]
    fn test_scalar_mul_matches_repeated_addition() {
        let mut acc = IDENTITY;
        for _ in 0..5 {
            acc = acc + GENERATOR;
        }
        assert_eq!(GENERATOR * Scalar::from(5u64), acc);
        assert_eq!(GENERATOR.double(), GENERATOR + GENERATOR);
        assert_eq!(GENERATOR * Scalar::zero(), IDENTITY);
    }

    #[test]
    fn test_order_times_point_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let p = derive_public_key(&random_scalar(&mut rng));
            assert!(p.is_on_curve());
            assert!(p.mul_bigint(Scalar::MODULUS).is_identity());
        }
    }

    #[test]
    fn test_scalar_mul_distributes() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = random_scalar(&mut rng);
        let b = random_scalar(&mut rng);

        assert_eq!(
            derive_public_key(&(a + b)),
            derive_public_key(&a) + derive_public_key(&b)
        );
        assert_eq!(derive_public_key(&a) * b, derive_public_key(&(a * b)));
    }

    #[test]
    fn test_point_bytes_roundtrip() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = derive_public_key(&random_scalar(&mut rng));
        assert_eq!(CurvePoint::from_bytes(&p.to_bytes()).unwrap(), p);
    }

    #[test]
    fn test_rejects_off_curve_point() {
        assert_eq!(
            CurvePoint::new(Fr::from(1u64), Fr::from(1u64)),
            Err(PrivacyError::InvalidPoint)
        );

        let mut bytes = GENERATOR.to_bytes();
        bytes[63] ^= 1;
        assert_eq!(CurvePoint::from_bytes(&bytes), Err(PrivacyError::InvalidPoint));
    }

    #[test]
    fn test_rejects_low_order_point() {
        // (0, -1) has order 2
        let p = CurvePoint::new(Fr::zero(), -Fr::one()).unwrap();
        assert!(p.is_on_curve());
        assert!(!p.is_in_subgroup());
        assert_eq!(p.double(), IDENTITY);
        assert_eq!(CurvePoint::from_bytes(&p.to_bytes()), Err(PrivacyError::InvalidPoint));
    }

    #[test]
    fn test_addition_closed_over_torsion_cosets() {
        let mut rng = StdRng::seed_from_u64(13);
        let torsion = CurvePoint::new(Fr::zero(), -Fr::one()).unwrap();
        let p = derive_public_key(&random_scalar(&mut rng));

        // Sums leaving the subgroup still land on the curve
        let shifted = p + torsion;
        assert!(shifted.is_on_curve());
        assert!(!shifted.is_in_subgroup());
        assert_eq!(shifted + torsion, p);
        assert_eq!(shifted.double(), p.double());
        assert!((shifted * Scalar::from(3u64)).is_on_curve());
    }

    #[test]
    fn test_strict_scalar_parse() {
        let mut order = [0u8; 32];
        order.copy_from_slice(&Scalar::MODULUS.to_bytes_be());
        assert_eq!(scalar_from_bytes(&order), Err(PrivacyError::ScalarOutOfRange));

        let s = Scalar::from(42u64);
        assert_eq!(scalar_from_bytes(&scalar_to_bytes(&s)).unwrap(), s);
    }
}
