//! Binary extension field GF(2^64) = GF(2)[x] / (x^64 + x^4 + x^3 + x + 1)
//!
//! Elements are stored as their coefficient bit pattern. Addition is XOR and
//! the field has characteristic two, so it carries affine-subspace evaluation
//! domains instead of multiplicative cosets.

use super::field_utils::{split_sign, LigeroField};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

#[derive(Copy, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Gf64(pub u64);

fn carryless_mul(a: u64, b: u64) -> u128 {
    let wide = a as u128;
    let mut acc = 0u128;
    let mut bits = b;
    let mut shift = 0u32;
    while bits != 0 {
        if bits & 1 == 1 {
            acc ^= wide << shift;
        }
        bits >>= 1;
        shift += 1;
    }
    acc
}

/// Folds the upper 64 bits back using x^64 = x^4 + x^3 + x + 1.
fn reduce(value: u128) -> u64 {
    let lo = value as u64;
    let hi = (value >> 64) as u128;
    let folded = hi ^ (hi << 1) ^ (hi << 3) ^ (hi << 4);
    let overflow = (folded >> 64) as u64;
    lo ^ (folded as u64) ^ overflow ^ (overflow << 1) ^ (overflow << 3) ^ (overflow << 4)
}

impl Add for Gf64 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Sub for Gf64 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for Gf64 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self(reduce(carryless_mul(self.0, rhs.0)))
    }
}

impl Neg for Gf64 {
    type Output = Self;
    fn neg(self) -> Self {
        self
    }
}

impl AddAssign for Gf64 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}
impl SubAssign for Gf64 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}
impl MulAssign for Gf64 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl LigeroField for Gf64 {
    const NAME: &'static str = "gf64";
    const BYTE_LEN: usize = 8;
    const FIELD_BITS: u32 = 64;
    const CHARACTERISTIC_TWO: bool = true;
    const TWO_ADICITY: u32 = 0;
    const EXTENSION_DEGREE: u32 = 64;

    fn zero() -> Self {
        Self(0)
    }

    fn one() -> Self {
        Self(1)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn from_u64(value: u64) -> Self {
        Self(value & 1)
    }

    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        // |F*| = 2^64 - 1
        Some(self.pow(u64::MAX - 1))
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen())
    }

    fn from_uniform_bytes(bytes: &[u8]) -> Self {
        let mut arr = [0u8; 8];
        let take = bytes.len().min(8);
        arr[..take].copy_from_slice(&bytes[..take]);
        Self(u64::from_le_bytes(arr))
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_le_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_le_bytes(arr)))
    }

    /// Decimal literals are read as coefficient bit patterns; a sign is ignored
    /// since `-a = a`.
    fn parse_decimal(text: &str) -> Option<Self> {
        let (_, digits) = split_sign(text)?;
        digits.parse::<u64>().ok().map(Self)
    }

    fn characteristic() -> String {
        "2".to_string()
    }

    fn root_of_unity(_log_size: u32) -> Option<Self> {
        None
    }

    fn multiplicative_generator() -> Option<Self> {
        None
    }

    fn subspace_basis(dimension: usize) -> Option<Vec<Self>> {
        if dimension > 64 {
            return None;
        }
        Some((0..dimension).map(|i| Self(1u64 << i)).collect())
    }
}

impl fmt::Debug for Gf64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gf64(0x{:016x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_reduction_of_x64() {
        // x^63 * x = x^64 = x^4 + x^3 + x + 1
        let x63 = Gf64(1 << 63);
        let x = Gf64(2);
        assert_eq!(x63 * x, Gf64(0b1_1011));
    }

    #[test]
    fn test_mul_distributes_and_commutes() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..64 {
            let a = Gf64::random(&mut rng);
            let b = Gf64::random(&mut rng);
            let c = Gf64::random(&mut rng);
            assert_eq!(a * b, b * a);
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!((a * b) * c, a * (b * c));
        }
    }

    #[test]
    fn test_inverse() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..32 {
            let a = Gf64::random(&mut rng);
            if a.is_zero() {
                continue;
            }
            assert_eq!(a * a.inverse().unwrap(), Gf64::one());
        }
    }

    #[test]
    fn test_characteristic_two() {
        let a = Gf64(0xdead_beef);
        assert_eq!(a + a, Gf64::zero());
        assert_eq!(-a, a);
        assert_eq!(Gf64::from_u64(2), Gf64::zero());
        assert_eq!(Gf64::from_u64(3), Gf64::one());
    }

    #[test]
    fn test_subspace_basis_independent() {
        let basis = Gf64::subspace_basis(8).unwrap();
        assert_eq!(basis.len(), 8);
        let combined = basis.iter().fold(0u64, |acc, b| acc | b.0);
        assert_eq!(combined, 0xff);
        assert!(Gf64::subspace_basis(65).is_none());
    }
}
