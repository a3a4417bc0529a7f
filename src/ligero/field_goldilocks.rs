//! Prime field with p = 2^64 - 2^32 + 1

use super::field_utils::{split_sign, LigeroField};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

const MODULUS: u64 = 0xFFFF_FFFF_0000_0001;
const GENERATOR: u64 = 7;

/// Represents an element in the prime field F_p where p = 2^64 - 2^32 + 1.
#[derive(Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Goldilocks(u64);

// --- Core Field Arithmetic ---

impl Add for Goldilocks {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let sum = self.0 as u128 + rhs.0 as u128;
        let m = MODULUS as u128;
        if sum >= m {
            Self((sum - m) as u64)
        } else {
            Self(sum as u64)
        }
    }
}

impl Sub for Goldilocks {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            Self(MODULUS - rhs.0 + self.0)
        }
    }
}

impl Mul for Goldilocks {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self(reduce128(self.0 as u128 * rhs.0 as u128))
    }
}

impl Neg for Goldilocks {
    type Output = Self;
    fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            Self(MODULUS - self.0)
        }
    }
}

impl AddAssign for Goldilocks {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for Goldilocks {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for Goldilocks {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for Goldilocks {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self(0), |a, b| a + b)
    }
}

fn reduce128(value: u128) -> u64 {
    (value % MODULUS as u128) as u64
}

impl Goldilocks {
    pub const fn new(val: u64) -> Self {
        if val >= MODULUS {
            Self(val - MODULUS)
        } else {
            Self(val)
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl LigeroField for Goldilocks {
    const NAME: &'static str = "goldilocks";
    const BYTE_LEN: usize = 8;
    const FIELD_BITS: u32 = 63;
    const CHARACTERISTIC_TWO: bool = false;
    const TWO_ADICITY: u32 = 32;
    const EXTENSION_DEGREE: u32 = 1;

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
        Self::new(value)
    }

    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(self.pow(MODULUS - 2))
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..MODULUS))
    }

    fn from_uniform_bytes(bytes: &[u8]) -> Self {
        let mut wide = [0u8; 16];
        let take = bytes.len().min(16);
        wide[..take].copy_from_slice(&bytes[..take]);
        Self(reduce128(u128::from_le_bytes(wide)))
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_le_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 8] = bytes.try_into().ok()?;
        let val = u64::from_le_bytes(arr);
        if val >= MODULUS {
            return None;
        }
        Some(Self(val))
    }

    fn parse_decimal(text: &str) -> Option<Self> {
        let (negative, digits) = split_sign(text)?;
        let magnitude: u128 = digits.parse().ok()?;
        let value = Self(reduce128(magnitude));
        Some(if negative { -value } else { value })
    }

    fn characteristic() -> String {
        MODULUS.to_string()
    }

    fn root_of_unity(log_size: u32) -> Option<Self> {
        if log_size > Self::TWO_ADICITY {
            return None;
        }
        Some(Self(GENERATOR).pow((MODULUS - 1) >> log_size))
    }

    fn multiplicative_generator() -> Option<Self> {
        Some(Self(GENERATOR))
    }

    fn subspace_basis(_dimension: usize) -> Option<Vec<Self>> {
        None
    }
}

impl fmt::Debug for Goldilocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Goldilocks({})", self.0)
    }
}

impl fmt::Display for Goldilocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Goldilocks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for Goldilocks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let val = u64::deserialize(deserializer)?;
        if val >= MODULUS {
            return Err(serde::de::Error::custom("non-canonical Goldilocks element"));
        }
        Ok(Self(val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_arithmetic_wraps_modulus() {
        let minus_one = -Goldilocks::one();
        assert_eq!(minus_one.value(), MODULUS - 1);
        assert_eq!(minus_one + Goldilocks::one(), Goldilocks::zero());
        assert_eq!(Goldilocks::zero() - Goldilocks::one(), minus_one);
        assert_eq!(minus_one * minus_one, Goldilocks::one());
    }

    #[test]
    fn test_inverse() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..64 {
            let x = Goldilocks::random(&mut rng);
            if x.is_zero() {
                continue;
            }
            assert_eq!(x * x.inverse().unwrap(), Goldilocks::one());
        }
        assert!(Goldilocks::zero().inverse().is_none());
    }

    #[test]
    fn test_roots_of_unity_have_exact_order() {
        for log in [1u32, 5, 12, 32] {
            let root = Goldilocks::root_of_unity(log).unwrap();
            assert_eq!(root.pow(1u64 << log), Goldilocks::one());
            assert_ne!(root.pow(1u64 << (log - 1)), Goldilocks::one());
        }
        assert!(Goldilocks::root_of_unity(33).is_none());
    }

    #[test]
    fn test_bytes_reject_non_canonical() {
        let x = Goldilocks::from_u64(123_456_789);
        assert_eq!(Goldilocks::read_bytes(&x.to_bytes()), Some(x));
        assert!(Goldilocks::read_bytes(&MODULUS.to_le_bytes()).is_none());
        assert!(Goldilocks::read_bytes(&[1, 2, 3]).is_none());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Goldilocks::parse_decimal("9"), Some(Goldilocks::from_u64(9)));
        assert_eq!(Goldilocks::parse_decimal("-1"), Some(-Goldilocks::one()));
        assert_eq!(
            Goldilocks::parse_decimal("18446744069414584322"),
            Some(Goldilocks::one())
        );
        assert!(Goldilocks::parse_decimal("0x10").is_none());
    }
}
