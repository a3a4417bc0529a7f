//! Field abstraction shared by every layer of the IOP.
//!
//! The protocol is written once against [`LigeroField`] and instantiated with
//! one of the concrete fields in this crate:
//! - [`Goldilocks`](super::field_goldilocks::Goldilocks), a 64-bit prime field with 2-adicity 32,
//! - [`Gf64`](super::field_gf64::Gf64), the binary field GF(2^64) used with affine-subspace domains,
//! - `ark_bn254::Fr`, the alt_bn128 scalar field (see `field_bn254`).

use super::errors::{LigeroError, LigeroResult};
use rand::Rng;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

pub trait LigeroField:
    Copy
    + Clone
    + Debug
    + PartialEq
    + Eq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Short identifier used in logs and the CLI.
    const NAME: &'static str;
    /// Length of the canonical byte encoding.
    const BYTE_LEN: usize;
    /// `floor(log2 |F|)`.
    const FIELD_BITS: u32;
    const CHARACTERISTIC_TWO: bool;
    /// Largest `k` such that `2^k` divides `|F*|`.
    const TWO_ADICITY: u32;
    const EXTENSION_DEGREE: u32;

    fn zero() -> Self;
    fn one() -> Self;
    fn is_zero(&self) -> bool;

    /// Image of the integer `value` under the canonical ring map `Z -> F`.
    fn from_u64(value: u64) -> Self;

    fn inverse(&self) -> Option<Self>;

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Maps (close to) uniformly distributed bytes to a field element.
    fn from_uniform_bytes(bytes: &[u8]) -> Self;

    /// Appends the canonical little-endian encoding.
    fn write_bytes(&self, out: &mut Vec<u8>);

    /// Parses exactly [`Self::BYTE_LEN`] bytes, rejecting non-canonical encodings.
    fn read_bytes(bytes: &[u8]) -> Option<Self>;

    /// Parses a (possibly negative) decimal literal as it appears in constraint files.
    fn parse_decimal(text: &str) -> Option<Self>;

    /// Decimal characteristic of the field.
    fn characteristic() -> String;

    /// A primitive `2^log_size`-th root of unity.
    fn root_of_unity(log_size: u32) -> Option<Self>;

    /// A generator of the multiplicative group, used as coset offset.
    fn multiplicative_generator() -> Option<Self>;

    /// `dimension` elements linearly independent over GF(2).
    fn subspace_basis(dimension: usize) -> Option<Vec<Self>>;

    fn square(&self) -> Self {
        *self * *self
    }

    fn pow(&self, exp: u64) -> Self {
        let mut result = Self::one();
        let mut base = *self;
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result *= base;
            }
            base = base.square();
            e >>= 1;
        }
        result
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTE_LEN);
        self.write_bytes(&mut out);
        out
    }
}

/// Convert a field element to its canonical bytes
pub fn field_to_bytes<F: LigeroField>(value: &F) -> Vec<u8> {
    value.to_bytes()
}

/// Concatenated canonical encodings, no length prefix.
pub fn serialize_field_slice<F: LigeroField>(values: &[F]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * F::BYTE_LEN);
    for value in values {
        value.write_bytes(&mut out);
    }
    out
}

/// Inverse of [`serialize_field_slice`].
pub fn deserialize_field_slice<F: LigeroField>(bytes: &[u8]) -> LigeroResult<Vec<F>> {
    if bytes.len() % F::BYTE_LEN != 0 {
        return Err(LigeroError::format_error(&format!(
            "{} bytes is not a multiple of the {}-byte element size",
            bytes.len(),
            F::BYTE_LEN
        )));
    }
    bytes
        .chunks_exact(F::BYTE_LEN)
        .map(|chunk| {
            F::read_bytes(chunk)
                .ok_or_else(|| LigeroError::format_error("non-canonical field element"))
        })
        .collect()
}

pub fn inner_product<F: LigeroField>(lhs: &[F], rhs: &[F]) -> F {
    debug_assert_eq!(lhs.len(), rhs.len());
    let mut acc = F::zero();
    for (a, b) in lhs.iter().zip(rhs.iter()) {
        acc += *a * *b;
    }
    acc
}

pub fn random_vector<F: LigeroField, R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<F> {
    (0..len).map(|_| F::random(rng)).collect()
}

/// Montgomery batch inversion. Fails if any input is zero.
pub fn batch_inverse<F: LigeroField>(values: &[F]) -> LigeroResult<Vec<F>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = F::one();
    for value in values {
        if value.is_zero() {
            return Err(LigeroError::domain_error("batch inversion of zero"));
        }
        prefix.push(acc);
        acc *= *value;
    }
    let mut inv = acc
        .inverse()
        .ok_or_else(|| LigeroError::domain_error("batch inversion of zero"))?;
    let mut out = vec![F::zero(); values.len()];
    for i in (0..values.len()).rev() {
        out[i] = inv * prefix[i];
        inv *= values[i];
    }
    Ok(out)
}

pub fn ceil_log2(value: usize) -> usize {
    if value <= 1 {
        return 0;
    }
    (usize::BITS - (value - 1).leading_zeros()) as usize
}

/// Splits a decimal literal into its sign and digits.
pub(crate) fn split_sign(text: &str) -> Option<(bool, &str)> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((negative, digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::field_goldilocks::Goldilocks;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn batch_inverse_matches_single_inverses() {
        let mut rng = StdRng::seed_from_u64(11);
        let values: Vec<Goldilocks> = (0..33)
            .map(|_| loop {
                let v = Goldilocks::random(&mut rng);
                if !v.is_zero() {
                    break v;
                }
            })
            .collect();
        let inverses = batch_inverse(&values).unwrap();
        for (v, inv) in values.iter().zip(inverses.iter()) {
            assert_eq!(*v * *inv, Goldilocks::one());
        }
    }

    #[test]
    fn batch_inverse_rejects_zero() {
        let values = vec![Goldilocks::one(), Goldilocks::zero()];
        assert!(batch_inverse(&values).is_err());
    }

    #[test]
    fn slice_serialization_roundtrip() {
        let values: Vec<Goldilocks> = (1..=5).map(Goldilocks::from_u64).collect();
        let bytes = serialize_field_slice(&values);
        assert_eq!(bytes.len(), 5 * Goldilocks::BYTE_LEN);
        assert_eq!(deserialize_field_slice::<Goldilocks>(&bytes).unwrap(), values);
        assert!(deserialize_field_slice::<Goldilocks>(&bytes[1..]).is_err());
    }

    #[test]
    fn ceil_log2_values() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(1024), 10);
        assert_eq!(ceil_log2(1025), 11);
    }

    #[test]
    fn split_sign_parses_literals() {
        assert_eq!(split_sign("-12"), Some((true, "12")));
        assert_eq!(split_sign(" 7 "), Some((false, "7")));
        assert_eq!(split_sign("+3"), Some((false, "3")));
        assert_eq!(split_sign("1e3"), None);
        assert_eq!(split_sign("-"), None);
    }
}
