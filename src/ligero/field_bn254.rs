//! [`LigeroField`] for the alt_bn128 scalar field.
//!
//! Arithmetic is arkworks'; this module only bridges it to the byte, parsing
//! and domain hooks the protocol needs.

use super::field_utils::{split_sign, LigeroField};
use ark_bn254::Fr;
use ark_ff::{BigInteger, FftField, Field, PrimeField, UniformRand};
use ark_serialize::CanonicalDeserialize;
use ark_std::{One, Zero};
use rand::Rng;
use std::str::FromStr;

impl LigeroField for Fr {
    const NAME: &'static str = "bn254";
    const BYTE_LEN: usize = 32;
    const FIELD_BITS: u32 = Fr::MODULUS_BIT_SIZE - 1;
    const CHARACTERISTIC_TWO: bool = false;
    const TWO_ADICITY: u32 = <Fr as FftField>::TWO_ADICITY;
    const EXTENSION_DEGREE: u32 = 1;

    fn zero() -> Self {
        <Fr as Zero>::zero()
    }

    fn one() -> Self {
        <Fr as One>::one()
    }

    fn is_zero(&self) -> bool {
        <Fr as Zero>::is_zero(self)
    }

    fn from_u64(value: u64) -> Self {
        Fr::from(value)
    }

    fn inverse(&self) -> Option<Self> {
        Field::inverse(self)
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        <Fr as UniformRand>::rand(rng)
    }

    fn from_uniform_bytes(bytes: &[u8]) -> Self {
        Fr::from_le_bytes_mod_order(bytes)
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        let mut bytes = self.into_bigint().to_bytes_le();
        bytes.resize(<Self as LigeroField>::BYTE_LEN, 0);
        out.extend_from_slice(&bytes);
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != <Self as LigeroField>::BYTE_LEN {
            return None;
        }
        Fr::deserialize_compressed(bytes).ok()
    }

    fn parse_decimal(text: &str) -> Option<Self> {
        let (negative, digits) = split_sign(text)?;
        let value = Fr::from_str(digits).ok()?;
        Some(if negative { -value } else { value })
    }

    fn characteristic() -> String {
        Fr::MODULUS.to_string()
    }

    fn root_of_unity(log_size: u32) -> Option<Self> {
        if log_size > <Self as LigeroField>::TWO_ADICITY {
            return None;
        }
        Fr::get_root_of_unity(1u64 << log_size)
    }

    fn multiplicative_generator() -> Option<Self> {
        Some(<Fr as FftField>::GENERATOR)
    }

    fn subspace_basis(_dimension: usize) -> Option<Vec<Self>> {
        None
    }

    fn square(&self) -> Self {
        Field::square(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_are_fixed_width() {
        let x = Fr::from(0x1234_5678u64);
        let bytes = LigeroField::to_bytes(&x);
        assert_eq!(bytes.len(), 32);
        assert_eq!(<Fr as LigeroField>::read_bytes(&bytes), Some(x));
        assert!(<Fr as LigeroField>::read_bytes(&[0xff; 32]).is_none());
    }

    #[test]
    fn test_parse_negative_literal() {
        let minus_three = <Fr as LigeroField>::parse_decimal("-3").unwrap();
        assert_eq!(minus_three + Fr::from(3u64), <Fr as LigeroField>::zero());
    }

    #[test]
    fn test_root_of_unity_order() {
        let root = <Fr as LigeroField>::root_of_unity(10).unwrap();
        assert_eq!(LigeroField::pow(&root, 1 << 10), <Fr as LigeroField>::one());
        assert_ne!(LigeroField::pow(&root, 1 << 9), <Fr as LigeroField>::one());
    }

    #[test]
    fn test_characteristic_is_bn254_order() {
        assert_eq!(
            <Fr as LigeroField>::characteristic(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
        );
    }
}
