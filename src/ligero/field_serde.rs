//! `#[serde(with = ...)]` adapters that encode field elements through their
//! canonical bytes, so proof types need no serde bound on the field.

use super::field_utils::LigeroField;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};
use serde::ser::SerializeSeq;

fn decode<F: LigeroField, E: DeError>(bytes: &[u8]) -> Result<F, E> {
    F::read_bytes(bytes).ok_or_else(|| E::custom("non-canonical field element"))
}

pub fn serialize<S, F>(value: &F, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    F: LigeroField,
{
    serializer.serialize_bytes(&value.to_bytes())
}

pub fn deserialize<'de, D, F>(deserializer: D) -> Result<F, D::Error>
where
    D: Deserializer<'de>,
    F: LigeroField,
{
    let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
    decode(&bytes)
}

pub mod vec {
    use super::*;

    pub fn serialize<S, F>(data: &[F], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        F: LigeroField,
    {
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        for item in data {
            seq.serialize_element(&item.to_bytes())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, F>(deserializer: D) -> Result<Vec<F>, D::Error>
    where
        D: Deserializer<'de>,
        F: LigeroField,
    {
        let encoded: Vec<Vec<u8>> = Deserialize::deserialize(deserializer)?;
        encoded.iter().map(|bytes| decode(bytes)).collect()
    }
}

/// Each inner vector becomes one byte string of concatenated elements.
pub mod vec_vec {
    use super::*;
    use crate::ligero::field_utils::serialize_field_slice;

    pub fn serialize<S, F>(data: &[Vec<F>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        F: LigeroField,
    {
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        for inner in data {
            seq.serialize_element(&serialize_field_slice(inner))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, F>(deserializer: D) -> Result<Vec<Vec<F>>, D::Error>
    where
        D: Deserializer<'de>,
        F: LigeroField,
    {
        let encoded: Vec<Vec<u8>> = Deserialize::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|bytes| {
                if bytes.len() % F::BYTE_LEN != 0 {
                    return Err(D::Error::custom("truncated field element"));
                }
                bytes.chunks_exact(F::BYTE_LEN).map(decode).collect()
            })
            .collect()
    }
}
