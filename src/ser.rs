//! Serde adapter for arkworks types.
//!
//! Group elements and scalars implement `CanonicalSerialize` rather than
//! serde's traits; this module bridges the two so proof types can carry
//! `#[serde(with = "crate::ser")]` on those fields. The encoding is the
//! canonical compressed byte form.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserializer, Serializer};

pub fn serialize<S, T>(data: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: CanonicalSerialize,
{
    let mut bytes = Vec::new();
    data.serialize(&mut bytes)
        .map_err(serde::ser::Error::custom)?;
    serde_bytes::serialize(&bytes, serializer)
}

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: CanonicalDeserialize,
{
    let bytes: Vec<u8> = serde_bytes::deserialize(deserializer)?;
    T::deserialize(&bytes[..]).map_err(serde::de::Error::custom)
}
