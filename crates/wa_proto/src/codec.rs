//! Serde helpers shared by the content model.
//!
//! Binary blobs (buffers, thumbnails, secrets) travel as standard padded
//! base64 strings inside JSON, the same way the rest of the client stores
//! key material.

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use serde::{de, Deserialize, Deserializer, Serializer};

use crate::error::ContentError;

pub(crate) fn encode(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub(crate) fn decode(b64: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(b64)
}

/// `#[serde(with = "crate::codec::base64_bytes")]` for `Bytes`.
pub mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &Bytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(d)?;
        decode(&s).map(Bytes::from).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "crate::codec::base64_bytes_opt")]` for `Option<Bytes>`.
pub mod base64_bytes_opt {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &Option<Bytes>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_some(&encode(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Bytes>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.map(|s| decode(&s).map(Bytes::from).map_err(de::Error::custom))
            .transpose()
    }
}

/// Returns the single top-level key of a loose JSON object, checking it
/// against the closed set of `known` tags.
pub(crate) fn single_tag<'v>(
    value: &'v serde_json::Value,
    known: &[&str],
) -> Result<&'v str, ContentError> {
    let obj = value.as_object().ok_or_else(|| ContentError::Shape { found: vec![] })?;
    if let Some(unknown) = obj.keys().find(|k| !known.contains(&k.as_str())) {
        return Err(ContentError::UnknownTag(unknown.clone()));
    }
    let mut keys = obj.keys();
    match (keys.next(), keys.next()) {
        (Some(tag), None) => Ok(tag.as_str()),
        _ => {
            let found: Vec<String> = obj.keys().cloned().collect();
            tracing::debug!(?found, "content value does not carry exactly one tag");
            Err(ContentError::Shape { found })
        }
    }
}
