//! wa_crypto — media key material for the multi-device chat client
//!
//! Only key *derivation* lives here. Ciphers, MAC verification and the
//! transport-level session crypto belong to other layers.
//!
//! # Module layout
//! - `media_keys` — media-type tags, HKDF info-string table, key expansion
//! - `kdf`        — HKDF-SHA256 helper
//! - `hash`       — SHA-256 digests of encrypted media files
//! - `error`      — unified error type

pub mod error;
pub mod hash;
pub mod kdf;
pub mod media_keys;

pub use error::CryptoError;
pub use media_keys::{MediaKeyMaterial, MediaType};
