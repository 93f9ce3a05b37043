//! Media decryption key info — the IV / cipher key / MAC key triple for a
//! downloadable attachment.
//!
//! This is a checked data holder. The HKDF table and expansion live in
//! `wa_crypto::media_keys`; [`MediaDecryptionKeyInfo::derive`] only forwards
//! to it.

use std::fmt;

use wa_crypto::media_keys::{self, CIPHER_KEY_LEN, IV_LEN, MAC_KEY_LEN};
use wa_crypto::MediaType;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ContentError;

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MediaDecryptionKeyInfo {
    iv: [u8; IV_LEN],
    cipher_key: [u8; CIPHER_KEY_LEN],
    mac_key: Option<[u8; MAC_KEY_LEN]>,
}

impl MediaDecryptionKeyInfo {
    /// Checked constructor: IV must be 16 bytes, cipher key 32 bytes, and the
    /// MAC key, when present, 32 bytes.
    pub fn new(iv: &[u8], cipher_key: &[u8], mac_key: Option<&[u8]>) -> Result<Self, ContentError> {
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| {
            ContentError::constraint("iv", format!("expected {IV_LEN} bytes, got {}", iv.len()))
        })?;
        let cipher_key: [u8; CIPHER_KEY_LEN] = cipher_key.try_into().map_err(|_| {
            ContentError::constraint(
                "cipher_key",
                format!("expected {CIPHER_KEY_LEN} bytes, got {}", cipher_key.len()),
            )
        })?;
        let mac_key = mac_key
            .map(|k| {
                <[u8; MAC_KEY_LEN]>::try_from(k).map_err(|_| {
                    ContentError::constraint(
                        "mac_key",
                        format!("expected {MAC_KEY_LEN} bytes, got {}", k.len()),
                    )
                })
            })
            .transpose()?;
        Ok(Self { iv, cipher_key, mac_key })
    }

    /// Expand a 32-byte media key for `media_type`.
    pub fn derive(media_key: &[u8], media_type: MediaType) -> Result<Self, ContentError> {
        let material = media_keys::expand(media_key, media_type)?;
        Ok(Self {
            iv: material.iv,
            cipher_key: material.cipher_key,
            mac_key: Some(material.mac_key),
        })
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn cipher_key(&self) -> &[u8; CIPHER_KEY_LEN] {
        &self.cipher_key
    }

    pub fn mac_key(&self) -> Option<&[u8; MAC_KEY_LEN]> {
        self.mac_key.as_ref()
    }
}

impl fmt::Debug for MediaDecryptionKeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaDecryptionKeyInfo")
            .field("has_mac_key", &self.mac_key.is_some())
            .finish_non_exhaustive()
    }
}
