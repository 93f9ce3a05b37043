//! Media key expansion
//!
//! Every attachment is encrypted under its own random 32-byte media key.
//! The key is stretched with HKDF-SHA256 (empty salt) into 112 bytes:
//!
//! ```text
//! [  0..16 )  iv
//! [ 16..48 )  cipher key (AES-256-CBC)
//! [ 48..80 )  mac key    (HMAC-SHA256)
//! [ 80..112)  ref key    (unused here)
//! ```
//!
//! The HKDF info string is `"WhatsApp <label> Keys"` where the label is fixed
//! per media type, see [`MediaType::hkdf_label`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::kdf::hkdf_expand;

pub const MEDIA_KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const CIPHER_KEY_LEN: usize = 32;
pub const MAC_KEY_LEN: usize = 32;

const EXPANDED_LEN: usize = 112;

/// Media type tag, one entry per row of the key-derivation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    Audio,
    Document,
    Gif,
    Image,
    Ppic,
    Product,
    Ptt,
    Sticker,
    Video,
    ThumbnailDocument,
    ThumbnailImage,
    ThumbnailVideo,
    ThumbnailLink,
    MdMsgHist,
    MdAppState,
    ProductCatalogImage,
    PaymentBgImage,
    Ptv,
    BizCoverPhoto,
}

impl MediaType {
    pub const ALL: [MediaType; 19] = [
        MediaType::Audio,
        MediaType::Document,
        MediaType::Gif,
        MediaType::Image,
        MediaType::Ppic,
        MediaType::Product,
        MediaType::Ptt,
        MediaType::Sticker,
        MediaType::Video,
        MediaType::ThumbnailDocument,
        MediaType::ThumbnailImage,
        MediaType::ThumbnailVideo,
        MediaType::ThumbnailLink,
        MediaType::MdMsgHist,
        MediaType::MdAppState,
        MediaType::ProductCatalogImage,
        MediaType::PaymentBgImage,
        MediaType::Ptv,
        MediaType::BizCoverPhoto,
    ];

    /// Wire tag, as used by the media upload endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Document => "document",
            MediaType::Gif => "gif",
            MediaType::Image => "image",
            MediaType::Ppic => "ppic",
            MediaType::Product => "product",
            MediaType::Ptt => "ptt",
            MediaType::Sticker => "sticker",
            MediaType::Video => "video",
            MediaType::ThumbnailDocument => "thumbnail-document",
            MediaType::ThumbnailImage => "thumbnail-image",
            MediaType::ThumbnailVideo => "thumbnail-video",
            MediaType::ThumbnailLink => "thumbnail-link",
            MediaType::MdMsgHist => "md-msg-hist",
            MediaType::MdAppState => "md-app-state",
            MediaType::ProductCatalogImage => "product-catalog-image",
            MediaType::PaymentBgImage => "payment-bg-image",
            MediaType::Ptv => "ptv",
            MediaType::BizCoverPhoto => "biz-cover-photo",
        }
    }

    /// Label spliced into the HKDF info string. Empty for profile pictures
    /// and catalog images, which are not end-to-end encrypted.
    pub fn hkdf_label(self) -> &'static str {
        match self {
            MediaType::Audio | MediaType::Ptt => "Audio",
            MediaType::Document => "Document",
            MediaType::Gif | MediaType::Video | MediaType::Ptv => "Video",
            MediaType::Image
            | MediaType::Product
            | MediaType::Sticker
            | MediaType::BizCoverPhoto => "Image",
            MediaType::Ppic | MediaType::ProductCatalogImage => "",
            MediaType::ThumbnailDocument => "Document Thumbnail",
            MediaType::ThumbnailImage => "Image Thumbnail",
            MediaType::ThumbnailVideo => "Video Thumbnail",
            MediaType::ThumbnailLink => "Link Thumbnail",
            MediaType::MdMsgHist => "History",
            MediaType::MdAppState => "App State",
            MediaType::PaymentBgImage => "Payment Background",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CryptoError::UnknownMediaType(s.to_string()))
    }
}

/// HKDF info string for `media_type`.
pub fn hkdf_info(media_type: MediaType) -> String {
    format!("WhatsApp {} Keys", media_type.hkdf_label())
}

/// Expanded key block for one attachment. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MediaKeyMaterial {
    pub iv: [u8; IV_LEN],
    pub cipher_key: [u8; CIPHER_KEY_LEN],
    pub mac_key: [u8; MAC_KEY_LEN],
}

impl fmt::Debug for MediaKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaKeyMaterial").finish_non_exhaustive()
    }
}

/// Generate a fresh random media key (one per attachment, never reused).
pub fn generate_media_key() -> [u8; MEDIA_KEY_LEN] {
    use rand::RngCore;
    let mut key = [0u8; MEDIA_KEY_LEN];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

/// Expand `media_key` into iv / cipher key / mac key for `media_type`.
pub fn expand(media_key: &[u8], media_type: MediaType) -> Result<MediaKeyMaterial, CryptoError> {
    if media_key.len() != MEDIA_KEY_LEN {
        return Err(CryptoError::InvalidKey(format!(
            "media key must be {MEDIA_KEY_LEN} bytes, got {}",
            media_key.len()
        )));
    }
    tracing::trace!(media_type = %media_type, "expanding media key");

    let mut expanded = zeroize::Zeroizing::new([0u8; EXPANDED_LEN]);
    hkdf_expand(media_key, None, hkdf_info(media_type).as_bytes(), &mut expanded[..])?;

    let mut material = MediaKeyMaterial {
        iv: [0u8; IV_LEN],
        cipher_key: [0u8; CIPHER_KEY_LEN],
        mac_key: [0u8; MAC_KEY_LEN],
    };
    material.iv.copy_from_slice(&expanded[..16]);
    material.cipher_key.copy_from_slice(&expanded[16..48]);
    material.mac_key.copy_from_slice(&expanded[48..80]);
    Ok(material)
}
