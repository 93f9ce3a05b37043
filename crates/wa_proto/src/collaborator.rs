//! Injected asynchronous collaborators.
//!
//! The generation pipeline calls these; this crate only fixes their shape.
//! Each call is single-shot: it resolves with a result or fails with a
//! [`CollaboratorError`]. Timeouts travel as data (`timeout_ms`) and are
//! enforced by whoever drives the call. Independent calls for one message
//! may run concurrently.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use wa_crypto::MediaType;

use crate::error::CollaboratorError;
use crate::media::DownloadableMessage;

// ── Upload ───────────────────────────────────────────────────────────────────

/// Everything the uploader gets besides the encrypted file itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Base64 SHA-256 of the *encrypted* file.
    pub file_enc_sha256_b64: String,
    pub media_type: MediaType,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub media_url: String,
    pub direct_path: String,
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload the already-encrypted blob at `enc_file_path`.
    async fn upload(
        &self,
        enc_file_path: &Path,
        request: UploadRequest,
    ) -> Result<UploadedMedia, CollaboratorError>;
}

// ── Link preview ─────────────────────────────────────────────────────────────

/// Link-preview record for a URL found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlInfo {
    #[serde(rename = "canonical-url")]
    pub canonical_url: String,
    #[serde(rename = "matched-text")]
    pub matched_text: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "jpegThumbnail",
        default,
        with = "crate::codec::base64_bytes_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub jpeg_thumbnail: Option<Bytes>,
    /// Uploaded full-size thumbnail.
    #[serde(rename = "highQualityThumbnail", default, skip_serializing_if = "Option::is_none")]
    pub high_quality_thumbnail: Option<DownloadableMessage>,
    #[serde(rename = "originalThumbnailUrl", default, skip_serializing_if = "Option::is_none")]
    pub original_thumbnail_url: Option<String>,
}

#[async_trait]
pub trait UrlInfoResolver: Send + Sync {
    /// `Ok(None)` means no preview was found; the pipeline then sends the
    /// text without one.
    async fn url_info(&self, text: &str) -> Result<Option<UrlInfo>, CollaboratorError>;
}

// ── Profile picture ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PictureType {
    /// Full resolution.
    Image,
    /// Thumbnail.
    Preview,
}

#[async_trait]
pub trait ProfilePictureResolver: Send + Sync {
    async fn profile_picture_url(
        &self,
        jid: &str,
        kind: PictureType,
    ) -> Result<Option<String>, CollaboratorError>;
}

// ── Closure adapters ─────────────────────────────────────────────────────────

pub struct FnUploader<F>(F);
pub struct FnUrlInfo<F>(F);
pub struct FnProfilePicture<F>(F);

macro_rules! opaque_debug {
    ($($ty:ident),*) => {
        $(impl<F> fmt::Debug for $ty<F> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($ty))
            }
        })*
    };
}

opaque_debug!(FnUploader, FnUrlInfo, FnProfilePicture);

/// Wrap an async closure as a [`MediaUploader`].
pub fn upload_fn<F, Fut>(f: F) -> FnUploader<F>
where
    F: Fn(PathBuf, UploadRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<UploadedMedia, CollaboratorError>> + Send + 'static,
{
    FnUploader(f)
}

/// Wrap an async closure as a [`UrlInfoResolver`].
pub fn url_info_fn<F, Fut>(f: F) -> FnUrlInfo<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<UrlInfo>, CollaboratorError>> + Send + 'static,
{
    FnUrlInfo(f)
}

/// Wrap an async closure as a [`ProfilePictureResolver`].
pub fn profile_picture_fn<F, Fut>(f: F) -> FnProfilePicture<F>
where
    F: Fn(String, PictureType) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, CollaboratorError>> + Send + 'static,
{
    FnProfilePicture(f)
}

#[async_trait]
impl<F, Fut> MediaUploader for FnUploader<F>
where
    F: Fn(PathBuf, UploadRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<UploadedMedia, CollaboratorError>> + Send + 'static,
{
    async fn upload(
        &self,
        enc_file_path: &Path,
        request: UploadRequest,
    ) -> Result<UploadedMedia, CollaboratorError> {
        (self.0)(enc_file_path.to_path_buf(), request).await
    }
}

#[async_trait]
impl<F, Fut> UrlInfoResolver for FnUrlInfo<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<UrlInfo>, CollaboratorError>> + Send + 'static,
{
    async fn url_info(&self, text: &str) -> Result<Option<UrlInfo>, CollaboratorError> {
        (self.0)(text.to_string()).await
    }
}

#[async_trait]
impl<F, Fut> ProfilePictureResolver for FnProfilePicture<F>
where
    F: Fn(String, PictureType) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, CollaboratorError>> + Send + 'static,
{
    async fn profile_picture_url(
        &self,
        jid: &str,
        kind: PictureType,
    ) -> Result<Option<String>, CollaboratorError> {
        (self.0)(jid.to_string(), kind).await
    }
}

// ── Media cache ──────────────────────────────────────────────────────────────

/// Key/value store for re-using uploads of identical media.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;
    fn set(&self, key: &str, value: Bytes);
    fn del(&self, key: &str);
    fn flush_all(&self);
}

/// Process-local [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Bytes>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Bytes) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn del(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn flush_all(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn upload_closure_sees_request() {
        let uploader = upload_fn(|path: PathBuf, req: UploadRequest| async move {
            assert_eq!(req.media_type, MediaType::Image);
            Ok::<_, CollaboratorError>(UploadedMedia {
                media_url: format!("https://mmg.whatsapp.net{}", path.display()),
                direct_path: format!("/v/{}", req.file_enc_sha256_b64),
            })
        });
        let uploader: Arc<dyn MediaUploader> = Arc::new(uploader);
        let res = uploader
            .upload(
                Path::new("/tmp/enc.bin"),
                UploadRequest {
                    file_enc_sha256_b64: "abc=".into(),
                    media_type: MediaType::Image,
                    timeout_ms: Some(30_000),
                },
            )
            .await
            .unwrap();
        assert_eq!(res.direct_path, "/v/abc=");
        assert_eq!(res.media_url, "https://mmg.whatsapp.net/tmp/enc.bin");
    }

    #[tokio::test]
    async fn failures_propagate_unchanged() {
        let resolver = url_info_fn(|_text: String| async move {
            Err::<Option<UrlInfo>, _>(CollaboratorError::TimedOut { timeout_ms: 5_000 })
        });
        let err = resolver.url_info("see https://example.com").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::TimedOut { timeout_ms: 5_000 }));
    }

    #[tokio::test]
    async fn absent_picture_is_none() {
        let resolver = profile_picture_fn(|jid: String, kind: PictureType| async move {
            Ok::<_, CollaboratorError>((kind == PictureType::Preview && jid.ends_with("@s.whatsapp.net"))
                .then(|| format!("https://pps.whatsapp.net/{jid}")))
        });
        assert!(resolver
            .profile_picture_url("1@s.whatsapp.net", PictureType::Image)
            .await
            .unwrap()
            .is_none());
        assert!(resolver
            .profile_picture_url("1@s.whatsapp.net", PictureType::Preview)
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn memory_cache_roundtrip() {
        let cache = MemoryCacheStore::new();
        cache.set("sha", Bytes::from_static(b"{\"url\":\"x\"}"));
        assert_eq!(cache.get("sha").as_deref(), Some(&b"{\"url\":\"x\"}"[..]));
        cache.del("sha");
        assert!(cache.get("sha").is_none());
        cache.set("a", Bytes::new());
        cache.set("b", Bytes::new());
        assert_eq!(cache.len(), 2);
        cache.flush_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn url_info_uses_dashed_keys() {
        let info = UrlInfo {
            canonical_url: "https://example.com/".into(),
            matched_text: "example.com".into(),
            title: "Example".into(),
            description: None,
            jpeg_thumbnail: None,
            high_quality_thumbnail: None,
            original_thumbnail_url: None,
        };
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "canonical-url": "https://example.com/",
                "matched-text": "example.com",
                "title": "Example"
            })
        );
    }
}
