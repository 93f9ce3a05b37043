//! Media references — where the bytes of an attachment come from.
//!
//! A [`MediaUpload`] is only a pointer to a byte source. Nothing here reads a
//! file or touches the network; the upload collaborator resolves it later.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};
use tokio::io::AsyncRead;

use crate::error::ContentError;

type Reader = Box<dyn AsyncRead + Send + Unpin>;

/// Single-consumption readable byte stream.
///
/// Clones share the same underlying reader; whichever clone calls
/// [`MediaStream::take`] first gets it.
#[derive(Clone)]
pub struct MediaStream {
    inner: Arc<Mutex<Option<Reader>>>,
}

impl MediaStream {
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(reader)))),
        }
    }

    /// Take the reader out. Returns `None` once it has been consumed.
    pub fn take(&self) -> Option<Reader> {
        self.inner.lock().take()
    }

    pub fn is_consumed(&self) -> bool {
        self.inner.lock().is_none()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

impl PartialEq for MediaStream {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Exactly one byte source for an attachment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawMediaUpload")]
pub enum MediaUpload {
    Buffer(Bytes),
    Stream(MediaStream),
    Url(String),
}

impl MediaUpload {
    pub fn buffer(bytes: impl Into<Bytes>) -> Self {
        MediaUpload::Buffer(bytes.into())
    }

    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        MediaUpload::Stream(MediaStream::new(reader))
    }

    /// Remote source. The URL must not be blank.
    pub fn url(url: impl Into<String>) -> Result<Self, ContentError> {
        MediaUpload::from_parts(None, None, Some(url.into()))
    }

    /// Build from loosely-populated parts, e.g. an FFI record or a form.
    /// Exactly one part must be present.
    pub fn from_parts(
        buffer: Option<Bytes>,
        stream: Option<MediaStream>,
        url: Option<String>,
    ) -> Result<Self, ContentError> {
        match (buffer, stream, url) {
            (Some(b), None, None) => Ok(MediaUpload::Buffer(b)),
            (None, Some(s), None) => Ok(MediaUpload::Stream(s)),
            (None, None, Some(u)) => {
                if u.trim().is_empty() {
                    return Err(ContentError::constraint("media", "url is empty"));
                }
                Ok(MediaUpload::Url(u))
            }
            (None, None, None) => Err(ContentError::constraint("media", "no byte source given")),
            _ => Err(ContentError::constraint(
                "media",
                "more than one byte source given",
            )),
        }
    }

    pub fn as_buffer(&self) -> Option<&Bytes> {
        match self {
            MediaUpload::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            MediaUpload::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&MediaStream> {
        match self {
            MediaUpload::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn source_kind(&self) -> &'static str {
        match self {
            MediaUpload::Buffer(_) => "buffer",
            MediaUpload::Stream(_) => "stream",
            MediaUpload::Url(_) => "url",
        }
    }
}

impl Serialize for MediaUpload {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(1))?;
        match self {
            MediaUpload::Buffer(b) => map.serialize_entry("buffer", &crate::codec::encode(b))?,
            MediaUpload::Url(u) => map.serialize_entry("url", u)?,
            MediaUpload::Stream(_) => {
                return Err(S::Error::custom("stream media sources cannot be serialised"))
            }
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMediaUpload {
    #[serde(default, with = "crate::codec::base64_bytes_opt")]
    buffer: Option<Bytes>,
    #[serde(default)]
    url: Option<String>,
}

impl TryFrom<RawMediaUpload> for MediaUpload {
    type Error = ContentError;

    fn try_from(raw: RawMediaUpload) -> Result<Self, Self::Error> {
        MediaUpload::from_parts(raw.buffer, None, raw.url)
    }
}

/// Checks the source count of a loose `{buffer?, url?}` record, so that
/// constraint failures keep their category instead of surfacing as serde
/// errors. Shapes serde would reject anyway are left to serde.
pub(crate) fn check_loose_source(value: &serde_json::Value) -> Result<(), ContentError> {
    let Some(obj) = value.as_object() else {
        return Ok(());
    };
    let present = |k: &str| obj.get(k).is_some_and(|v| !v.is_null());
    match (present("buffer"), present("url")) {
        (true, true) => Err(ContentError::constraint("media", "more than one byte source given")),
        (false, false) => Err(ContentError::constraint("media", "no byte source given")),
        (false, true) => match obj.get("url").and_then(|v| v.as_str()) {
            Some(u) if u.trim().is_empty() => Err(ContentError::constraint("media", "url is empty")),
            _ => Ok(()),
        },
        (true, false) => Ok(()),
    }
}

/// Enough information to fetch an already-uploaded attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadableMessage {
    #[serde(default, with = "crate::codec::base64_bytes_opt", skip_serializing_if = "Option::is_none")]
    pub media_key: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DownloadableMessage {
    /// A media key plus at least one location.
    pub fn is_downloadable(&self) -> bool {
        self.media_key.is_some() && (self.direct_path.is_some() || self.url.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaHost {
    pub hostname: String,
    pub max_content_length_bytes: u64,
}

/// Upload credentials handed out by the server, valid for `ttl` seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConnInfo {
    pub auth: String,
    pub ttl: u64,
    pub hosts: Vec<MediaHost>,
    pub fetch_date: DateTime<Utc>,
}

impl MediaConnInfo {
    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = i64::try_from(self.ttl).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        self.fetch_date
            .checked_add_signed(Duration::seconds(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
