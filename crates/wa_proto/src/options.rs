//! Layered message-generation options.
//!
//! Each layer is a plain config record with `Default`; layers combine with
//! [`Merge::merge`], where the override wins field by field:
//!
//! - `Option` fields: the override's value when set, otherwise the base's.
//! - list / map fields: the override's value when non-empty.
//!
//! Merging never clears a field the base had set, and
//! `a.merge(b).merge(c) == a.merge(b.merge(c))`.
//!
//! A few settings exist on more than one layer (upload timeout, background
//! colour, font, status recipients). The media / relay layer wins over the
//! misc layer for those; see [`MediaGenerationOptions::apply_misc`] and
//! [`MessageRelayOptions::apply_misc`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wa_crypto::MediaType;

use crate::collaborator::{CacheStore, MediaUploader, ProfilePictureResolver, UrlInfoResolver};
use crate::error::ContentError;
use crate::identity::WebMessageInfo;
use crate::node::BinaryNode;

pub trait Merge: Sized {
    fn merge(self, overrides: Self) -> Self;
}

impl<T> Merge for Option<T> {
    fn merge(self, overrides: Self) -> Self {
        overrides.or(self)
    }
}

impl<T> Merge for Vec<T> {
    fn merge(self, overrides: Self) -> Self {
        if overrides.is_empty() {
            self
        } else {
            overrides
        }
    }
}

impl<K: Ord, V> Merge for BTreeMap<K, V> {
    fn merge(self, overrides: Self) -> Self {
        if overrides.is_empty() {
            self
        } else {
            overrides
        }
    }
}

// ── Relay ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalRelayOptions {
    /// Client-chosen message id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_cached_group_metadata: Option<bool>,
}

impl Merge for MinimalRelayOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            message_id: self.message_id.merge(o.message_id),
            use_cached_group_metadata: self.use_cached_group_metadata.merge(o.use_cached_group_metadata),
        }
    }
}

/// Send to one participant only, e.g. for retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayParticipant {
    pub jid: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRelayOptions {
    #[serde(flatten)]
    pub minimal: MinimalRelayOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<RelayParticipant>,
    /// Extra attributes for the outgoing `message` stanza.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_nodes: Vec<BinaryNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_user_devices_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_jid_list: Vec<String>,
}

impl Merge for MessageRelayOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            minimal: self.minimal.merge(o.minimal),
            participant: self.participant.merge(o.participant),
            additional_attributes: self.additional_attributes.merge(o.additional_attributes),
            additional_nodes: self.additional_nodes.merge(o.additional_nodes),
            use_user_devices_cache: self.use_user_devices_cache.merge(o.use_user_devices_cache),
            status_jid_list: self.status_jid_list.merge(o.status_jid_list),
        }
    }
}

impl MessageRelayOptions {
    /// Fill gaps from the misc layer. Values already set here are kept.
    pub fn apply_misc(self, misc: &MiscMessageGenerationOptions) -> Self {
        Self {
            minimal: misc.minimal.clone().merge(self.minimal),
            status_jid_list: misc.status_jid_list.clone().merge(self.status_jid_list),
            ..self
        }
    }
}

// ── Misc ─────────────────────────────────────────────────────────────────────

/// Disappearing timer override: seconds, or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EphemeralExpiration {
    Seconds(u32),
    Text(String),
}

impl EphemeralExpiration {
    pub fn as_seconds(&self) -> Result<u32, ContentError> {
        match self {
            EphemeralExpiration::Seconds(s) => Ok(*s),
            EphemeralExpiration::Text(t) => t.trim().parse().map_err(|_| {
                ContentError::constraint("ephemeralExpiration", format!("{t:?} is not a number of seconds"))
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscMessageGenerationOptions {
    #[serde(flatten)]
    pub minimal: MinimalRelayOptions,
    /// Overrides the message timestamp; defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Message being replied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted: Option<Box<WebMessageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_expiration: Option<EphemeralExpiration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_upload_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_jid_list: Vec<String>,
    /// Status background, `#RRGGBB` or `#AARRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<bool>,
}

impl Merge for MiscMessageGenerationOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            minimal: self.minimal.merge(o.minimal),
            timestamp: self.timestamp.merge(o.timestamp),
            quoted: self.quoted.merge(o.quoted),
            ephemeral_expiration: self.ephemeral_expiration.merge(o.ephemeral_expiration),
            media_upload_timeout_ms: self.media_upload_timeout_ms.merge(o.media_upload_timeout_ms),
            status_jid_list: self.status_jid_list.merge(o.status_jid_list),
            background_color: self.background_color.merge(o.background_color),
            font: self.font.merge(o.font),
            broadcast: self.broadcast.merge(o.broadcast),
        }
    }
}

impl MiscMessageGenerationOptions {
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let opts: Self = serde_json::from_str(json)?;
        if let Some(exp) = &opts.ephemeral_expiration {
            exp.as_seconds()?;
        }
        Ok(opts)
    }

    pub fn quoting(mut self, quoted: WebMessageInfo) -> Self {
        self.quoted = Some(Box::new(quoted));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageGenerationOptionsFromContent {
    #[serde(flatten)]
    pub misc: MiscMessageGenerationOptions,
    /// The sending account's jid.
    pub user_jid: String,
}

impl Merge for MessageGenerationOptionsFromContent {
    fn merge(self, o: Self) -> Self {
        Self {
            misc: self.misc.merge(o.misc),
            user_jid: if o.user_jid.is_empty() { self.user_jid } else { o.user_jid },
        }
    }
}

// ── Media ────────────────────────────────────────────────────────────────────

/// Outbound HTTP settings for fetching remote media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestOptions {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_length: Option<u64>,
}

impl Merge for HttpRequestOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            headers: self.headers.merge(o.headers),
            timeout_ms: self.timeout_ms.merge(o.timeout_ms),
            proxy: self.proxy.merge(o.proxy),
            max_content_length: self.max_content_length.merge(o.max_content_length),
        }
    }
}

impl HttpRequestOptions {
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaGenerationOptions {
    #[serde(skip)]
    pub upload: Option<Arc<dyn MediaUploader>>,
    /// Forces the media type used for key derivation and upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type_override: Option<MediaType>,
    #[serde(skip)]
    pub media_cache: Option<Arc<dyn CacheStore>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_upload_timeout_ms: Option<u64>,
    #[serde(default)]
    pub http: HttpRequestOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<u32>,
}

impl MediaGenerationOptions {
    pub fn new(upload: Arc<dyn MediaUploader>) -> Self {
        Self { upload: Some(upload), ..Default::default() }
    }

    /// The upload collaborator; media messages cannot be generated without it.
    pub fn uploader(&self) -> Result<&Arc<dyn MediaUploader>, ContentError> {
        self.upload
            .as_ref()
            .ok_or_else(|| ContentError::constraint("upload", "no media uploader configured"))
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.media_cache = Some(cache);
        self
    }

    /// Fill gaps from the misc layer. Values already set here are kept.
    pub fn apply_misc(self, misc: &MiscMessageGenerationOptions) -> Self {
        Self {
            media_upload_timeout_ms: misc.media_upload_timeout_ms.merge(self.media_upload_timeout_ms),
            background_color: misc.background_color.clone().merge(self.background_color),
            font: misc.font.merge(self.font),
            ..self
        }
    }
}

impl Merge for MediaGenerationOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            upload: self.upload.merge(o.upload),
            media_type_override: self.media_type_override.merge(o.media_type_override),
            media_cache: self.media_cache.merge(o.media_cache),
            media_upload_timeout_ms: self.media_upload_timeout_ms.merge(o.media_upload_timeout_ms),
            http: self.http.merge(o.http),
            background_color: self.background_color.merge(o.background_color),
            font: self.font.merge(o.font),
        }
    }
}

impl fmt::Debug for MediaGenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaGenerationOptions")
            .field("upload", &self.upload.is_some())
            .field("media_type_override", &self.media_type_override)
            .field("media_cache", &self.media_cache.is_some())
            .field("media_upload_timeout_ms", &self.media_upload_timeout_ms)
            .field("http", &self.http)
            .field("background_color", &self.background_color)
            .field("font", &self.font)
            .finish()
    }
}

// ── Content / full ───────────────────────────────────────────────────────────

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContentGenerationOptions {
    #[serde(flatten)]
    pub media: MediaGenerationOptions,
    /// Skipped link previews when absent.
    #[serde(skip)]
    pub url_info: Option<Arc<dyn UrlInfoResolver>>,
    #[serde(skip)]
    pub profile_picture: Option<Arc<dyn ProfilePictureResolver>>,
    /// Target chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jid: Option<String>,
}

impl Merge for MessageContentGenerationOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            media: self.media.merge(o.media),
            url_info: self.url_info.merge(o.url_info),
            profile_picture: self.profile_picture.merge(o.profile_picture),
            jid: self.jid.merge(o.jid),
        }
    }
}

impl fmt::Debug for MessageContentGenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageContentGenerationOptions")
            .field("media", &self.media)
            .field("url_info", &self.url_info.is_some())
            .field("profile_picture", &self.profile_picture.is_some())
            .field("jid", &self.jid)
            .finish()
    }
}

/// Everything the generation pipeline needs for one message.
#[derive(Clone, Debug, Default)]
pub struct MessageGenerationOptions {
    pub content: MessageContentGenerationOptions,
    pub from_content: MessageGenerationOptionsFromContent,
}

impl MessageGenerationOptions {
    pub fn new(upload: Arc<dyn MediaUploader>, user_jid: impl Into<String>) -> Self {
        Self {
            content: MessageContentGenerationOptions {
                media: MediaGenerationOptions::new(upload),
                ..Default::default()
            },
            from_content: MessageGenerationOptionsFromContent {
                user_jid: user_jid.into(),
                ..Default::default()
            },
        }
    }

    pub fn with_misc(mut self, misc: MiscMessageGenerationOptions) -> Self {
        self.from_content.misc = std::mem::take(&mut self.from_content.misc).merge(misc);
        self
    }

    pub fn with_url_info(mut self, resolver: Arc<dyn UrlInfoResolver>) -> Self {
        self.content.url_info = Some(resolver);
        self
    }

    pub fn with_profile_picture(mut self, resolver: Arc<dyn ProfilePictureResolver>) -> Self {
        self.content.profile_picture = Some(resolver);
        self
    }

    /// Media settings with misc-layer fallbacks applied.
    pub fn resolved_media(&self) -> MediaGenerationOptions {
        self.content.media.clone().apply_misc(&self.from_content.misc)
    }

    pub fn upload_timeout_ms(&self) -> Option<u64> {
        self.resolved_media().media_upload_timeout_ms
    }

    pub fn user_jid(&self) -> &str {
        &self.from_content.user_jid
    }

    pub fn quoted(&self) -> Option<&WebMessageInfo> {
        self.from_content.misc.quoted.as_deref()
    }
}

impl Merge for MessageGenerationOptions {
    fn merge(self, o: Self) -> Self {
        Self {
            content: self.content.merge(o.content),
            from_content: self.from_content.merge(o.from_content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn misc(id: Option<&str>, font: Option<u32>, status: &[&str]) -> MiscMessageGenerationOptions {
        MiscMessageGenerationOptions {
            minimal: MinimalRelayOptions { message_id: id.map(String::from), ..Default::default() },
            font,
            status_jid_list: status.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn override_wins_but_never_clears() {
        let base = misc(Some("A"), Some(1), &["x@s.whatsapp.net"]);
        let merged = base.clone().merge(misc(None, Some(2), &[]));
        assert_eq!(merged.minimal.message_id.as_deref(), Some("A"));
        assert_eq!(merged.font, Some(2));
        assert_eq!(merged.status_jid_list, vec!["x@s.whatsapp.net"]);
    }

    #[test]
    fn merge_is_associative() {
        let a = misc(Some("A"), None, &["a@s.whatsapp.net"]);
        let b = misc(None, Some(3), &[]);
        let c = misc(Some("C"), None, &["c@s.whatsapp.net"]);
        assert_eq!(
            a.clone().merge(b.clone()).merge(c.clone()),
            a.merge(b.merge(c))
        );
    }

    #[test]
    fn media_layer_beats_misc_for_shared_fields() {
        let media = MediaGenerationOptions {
            font: Some(5),
            ..Default::default()
        };
        let misc = MiscMessageGenerationOptions {
            font: Some(1),
            background_color: Some("#FF000000".into()),
            media_upload_timeout_ms: Some(10_000),
            ..Default::default()
        };
        let resolved = media.apply_misc(&misc);
        assert_eq!(resolved.font, Some(5));
        assert_eq!(resolved.background_color.as_deref(), Some("#FF000000"));
        assert_eq!(resolved.media_upload_timeout_ms, Some(10_000));
    }

    #[test]
    fn relay_layer_beats_misc_for_status_list() {
        let relay = MessageRelayOptions {
            status_jid_list: vec!["r@s.whatsapp.net".into()],
            ..Default::default()
        };
        let m = misc(Some("M"), None, &["m@s.whatsapp.net"]);
        let resolved = relay.apply_misc(&m);
        assert_eq!(resolved.status_jid_list, vec!["r@s.whatsapp.net"]);
        assert_eq!(resolved.minimal.message_id.as_deref(), Some("M"));
    }

    #[test]
    fn misc_loads_from_json() {
        let opts = MiscMessageGenerationOptions::from_json_str(
            r#"{ "messageId": "3EB0", "ephemeralExpiration": "86400", "font": 2 }"#,
        )
        .unwrap();
        assert_eq!(opts.minimal.message_id.as_deref(), Some("3EB0"));
        assert_eq!(opts.ephemeral_expiration.unwrap().as_seconds().unwrap(), 86_400);

        assert!(MiscMessageGenerationOptions::from_json_str(r#"{ "ephemeralExpiration": "soon" }"#).is_err());
    }

    #[test]
    fn media_options_skip_collaborators_in_json() {
        let opts = MediaGenerationOptions {
            media_type_override: Some(MediaType::Ptv),
            media_upload_timeout_ms: Some(30_000),
            ..Default::default()
        };
        let v = serde_json::to_value(&opts).unwrap();
        assert_eq!(v["mediaTypeOverride"], json!("ptv"));
        assert!(v.get("upload").is_none());
        assert!(opts.uploader().is_err());
    }
}
