//! Media-bearing content variants.

use serde::{Deserialize, Serialize};

use crate::capability::{mention_set, ContextInfo, Dimensions};
use crate::identity::MessageKey;
use crate::media::MediaUpload;

fn is_false(b: &bool) -> bool {
    !*b
}

/// `image` — mentions, context, dimensions, edit, view-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub image: MediaUpload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Base64 JPEG thumbnail; generated by the pipeline when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpeg_thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub view_once: bool,
}

impl ImageContent {
    pub fn new(image: MediaUpload) -> Self {
        Self {
            image,
            caption: None,
            jpeg_thumbnail: None,
            mimetype: None,
            mentions: Vec::new(),
            context_info: None,
            dimensions: Dimensions::default(),
            edit: None,
            view_once: false,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn jpeg_thumbnail(mut self, b64: impl Into<String>) -> Self {
        self.jpeg_thumbnail = Some(b64.into());
        self
    }

    pub fn mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn mentions<I, S>(mut self, jids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions = mention_set(jids);
        self
    }

    pub fn context(mut self, ctx: ContextInfo) -> Self {
        self.context_info = Some(ctx);
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Dimensions::new(width, height);
        self
    }

    pub fn edit(mut self, key: MessageKey) -> Self {
        self.edit = Some(key);
        self
    }

    pub fn view_once(mut self) -> Self {
        self.view_once = true;
        self
    }
}

/// `video` — as `image`, plus GIF playback and round video-note flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub video: MediaUpload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub gif_playback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpeg_thumbnail: Option<String>,
    /// Sent as a round video note.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ptv: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub view_once: bool,
}

impl VideoContent {
    pub fn new(video: MediaUpload) -> Self {
        Self {
            video,
            caption: None,
            gif_playback: false,
            jpeg_thumbnail: None,
            ptv: false,
            mimetype: None,
            mentions: Vec::new(),
            context_info: None,
            dimensions: Dimensions::default(),
            edit: None,
            view_once: false,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn gif_playback(mut self) -> Self {
        self.gif_playback = true;
        self
    }

    pub fn ptv(mut self) -> Self {
        self.ptv = true;
        self
    }

    pub fn jpeg_thumbnail(mut self, b64: impl Into<String>) -> Self {
        self.jpeg_thumbnail = Some(b64.into());
        self
    }

    pub fn mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn mentions<I, S>(mut self, jids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions = mention_set(jids);
        self
    }

    pub fn context(mut self, ctx: ContextInfo) -> Self {
        self.context_info = Some(ctx);
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Dimensions::new(width, height);
        self
    }

    pub fn edit(mut self, key: MessageKey) -> Self {
        self.edit = Some(key);
        self
    }

    pub fn view_once(mut self) -> Self {
        self.view_once = true;
        self
    }
}

/// `audio` — no mentions, no context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AudioContent {
    pub audio: MediaUpload,
    /// Push-to-talk voice note.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ptt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub view_once: bool,
}

impl AudioContent {
    pub fn new(audio: MediaUpload) -> Self {
        Self {
            audio,
            ptt: false,
            seconds: None,
            mimetype: None,
            edit: None,
            view_once: false,
        }
    }

    pub fn ptt(mut self) -> Self {
        self.ptt = true;
        self
    }

    pub fn seconds(mut self, seconds: u32) -> Self {
        self.seconds = Some(seconds);
        self
    }

    pub fn mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn edit(mut self, key: MessageKey) -> Self {
        self.edit = Some(key);
        self
    }

    pub fn view_once(mut self) -> Self {
        self.view_once = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerContent {
    pub sticker: MediaUpload,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
}

impl StickerContent {
    pub fn new(sticker: MediaUpload) -> Self {
        Self {
            sticker,
            is_animated: false,
            mimetype: None,
            dimensions: Dimensions::default(),
            edit: None,
        }
    }

    pub fn animated(mut self) -> Self {
        self.is_animated = true;
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Dimensions::new(width, height);
        self
    }

    pub fn mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn edit(mut self, key: MessageKey) -> Self {
        self.edit = Some(key);
        self
    }
}

/// `document` — the mimetype is mandatory here, unlike other media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentContent {
    pub document: MediaUpload,
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
}

impl DocumentContent {
    pub fn new(document: MediaUpload, mimetype: impl Into<String>) -> Self {
        Self {
            document,
            mimetype: mimetype.into(),
            file_name: None,
            caption: None,
            context_info: None,
            edit: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn context(mut self, ctx: ContextInfo) -> Self {
        self.context_info = Some(ctx);
        self
    }

    pub fn edit(mut self, key: MessageKey) -> Self {
        self.edit = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> MessageKey {
        MessageKey::new("1@s.whatsapp.net", true, "E1")
    }

    fn url(u: &str) -> MediaUpload {
        MediaUpload::url(u).unwrap()
    }

    #[test]
    fn every_media_kind_can_carry_an_edit() {
        assert_eq!(VideoContent::new(url("https://x/v")).edit(key()).edit, Some(key()));
        assert_eq!(AudioContent::new(url("https://x/a")).edit(key()).edit, Some(key()));
        assert_eq!(StickerContent::new(url("https://x/s")).edit(key()).edit, Some(key()));
        assert_eq!(DocumentContent::new(url("https://x/d"), "a/b").edit(key()).edit, Some(key()));
    }

    #[test]
    fn builders_fill_optional_fields() {
        let video = VideoContent::new(url("https://x/v"))
            .mimetype("video/mp4")
            .jpeg_thumbnail("/9j/")
            .view_once();
        let v = serde_json::to_value(&video).unwrap();
        assert_eq!(v["mimetype"], json!("video/mp4"));
        assert_eq!(v["jpegThumbnail"], json!("/9j/"));
        assert_eq!(v["viewOnce"], json!(true));

        let audio = AudioContent::new(url("https://x/a")).view_once();
        assert!(audio.view_once);

        let sticker = StickerContent::new(url("https://x/s")).mimetype("image/webp");
        assert_eq!(sticker.mimetype.as_deref(), Some("image/webp"));
    }

    #[test]
    fn audio_refuses_fields_it_does_not_have() {
        let v = json!({ "audio": { "url": "https://x/a" }, "caption": "no" });
        assert!(serde_json::from_value::<AudioContent>(v).is_err());
    }
}
