//! Message content taxonomy.
//!
//! [`AnyRegularMessageContent`] is the closed set of things a user can send.
//! Every value carries exactly one tag; the serialised form is a JSON object
//! with that tag as its only key:
//!
//! ```json
//! { "text": { "text": "hello", "mentions": ["123@s.whatsapp.net"] } }
//! ```
//!
//! [`AnyMessageContent`] adds the three action tags (`forward`, `delete`,
//! `disappearingMessagesInChat`) which never mix with regular content.

pub mod attachments;
pub mod interactive;
mod loose;
pub mod records;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use wa_crypto::MediaType;

use crate::capability::{mention_set, Capability, ContextInfo, Dimensions};
use crate::codec::single_tag;
use crate::error::ContentError;
use crate::identity::{MessageKey, WebMessageInfo};
use crate::media::MediaUpload;

pub use attachments::{AudioContent, DocumentContent, ImageContent, StickerContent, VideoContent};
pub use interactive::{
    Button, ButtonText, ButtonsContent, HeaderType, ListContent, ListRow, ListSection,
    MessageSecret, PollContent, PollMessageOptions, TemplateButton, TemplateButtonAction,
    TemplateContent, TextContent,
};
pub use records::{
    ButtonReplyContent, ButtonReplyInfo, ButtonReplyType, ContactMessage, ContactsContent, Enabled,
    GroupInviteInfo, ListResponseMessage, ListType, LocationMessage, PinContent, PinDuration,
    PinType, ProductContent, ReactionMessage, SendableProduct, SingleSelectReply,
};

macro_rules! content_union {
    ($($variant:ident($ty:ty) => $tag:literal),* $(,)?) => {
        /// Every regular content tag, in declaration order.
        pub const REGULAR_TAGS: &[&str] = &[$($tag),*];

        /// One piece of user content. Deserialising goes through
        /// [`AnyRegularMessageContent::from_value`], so every parsed value is
        /// checked the same way as a constructed one.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub enum AnyRegularMessageContent {
            $(#[serde(rename = $tag)] $variant($ty),)*
        }

        #[derive(Deserialize)]
        enum Tagged {
            $(#[serde(rename = $tag)] $variant($ty),)*
        }

        impl From<Tagged> for AnyRegularMessageContent {
            fn from(tagged: Tagged) -> Self {
                match tagged {
                    $(Tagged::$variant(c) => Self::$variant(c),)*
                }
            }
        }

        impl AnyRegularMessageContent {
            pub fn tag(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $tag,)*
                }
            }
        }
    };
}

content_union!(
    Text(TextContent) => "text",
    Image(ImageContent) => "image",
    Video(VideoContent) => "video",
    Audio(AudioContent) => "audio",
    Sticker(StickerContent) => "sticker",
    Document(DocumentContent) => "document",
    Poll(PollContent) => "poll",
    Contacts(ContactsContent) => "contacts",
    Location(LocationMessage) => "location",
    React(ReactionMessage) => "react",
    ButtonReply(ButtonReplyContent) => "buttonReply",
    GroupInvite(GroupInviteInfo) => "groupInvite",
    ListReply(ListResponseMessage) => "listReply",
    Pin(PinContent) => "pin",
    Product(ProductContent) => "product",
    SharePhoneNumber(Enabled) => "sharePhoneNumber",
    RequestPhoneNumber(Enabled) => "requestPhoneNumber",
    Buttons(ButtonsContent) => "buttons",
    Template(TemplateContent) => "template",
    List(ListContent) => "list",
);

pub const ACTION_TAGS: &[&str] = &["forward", "delete", "disappearingMessagesInChat"];

/// Default disappearing-message timer: seven days.
pub const WA_DEFAULT_EPHEMERAL: u32 = 7 * 24 * 60 * 60;

/// The fixed capability set of a regular tag; empty for unknown tags.
pub fn capabilities_of(tag: &str) -> &'static [Capability] {
    use Capability as C;
    match tag {
        "text" | "poll" => &[C::Mentions, C::Context, C::Edit],
        "image" | "video" => &[C::Mentions, C::Context, C::Dimensions, C::Edit, C::ViewOnce],
        "audio" => &[C::Edit, C::ViewOnce],
        "sticker" => &[C::Dimensions, C::Edit],
        "document" => &[C::Context, C::Edit],
        "buttons" | "template" | "list" => &[C::Mentions, C::Context],
        _ => &[],
    }
}

impl<'de> Deserialize<'de> for AnyRegularMessageContent {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

macro_rules! from_variant {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for AnyRegularMessageContent {
            fn from(c: $ty) -> Self {
                AnyRegularMessageContent::$variant(c)
            }
        })*
    };
}

from_variant!(
    TextContent => Text,
    ImageContent => Image,
    VideoContent => Video,
    AudioContent => Audio,
    StickerContent => Sticker,
    DocumentContent => Document,
    PollContent => Poll,
    ContactsContent => Contacts,
    LocationMessage => Location,
    ReactionMessage => React,
    ButtonReplyContent => ButtonReply,
    GroupInviteInfo => GroupInvite,
    ListResponseMessage => ListReply,
    PinContent => Pin,
    ProductContent => Product,
    ButtonsContent => Buttons,
    TemplateContent => Template,
    ListContent => List,
);

impl AnyRegularMessageContent {
    // ── Smart constructors ───────────────────────────────────────────────────

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextContent::new(text))
    }

    pub fn image(media: MediaUpload) -> Self {
        Self::Image(ImageContent::new(media))
    }

    pub fn video(media: MediaUpload) -> Self {
        Self::Video(VideoContent::new(media))
    }

    pub fn audio(media: MediaUpload) -> Self {
        Self::Audio(AudioContent::new(media))
    }

    pub fn sticker(media: MediaUpload) -> Self {
        Self::Sticker(StickerContent::new(media))
    }

    pub fn document(media: MediaUpload, mimetype: impl Into<String>) -> Self {
        Self::Document(DocumentContent::new(media, mimetype))
    }

    pub fn poll(poll: PollMessageOptions) -> Result<Self, ContentError> {
        poll.validate()?;
        Ok(Self::Poll(poll.into()))
    }

    pub fn contacts(
        display_name: Option<String>,
        contacts: Vec<ContactMessage>,
    ) -> Result<Self, ContentError> {
        let c = ContactsContent { display_name, contacts };
        c.validate()?;
        Ok(Self::Contacts(c))
    }

    pub fn location(location: LocationMessage) -> Result<Self, ContentError> {
        location.validate()?;
        Ok(Self::Location(location))
    }

    pub fn react(key: MessageKey, emoji: impl Into<String>) -> Self {
        Self::React(ReactionMessage { key, text: emoji.into(), sender_timestamp_ms: None })
    }

    /// Removes our reaction from the message at `key`.
    pub fn unreact(key: MessageKey) -> Self {
        Self::react(key, "")
    }

    pub fn button_reply(reply: ButtonReplyInfo, kind: ButtonReplyType) -> Self {
        Self::ButtonReply(ButtonReplyContent { reply, kind })
    }

    pub fn group_invite(invite: GroupInviteInfo) -> Result<Self, ContentError> {
        invite.validate()?;
        Ok(Self::GroupInvite(invite))
    }

    pub fn list_reply(reply: ListResponseMessage) -> Self {
        Self::ListReply(reply)
    }

    /// `time_secs` must be one of the canonical pin durations. Pinning
    /// without one pins for a day; unpinning carries no duration unless given.
    pub fn pin(key: MessageKey, kind: PinType, time_secs: Option<u32>) -> Result<Self, ContentError> {
        let time = match (kind, time_secs) {
            (_, Some(secs)) => Some(PinDuration::try_from(secs)?),
            (PinType::PinForAll, None) => Some(PinDuration::Day),
            (PinType::UnpinForAll, None) => None,
        };
        Ok(Self::Pin(PinContent { key, kind, time }))
    }

    pub fn product(product: ProductContent) -> Result<Self, ContentError> {
        product.validate()?;
        Ok(Self::Product(product))
    }

    pub fn share_phone_number() -> Self {
        Self::SharePhoneNumber(Enabled)
    }

    pub fn request_phone_number() -> Self {
        Self::RequestPhoneNumber(Enabled)
    }

    pub fn buttons(buttons: ButtonsContent) -> Result<Self, ContentError> {
        buttons.validate()?;
        Ok(Self::Buttons(buttons))
    }

    pub fn template(template: TemplateContent) -> Result<Self, ContentError> {
        template.validate()?;
        Ok(Self::Template(template))
    }

    pub fn list(list: ListContent) -> Result<Self, ContentError> {
        list.validate()?;
        Ok(Self::List(list))
    }

    // ── Introspection ────────────────────────────────────────────────────────

    /// The fixed capability set of this value's tag.
    pub fn capabilities(&self) -> &'static [Capability] {
        capabilities_of(self.tag())
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Media-type tag of the media variants; `None` for everything else.
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            Self::Image(_) => Some(MediaType::Image),
            Self::Video(v) if v.gif_playback => Some(MediaType::Gif),
            Self::Video(v) if v.ptv => Some(MediaType::Ptv),
            Self::Video(_) => Some(MediaType::Video),
            Self::Audio(a) if a.ptt => Some(MediaType::Ptt),
            Self::Audio(_) => Some(MediaType::Audio),
            Self::Sticker(_) => Some(MediaType::Sticker),
            Self::Document(_) => Some(MediaType::Document),
            _ => None,
        }
    }

    /// The attachment to upload, if this variant carries one.
    pub fn media(&self) -> Option<&MediaUpload> {
        match self {
            Self::Image(c) => Some(&c.image),
            Self::Video(c) => Some(&c.video),
            Self::Audio(c) => Some(&c.audio),
            Self::Sticker(c) => Some(&c.sticker),
            Self::Document(c) => Some(&c.document),
            Self::Product(c) => Some(&c.product.product_image),
            _ => None,
        }
    }

    // ── Capability accessors ─────────────────────────────────────────────────

    pub fn mentions(&self) -> &[String] {
        match self {
            Self::Text(c) => &c.mentions,
            Self::Image(c) => &c.mentions,
            Self::Video(c) => &c.mentions,
            Self::Poll(c) => &c.mentions,
            Self::Buttons(c) => &c.mentions,
            Self::Template(c) => &c.mentions,
            Self::List(c) => &c.mentions,
            _ => &[],
        }
    }

    pub fn context_info(&self) -> Option<&ContextInfo> {
        match self {
            Self::Text(c) => c.context_info.as_ref(),
            Self::Image(c) => c.context_info.as_ref(),
            Self::Video(c) => c.context_info.as_ref(),
            Self::Document(c) => c.context_info.as_ref(),
            Self::Poll(c) => c.context_info.as_ref(),
            Self::Buttons(c) => c.context_info.as_ref(),
            Self::Template(c) => c.context_info.as_ref(),
            Self::List(c) => c.context_info.as_ref(),
            _ => None,
        }
    }

    /// Key of the message this value replaces, when it is an edit.
    pub fn edit_target(&self) -> Option<&MessageKey> {
        match self {
            Self::Text(c) => c.edit.as_ref(),
            Self::Image(c) => c.edit.as_ref(),
            Self::Video(c) => c.edit.as_ref(),
            Self::Audio(c) => c.edit.as_ref(),
            Self::Sticker(c) => c.edit.as_ref(),
            Self::Document(c) => c.edit.as_ref(),
            Self::Poll(c) => c.edit.as_ref(),
            _ => None,
        }
    }

    pub fn is_view_once(&self) -> bool {
        match self {
            Self::Image(c) => c.view_once,
            Self::Video(c) => c.view_once,
            Self::Audio(c) => c.view_once,
            _ => false,
        }
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        match self {
            Self::Image(c) => Some(c.dimensions),
            Self::Video(c) => Some(c.dimensions),
            Self::Sticker(c) => Some(c.dimensions),
            _ => None,
        }
    }

    // ── Fallible decorators ──────────────────────────────────────────────────

    fn mentions_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::Text(c) => Some(&mut c.mentions),
            Self::Image(c) => Some(&mut c.mentions),
            Self::Video(c) => Some(&mut c.mentions),
            Self::Poll(c) => Some(&mut c.mentions),
            Self::Buttons(c) => Some(&mut c.mentions),
            Self::Template(c) => Some(&mut c.mentions),
            Self::List(c) => Some(&mut c.mentions),
            _ => None,
        }
    }

    pub fn with_mentions<I, S>(mut self, jids: I) -> Result<Self, ContentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag = self.tag();
        let slot = self
            .mentions_mut()
            .ok_or_else(|| ContentError::unsupported(tag, Capability::Mentions))?;
        *slot = mention_set(jids);
        Ok(self)
    }

    pub fn with_context(mut self, ctx: ContextInfo) -> Result<Self, ContentError> {
        let tag = self.tag();
        let slot = match &mut self {
            Self::Text(c) => &mut c.context_info,
            Self::Image(c) => &mut c.context_info,
            Self::Video(c) => &mut c.context_info,
            Self::Document(c) => &mut c.context_info,
            Self::Poll(c) => &mut c.context_info,
            Self::Buttons(c) => &mut c.context_info,
            Self::Template(c) => &mut c.context_info,
            Self::List(c) => &mut c.context_info,
            _ => return Err(ContentError::unsupported(tag, Capability::Context)),
        };
        *slot = Some(ctx);
        Ok(self)
    }

    pub fn with_edit(mut self, key: MessageKey) -> Result<Self, ContentError> {
        let tag = self.tag();
        let slot = match &mut self {
            Self::Text(c) => &mut c.edit,
            Self::Image(c) => &mut c.edit,
            Self::Video(c) => &mut c.edit,
            Self::Audio(c) => &mut c.edit,
            Self::Sticker(c) => &mut c.edit,
            Self::Document(c) => &mut c.edit,
            Self::Poll(c) => &mut c.edit,
            _ => return Err(ContentError::unsupported(tag, Capability::Edit)),
        };
        *slot = Some(key);
        Ok(self)
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Result<Self, ContentError> {
        let tag = self.tag();
        let slot = match &mut self {
            Self::Image(c) => &mut c.dimensions,
            Self::Video(c) => &mut c.dimensions,
            Self::Sticker(c) => &mut c.dimensions,
            _ => return Err(ContentError::unsupported(tag, Capability::Dimensions)),
        };
        *slot = Dimensions::new(width, height);
        Ok(self)
    }

    pub fn with_view_once(mut self) -> Result<Self, ContentError> {
        let tag = self.tag();
        let slot = match &mut self {
            Self::Image(c) => &mut c.view_once,
            Self::Video(c) => &mut c.view_once,
            Self::Audio(c) => &mut c.view_once,
            _ => return Err(ContentError::unsupported(tag, Capability::ViewOnce)),
        };
        *slot = true;
        Ok(self)
    }

    // ── Validation / loose input ─────────────────────────────────────────────

    /// Re-checks the field constraints that smart constructors enforce.
    /// Needed after mutating variant structs directly.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.media().and_then(MediaUpload::as_url).is_some_and(|u| u.trim().is_empty()) {
            return Err(ContentError::constraint("media", "url is empty"));
        }
        match self {
            Self::Poll(c) => c.poll.validate(),
            Self::Contacts(c) => c.validate(),
            Self::Location(c) => c.validate(),
            Self::GroupInvite(c) => c.validate(),
            Self::Product(c) => c.validate(),
            Self::Buttons(c) => c.validate(),
            Self::Template(c) => c.validate(),
            Self::List(c) => c.validate(),
            Self::Pin(c) if c.kind == PinType::PinForAll && c.time.is_none() => {
                Err(ContentError::constraint("time", "pinning requires a duration"))
            }
            _ => Ok(()),
        }
    }

    /// Converts a loose JSON record, rejecting values with zero or several
    /// top-level tags before looking at any fields. Capability fields the tag
    /// does not carry are rejected, and mention lists are de-duplicated.
    pub fn from_value(value: Value) -> Result<Self, ContentError> {
        let found = single_tag(&value, REGULAR_TAGS)?;
        let tag = loose::static_tag(found).ok_or_else(|| ContentError::UnknownTag(found.to_string()))?;
        debug!(tag, "parsing loose content");
        if let Some(body) = value.get(tag) {
            loose::check(tag, body)?;
        }
        let tagged: Tagged = serde_json::from_value(value)?;
        let mut content = Self::from(tagged);
        if let Some(mentions) = content.mentions_mut() {
            *mentions = mention_set(std::mem::take(mentions));
        }
        content.validate()?;
        Ok(content)
    }
}

// ── Actions ──────────────────────────────────────────────────────────────────

/// `true` turns the default timer on, `false` turns it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisappearingMode {
    Toggle(bool),
    Seconds(u32),
}

impl DisappearingMode {
    pub fn as_seconds(self) -> u32 {
        match self {
            DisappearingMode::Toggle(true) => WA_DEFAULT_EPHEMERAL,
            DisappearingMode::Toggle(false) => 0,
            DisappearingMode::Seconds(s) => s,
        }
    }

    pub fn is_off(self) -> bool {
        self.as_seconds() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardContent {
    pub message: WebMessageInfo,
    /// Forward even when the message is our own, bumping the score.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageAction {
    Forward(ForwardContent),
    /// Tombstone the message at this key.
    Delete(MessageKey),
    DisappearingMessagesInChat(DisappearingMode),
}

impl MessageAction {
    pub fn tag(&self) -> &'static str {
        match self {
            MessageAction::Forward(_) => "forward",
            MessageAction::Delete(_) => "delete",
            MessageAction::DisappearingMessagesInChat(_) => "disappearingMessagesInChat",
        }
    }
}

/// Regular content or one of the action tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyMessageContent {
    Regular(AnyRegularMessageContent),
    Action(MessageAction),
}

impl From<AnyRegularMessageContent> for AnyMessageContent {
    fn from(c: AnyRegularMessageContent) -> Self {
        AnyMessageContent::Regular(c)
    }
}

impl From<MessageAction> for AnyMessageContent {
    fn from(a: MessageAction) -> Self {
        AnyMessageContent::Action(a)
    }
}

impl AnyMessageContent {
    /// Only messages that still carry content can be forwarded.
    pub fn forward(message: WebMessageInfo, force: bool) -> Result<Self, ContentError> {
        if message.message.is_none() {
            return Err(ContentError::constraint("forward", "message has no content to forward"));
        }
        Ok(MessageAction::Forward(ForwardContent { message, force }).into())
    }

    pub fn delete(key: MessageKey) -> Self {
        MessageAction::Delete(key).into()
    }

    pub fn disappearing(mode: DisappearingMode) -> Self {
        MessageAction::DisappearingMessagesInChat(mode).into()
    }

    pub fn tag(&self) -> &'static str {
        match self {
            AnyMessageContent::Regular(c) => c.tag(),
            AnyMessageContent::Action(a) => a.tag(),
        }
    }

    pub fn as_regular(&self) -> Option<&AnyRegularMessageContent> {
        match self {
            AnyMessageContent::Regular(c) => Some(c),
            AnyMessageContent::Action(_) => None,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, ContentError> {
        let known: Vec<&str> = REGULAR_TAGS.iter().chain(ACTION_TAGS).copied().collect();
        let tag = single_tag(&value, &known)?;
        if ACTION_TAGS.contains(&tag) {
            debug!(tag, "parsing loose action");
            let action: MessageAction = serde_json::from_value(value)?;
            if let MessageAction::Forward(f) = &action {
                if f.message.message.is_none() {
                    return Err(ContentError::constraint("forward", "message has no content to forward"));
                }
            }
            Ok(action.into())
        } else {
            AnyRegularMessageContent::from_value(value).map(Into::into)
        }
    }
}
