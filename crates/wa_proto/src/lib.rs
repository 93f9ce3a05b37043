//! wa_proto — Message content model for the WhatsApp Web client
//!
//! Describes what a user can send and what the generation pipeline needs to
//! turn it into a wire message. Nothing here touches the network; uploads and
//! link previews go through injected collaborators.
//!
//! # Modules
//! - `content`      — Tagged content union (`AnyRegularMessageContent`, `AnyMessageContent`)
//! - `capability`   — Mentions, reply context, dimensions and the capability table
//! - `media`        — Media references (buffer / stream / URL) and download records
//! - `identity`     — Message keys, stored messages, receipts and update envelopes
//! - `options`      — Layered generation options
//! - `collaborator` — Upload, link-preview and profile-picture interfaces, media cache
//! - `key_info`     — Media decryption key triple
//! - `node`         — Opaque binary node for extra relay payload
//! - `codec`        — Base64 serde helpers and loose-value tag counting

pub mod capability;
pub mod codec;
pub mod collaborator;
pub mod content;
pub mod error;
pub mod identity;
pub mod key_info;
pub mod media;
pub mod node;
pub mod options;

pub use capability::{Capability, ContextInfo, Dimensions};
pub use collaborator::{
    CacheStore, MediaUploader, MemoryCacheStore, PictureType, ProfilePictureResolver, UrlInfo,
    UrlInfoResolver,
};
pub use content::{AnyMessageContent, AnyRegularMessageContent, DisappearingMode, MessageAction};
pub use error::{CollaboratorError, ContentError};
pub use identity::{MessageKey, MessageStatus, WebMessageInfo};
pub use key_info::MediaDecryptionKeyInfo;
pub use media::{MediaStream, MediaUpload};
pub use options::{Merge, MessageGenerationOptions, MiscMessageGenerationOptions};
pub use wa_crypto::MediaType;
