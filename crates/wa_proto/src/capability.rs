//! Capability traits — optional field bundles that attach to content tags.
//!
//! Which tag carries which capability is fixed by the taxonomy
//! (see `AnyRegularMessageContent::capabilities`), callers never pick freely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::AnyRegularMessageContent;
use crate::identity::{MessageKey, WebMessageInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Ordered set of addressed participant jids.
    Mentions,
    /// Reply / quote context.
    Context,
    /// Media disappears after a single view.
    ViewOnce,
    /// Content replaces the message at a given key.
    Edit,
    /// Advisory pixel width / height.
    Dimensions,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Mentions => "mentions",
            Capability::Context => "reply context",
            Capability::ViewOnce => "view-once",
            Capability::Edit => "edit target",
            Capability::Dimensions => "dimensions",
        };
        f.write_str(name)
    }
}

/// Reply / quote context attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    /// Id of the quoted message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stanza_id: Option<String>,
    /// Author of the quoted message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    /// Chat the quoted message lives in, when it differs from the target chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_jid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_message: Option<Box<AnyRegularMessageContent>>,
    /// Disappearing-message timer in seconds, inherited from the chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_forwarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding_score: Option<u32>,
}

impl ContextInfo {
    /// Context quoting `quoted`. `user_jid` is our own jid, used as the
    /// quoted participant when we authored the quoted message.
    pub fn reply_to(quoted: &WebMessageInfo, user_jid: &str) -> Self {
        let participant = if quoted.key.from_me {
            user_jid.to_string()
        } else {
            quoted
                .participant
                .clone()
                .or_else(|| quoted.key.participant.clone())
                .unwrap_or_else(|| quoted.key.remote_jid.clone())
        };
        Self {
            stanza_id: Some(quoted.key.id.clone()),
            participant: Some(participant),
            remote_jid: None,
            quoted_message: quoted.message.clone(),
            expiration: None,
            is_forwarded: false,
            forwarding_score: None,
        }
    }

    pub fn with_expiration(mut self, seconds: u32) -> Self {
        self.expiration = Some(seconds);
        self
    }

    /// Key of the quoted message, when the context names one.
    pub fn quoted_key(&self, chat_jid: &str, user_jid: &str) -> Option<MessageKey> {
        let id = self.stanza_id.as_ref()?;
        let remote = self.remote_jid.as_deref().unwrap_or(chat_jid);
        let participant = self.participant.clone();
        let from_me = participant.as_deref() == Some(user_jid);
        let mut key = MessageKey::new(remote, from_me, id.clone());
        key.participant = participant;
        Some(key)
    }
}

/// Advisory pixel dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: Some(width), height: Some(height) }
    }

    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Builds an ordered, duplicate-free mention list.
pub fn mention_set<I, S>(jids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for jid in jids {
        let jid = jid.into();
        if !out.contains(&jid) {
            out.push(jid);
        }
    }
    out
}
