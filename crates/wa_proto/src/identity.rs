//! Message identity, receipts, and update / upsert envelopes.
//!
//! Everything here is a value type. An edit, status change or any other
//! update is a *new* value that references the original key; nothing is
//! patched in place.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::AnyRegularMessageContent;
use crate::error::ContentError;

pub const GROUP_SERVER: &str = "g.us";
pub const STATUS_BROADCAST_JID: &str = "status@broadcast";

// ── Key ──────────────────────────────────────────────────────────────────────

/// Address of one message.
///
/// Equality and hashing use only `(remote_jid, from_me, id)`. The
/// participant and the LID / phone-number aliases are informational: the
/// same message may be seen under either addressing mode on multi-device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    pub remote_jid: String,
    pub from_me: bool,
    pub id: String,
    /// Sender inside a group chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_lid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_pn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_lid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_pn: Option<String>,
    /// Server-assigned id (newsletter chats).
    #[serde(default, rename = "server_id", skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl MessageKey {
    pub fn new(remote_jid: impl Into<String>, from_me: bool, id: impl Into<String>) -> Self {
        Self {
            remote_jid: remote_jid.into(),
            from_me,
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    pub fn with_sender_aliases(mut self, lid: Option<String>, pn: Option<String>) -> Self {
        self.sender_lid = lid;
        self.sender_pn = pn;
        self
    }

    pub fn with_participant_aliases(mut self, lid: Option<String>, pn: Option<String>) -> Self {
        self.participant_lid = lid;
        self.participant_pn = pn;
        self
    }

    pub fn is_group(&self) -> bool {
        self.remote_jid
            .rsplit_once('@')
            .is_some_and(|(_, server)| server == GROUP_SERVER)
    }

    pub fn is_status_broadcast(&self) -> bool {
        self.remote_jid == STATUS_BROADCAST_JID
    }

    /// The equality-relevant triple.
    pub fn triple(&self) -> (&str, bool, &str) {
        (&self.remote_jid, self.from_me, &self.id)
    }
}

impl PartialEq for MessageKey {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for MessageKey {}

impl Hash for MessageKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.triple().hash(state);
    }
}

// ── Stored message ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Error,
    Pending,
    ServerAck,
    DeliveryAck,
    Read,
    Played,
}

/// A full message record, as received or as produced by the generation
/// pipeline. Also the payload of `forward` and of the `quoted` option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMessageInfo {
    pub key: MessageKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<AnyRegularMessageContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timestamp: Option<DateTime<Utc>>,
    /// Group sender, when not carried by the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub broadcast: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub starred: bool,
}

impl WebMessageInfo {
    pub fn new(key: MessageKey) -> Self {
        Self {
            key,
            message: None,
            message_timestamp: None,
            participant: None,
            push_name: None,
            status: None,
            broadcast: false,
            starred: false,
        }
    }

    pub fn with_message(mut self, content: AnyRegularMessageContent) -> Self {
        self.message = Some(Box::new(content));
        self
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.message_timestamp = Some(ts);
        self
    }

    /// Produce the updated record. The original is left untouched.
    pub fn apply(&self, update: &MessageUpdate) -> Result<WebMessageInfo, ContentError> {
        if update.key != self.key {
            return Err(ContentError::constraint(
                "key",
                format!("update targets {}, record is {}", update.key.id, self.key.id),
            ));
        }
        let patch = &update.update;
        let mut next = self.clone();
        if let Some(message) = &patch.message {
            next.message = Some(message.clone());
        }
        if let Some(ts) = patch.message_timestamp {
            next.message_timestamp = Some(ts);
        }
        if let Some(status) = patch.status {
            next.status = Some(status);
        }
        if let Some(starred) = patch.starred {
            next.starred = starred;
        }
        if let Some(push_name) = &patch.push_name {
            next.push_name = Some(push_name.clone());
        }
        Ok(next)
    }
}

/// Just enough of a message to order and address it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalMessage {
    pub key: MessageKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timestamp: Option<DateTime<Utc>>,
}

impl From<&WebMessageInfo> for MinimalMessage {
    fn from(info: &WebMessageInfo) -> Self {
        Self {
            key: info.key.clone(),
            message_timestamp: info.message_timestamp,
        }
    }
}

// ── Updates ──────────────────────────────────────────────────────────────────

/// Partial patch of a [`WebMessageInfo`]. Absent fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<AnyRegularMessageContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
}

impl MessageUpdatePatch {
    pub fn is_empty(&self) -> bool {
        self == &MessageUpdatePatch::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub key: MessageKey,
    pub update: MessageUpdatePatch,
}

impl MessageUpdate {
    pub fn status(key: MessageKey, status: MessageStatus) -> Self {
        Self {
            key,
            update: MessageUpdatePatch { status: Some(status), ..Default::default() },
        }
    }

    pub fn edit(key: MessageKey, content: AnyRegularMessageContent) -> Self {
        Self {
            key,
            update: MessageUpdatePatch {
                message: Some(Box::new(content)),
                ..Default::default()
            },
        }
    }
}

/// Whether an upsert batch is history backfill or a live event. Advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageUpsertType {
    Append,
    Notify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesUpsert {
    pub messages: Vec<WebMessageInfo>,
    #[serde(rename = "type")]
    pub kind: MessageUpsertType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// ── Receipts ─────────────────────────────────────────────────────────────────

/// Receipt kinds. A plain delivery receipt carries no type, so callers use
/// `Option<MessageReceiptType>` with `None` meaning "delivered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageReceiptType {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "read-self")]
    ReadSelf,
    #[serde(rename = "hist_sync")]
    HistSync,
    #[serde(rename = "peer_msg")]
    PeerMsg,
    #[serde(rename = "sender")]
    Sender,
    #[serde(rename = "inactive")]
    Inactive,
    #[serde(rename = "played")]
    Played,
}

impl MessageReceiptType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageReceiptType::Read => "read",
            MessageReceiptType::ReadSelf => "read-self",
            MessageReceiptType::HistSync => "hist_sync",
            MessageReceiptType::PeerMsg => "peer_msg",
            MessageReceiptType::Sender => "sender",
            MessageReceiptType::Inactive => "inactive",
            MessageReceiptType::Played => "played",
        }
    }

    /// Status a receipt of this kind moves the message to, if any.
    pub fn implied_status(receipt: Option<Self>) -> Option<MessageStatus> {
        match receipt {
            None => Some(MessageStatus::DeliveryAck),
            Some(MessageReceiptType::Read | MessageReceiptType::ReadSelf) => Some(MessageStatus::Read),
            Some(MessageReceiptType::Played) => Some(MessageStatus::Played),
            Some(_) => None,
        }
    }
}

/// Per-recipient receipt timestamps (unix seconds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReceipt {
    pub user_jid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_device_jid: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delivered_device_jid: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUserReceiptUpdate {
    pub key: MessageKey,
    pub receipt: UserReceipt,
}

/// Pagination cursor over a chat's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCursor {
    Before(Option<MessageKey>),
    After(Option<MessageKey>),
}
