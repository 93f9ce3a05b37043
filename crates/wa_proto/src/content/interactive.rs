//! Text-bearing content variants: plain text, polls and the interactive
//! button / template / list messages.

use std::collections::HashSet;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::capability::{mention_set, ContextInfo};
use crate::codec;
use crate::collaborator::UrlInfo;
use crate::error::ContentError;
use crate::identity::MessageKey;

pub const POLL_SECRET_LEN: usize = 32;

// ── Text ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextContent {
    pub text: String,
    /// Pre-resolved preview. When absent the pipeline may ask the
    /// link-preview resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_preview: Option<UrlInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link_preview: None,
            mentions: Vec::new(),
            context_info: None,
            edit: None,
        }
    }

    pub fn link_preview(mut self, info: UrlInfo) -> Self {
        self.link_preview = Some(info);
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

    pub fn edit(mut self, key: MessageKey) -> Self {
        self.edit = Some(key);
        self
    }
}

// ── Poll ─────────────────────────────────────────────────────────────────────

/// 32-byte poll encryption secret. Only its length is checked here.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageSecret([u8; POLL_SECRET_LEN]);

impl MessageSecret {
    pub fn new(bytes: &[u8]) -> Result<Self, ContentError> {
        <[u8; POLL_SECRET_LEN]>::try_from(bytes).map(Self).map_err(|_| {
            ContentError::constraint(
                "messageSecret",
                format!("expected {POLL_SECRET_LEN} bytes, got {}", bytes.len()),
            )
        })
    }

    pub fn as_bytes(&self) -> &[u8; POLL_SECRET_LEN] {
        &self.0
    }
}

impl fmt::Debug for MessageSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageSecret(..)")
    }
}

impl Serialize for MessageSecret {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&codec::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for MessageSecret {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        let raw = codec::decode(&s).map_err(de::Error::custom)?;
        MessageSecret::new(&raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollMessageOptions {
    pub name: String,
    /// 0 means any number of options may be picked.
    #[serde(default)]
    pub selectable_count: u32,
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_secret: Option<MessageSecret>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub to_announcement_group: bool,
}

impl PollMessageOptions {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            selectable_count: 0,
            values: values.into_iter().map(Into::into).collect(),
            message_secret: None,
            to_announcement_group: false,
        }
    }

    pub fn selectable_count(mut self, n: u32) -> Self {
        self.selectable_count = n;
        self
    }

    pub fn secret(mut self, secret: MessageSecret) -> Self {
        self.message_secret = Some(secret);
        self
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.name.trim().is_empty() {
            return Err(ContentError::constraint("name", "poll name must not be empty"));
        }
        if self.values.is_empty() {
            return Err(ContentError::constraint("values", "a poll needs at least one option"));
        }
        let mut seen = HashSet::with_capacity(self.values.len());
        if let Some(dup) = self.values.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(ContentError::constraint("values", format!("duplicate option {dup:?}")));
        }
        if self.selectable_count as usize > self.values.len() {
            return Err(ContentError::constraint(
                "selectableCount",
                format!("{} exceeds {} options", self.selectable_count, self.values.len()),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollContent {
    #[serde(flatten)]
    pub poll: PollMessageOptions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<MessageKey>,
}

impl From<PollMessageOptions> for PollContent {
    fn from(poll: PollMessageOptions) -> Self {
        Self { poll, mentions: Vec::new(), context_info: None, edit: None }
    }
}

// ── Buttons ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonText {
    pub display_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub button_id: String,
    pub button_text: ButtonText,
    /// 1 = response button.
    #[serde(rename = "type", default = "Button::response_type")]
    pub kind: u32,
}

impl Button {
    fn response_type() -> u32 {
        1
    }

    pub fn new(id: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            button_id: id.into(),
            button_text: ButtonText { display_text: display_text.into() },
            kind: Self::response_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderType {
    #[default]
    Empty,
    Text,
    Document,
    Image,
    Video,
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ButtonsContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default)]
    pub header_type: HeaderType,
    pub buttons: Vec<Button>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

impl ButtonsContent {
    pub fn new(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            footer: None,
            header_type: HeaderType::Empty,
            buttons,
            mentions: Vec::new(),
            context_info: None,
        }
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.buttons.is_empty() {
            return Err(ContentError::constraint("buttons", "at least one button is required"));
        }
        let mut ids = HashSet::new();
        if let Some(b) = self.buttons.iter().find(|b| !ids.insert(b.button_id.as_str())) {
            return Err(ContentError::constraint("buttons", format!("duplicate button id {:?}", b.button_id)));
        }
        Ok(())
    }
}

// ── Template ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TemplateButtonAction {
    UrlButton { display_text: String, url: String },
    CallButton { display_text: String, phone_number: String },
    QuickReplyButton { display_text: String, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateButton {
    pub index: u32,
    #[serde(flatten)]
    pub action: TemplateButtonAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub template_buttons: Vec<TemplateButton>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

impl TemplateContent {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.template_buttons.is_empty() {
            return Err(ContentError::constraint("templateButtons", "at least one button is required"));
        }
        Ok(())
    }
}

// ── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    pub title: String,
    pub row_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListContent {
    pub text: String,
    pub button_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub sections: Vec<ListSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

impl ListContent {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.sections.is_empty() || self.sections.iter().all(|s| s.rows.is_empty()) {
            return Err(ContentError::constraint("sections", "a list needs at least one row"));
        }
        let mut ids = HashSet::new();
        for row in self.sections.iter().flat_map(|s| &s.rows) {
            if !ids.insert(row.row_id.as_str()) {
                return Err(ContentError::constraint("sections", format!("duplicate row id {:?}", row.row_id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn poll_rules() {
        assert!(PollMessageOptions::new("Lunch?", ["pizza", "sushi"]).validate().is_ok());
        assert!(PollMessageOptions::new("Lunch?", Vec::<String>::new()).validate().is_err());
        assert!(PollMessageOptions::new("Lunch?", ["pizza", "pizza"]).validate().is_err());
        assert!(PollMessageOptions::new("Lunch?", ["a", "b"])
            .selectable_count(3)
            .validate()
            .is_err());
        assert!(PollMessageOptions::new(" ", ["a"]).validate().is_err());
    }

    #[test]
    fn poll_secret_length_checked() {
        assert!(MessageSecret::new(&[7u8; 31]).is_err());
        let secret = MessageSecret::new(&[7u8; 32]).unwrap();
        let poll = PollMessageOptions::new("q", ["a"]).secret(secret.clone());
        let v = serde_json::to_value(&poll).unwrap();
        let back: PollMessageOptions = serde_json::from_value(v).unwrap();
        assert_eq!(back.message_secret, Some(secret));

        let short = json!({ "name": "q", "values": ["a"], "messageSecret": "AAAA" });
        assert!(serde_json::from_value::<PollMessageOptions>(short).is_err());
    }

    #[test]
    fn template_button_is_flat() {
        let button = TemplateButton {
            index: 1,
            action: TemplateButtonAction::UrlButton {
                display_text: "Open".into(),
                url: "https://example.com".into(),
            },
        };
        let v = serde_json::to_value(&button).unwrap();
        assert_eq!(
            v,
            json!({ "index": 1, "urlButton": { "displayText": "Open", "url": "https://example.com" } })
        );
        let back: TemplateButton = serde_json::from_value(v).unwrap();
        assert_eq!(back, button);
    }

    #[test]
    fn list_rows_must_be_unique() {
        let row = |id: &str| ListRow { title: id.into(), row_id: id.into(), description: None };
        let mut list = ListContent {
            text: "Pick".into(),
            button_text: "Menu".into(),
            title: None,
            footer: None,
            sections: vec![ListSection { title: "A".into(), rows: vec![row("1"), row("2")] }],
            mentions: vec![],
            context_info: None,
        };
        assert!(list.validate().is_ok());
        list.sections.push(ListSection { title: "B".into(), rows: vec![row("2")] });
        assert!(list.validate().is_err());
        list.sections.clear();
        assert!(list.validate().is_err());
    }

    #[test]
    fn button_type_defaults_to_response() {
        let b: Button =
            serde_json::from_value(json!({ "buttonId": "x", "buttonText": { "displayText": "X" } })).unwrap();
        assert_eq!(b, Button::new("x", "X"));
    }
}
