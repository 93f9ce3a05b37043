//! Plain-record content variants: contacts, location, reactions, replies,
//! invites, pins, products and phone-number sharing.

use bytes::Bytes;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ContentError;
use crate::identity::MessageKey;
use crate::media::MediaUpload;

// ── Contacts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub vcard: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactsContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub contacts: Vec<ContactMessage>,
}

impl ContactsContent {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.contacts.is_empty() {
            return Err(ContentError::constraint("contacts", "at least one contact is required"));
        }
        if self.contacts.iter().any(|c| c.vcard.trim().is_empty()) {
            return Err(ContentError::constraint("contacts", "vcard must not be empty"));
        }
        Ok(())
    }
}

// ── Location ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocationMessage {
    pub degrees_latitude: f64,
    pub degrees_longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_live: bool,
    #[serde(
        default,
        with = "crate::codec::base64_bytes_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub jpeg_thumbnail: Option<Bytes>,
}

impl LocationMessage {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            degrees_latitude: latitude,
            degrees_longitude: longitude,
            name: None,
            address: None,
            url: None,
            comment: None,
            is_live: false,
            jpeg_thumbnail: None,
        }
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if !(-90.0..=90.0).contains(&self.degrees_latitude) {
            return Err(ContentError::constraint(
                "degreesLatitude",
                format!("{} is outside [-90, 90]", self.degrees_latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&self.degrees_longitude) {
            return Err(ContentError::constraint(
                "degreesLongitude",
                format!("{} is outside [-180, 180]", self.degrees_longitude),
            ));
        }
        Ok(())
    }
}

// ── Reaction ─────────────────────────────────────────────────────────────────

/// Reaction to the message at `key`. An empty `text` removes our reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReactionMessage {
    pub key: MessageKey,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_timestamp_ms: Option<i64>,
}

impl ReactionMessage {
    pub fn is_removal(&self) -> bool {
        self.text.is_empty()
    }
}

// ── Button / list replies ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonReplyInfo {
    pub display_text: String,
    pub id: String,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonReplyType {
    Template,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ButtonReplyContent {
    pub reply: ButtonReplyInfo,
    #[serde(rename = "type")]
    pub kind: ButtonReplyType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListType {
    #[default]
    Unknown,
    SingleSelect,
    ProductList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSelectReply {
    pub selected_row_id: String,
}

/// Reply to a list message. Carries no context of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListResponseMessage {
    pub title: String,
    #[serde(default)]
    pub list_type: ListType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_select_reply: Option<SingleSelectReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListResponseMessage {
    pub fn single_select(title: impl Into<String>, row_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            list_type: ListType::SingleSelect,
            single_select_reply: Some(SingleSelectReply { selected_row_id: row_id.into() }),
            description: None,
        }
    }
}

// ── Group invite ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupInviteInfo {
    pub invite_code: String,
    /// Unix seconds.
    pub invite_expiration: i64,
    pub text: String,
    pub jid: String,
    pub subject: String,
}

impl GroupInviteInfo {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.invite_code.trim().is_empty() {
            return Err(ContentError::constraint("inviteCode", "must not be empty"));
        }
        if !self.jid.ends_with("@g.us") {
            return Err(ContentError::constraint("jid", format!("{} is not a group jid", self.jid)));
        }
        Ok(())
    }
}

// ── Pin ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PinType {
    PinForAll,
    UnpinForAll,
}

/// How long a pin stays. Only the three canonical durations exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinDuration {
    /// 86400 s.
    Day,
    /// 604800 s.
    Week,
    /// 2592000 s.
    Month,
}

impl PinDuration {
    pub fn as_secs(self) -> u32 {
        match self {
            PinDuration::Day => 86_400,
            PinDuration::Week => 604_800,
            PinDuration::Month => 2_592_000,
        }
    }
}

impl TryFrom<u32> for PinDuration {
    type Error = ContentError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        match secs {
            86_400 => Ok(PinDuration::Day),
            604_800 => Ok(PinDuration::Week),
            2_592_000 => Ok(PinDuration::Month),
            other => Err(ContentError::constraint(
                "time",
                format!("{other}s is not one of 86400, 604800, 2592000"),
            )),
        }
    }
}

impl Serialize for PinDuration {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(self.as_secs())
    }
}

impl<'de> Deserialize<'de> for PinDuration {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let secs = u32::deserialize(d)?;
        PinDuration::try_from(secs).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PinContent {
    pub key: MessageKey,
    #[serde(rename = "type")]
    pub kind: PinType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<PinDuration>,
}

// ── Product ──────────────────────────────────────────────────────────────────

/// Catalog product snapshot with its image still to be uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendableProduct {
    pub product_image: MediaUpload,
    pub product_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// Price × 1000 in the currency's minor-less unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_amount_1000: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price_amount_1000: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retailer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub product_image_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_image_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductContent {
    pub product: SendableProduct,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_owner_jid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl ProductContent {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.product.product_id.trim().is_empty() {
            return Err(ContentError::constraint("productId", "must not be empty"));
        }
        if self.product.currency_code.is_some() != self.product.price_amount_1000.is_some() {
            return Err(ContentError::constraint(
                "priceAmount1000",
                "currency code and price must be given together",
            ));
        }
        Ok(())
    }
}

// ── Phone-number share / request ─────────────────────────────────────────────

/// Payload of the flag-only tags; always serialises as `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Enabled;

impl Serialize for Enabled {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for Enabled {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        if bool::deserialize(d)? {
            Ok(Enabled)
        } else {
            Err(de::Error::custom("flag tags must be `true`"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_durations() {
        assert!(PinDuration::try_from(3600).is_err());
        assert_eq!(PinDuration::try_from(604_800).unwrap(), PinDuration::Week);
        assert_eq!(PinDuration::Month.as_secs(), 2_592_000);

        let d: PinDuration = serde_json::from_value(86_400.into()).unwrap();
        assert_eq!(d, PinDuration::Day);
        assert!(serde_json::from_value::<PinDuration>(3600.into()).is_err());
    }

    #[test]
    fn location_bounds() {
        assert!(LocationMessage::new(52.37, 4.89).validate().is_ok());
        assert!(LocationMessage::new(91.0, 0.0).validate().is_err());
        assert!(LocationMessage::new(0.0, -180.5).validate().is_err());
        assert!(LocationMessage::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn enabled_flag_only_accepts_true() {
        assert_eq!(serde_json::to_value(Enabled).unwrap(), serde_json::json!(true));
        assert!(serde_json::from_value::<Enabled>(serde_json::json!(false)).is_err());
    }

    #[test]
    fn product_price_needs_currency() {
        let mut product = ProductContent {
            product: SendableProduct {
                product_image: MediaUpload::url("https://example.com/p.jpg").unwrap(),
                product_id: "p-1".into(),
                title: "Mug".into(),
                description: None,
                currency_code: None,
                price_amount_1000: Some(12_500),
                sale_price_amount_1000: None,
                retailer_id: None,
                url: None,
                product_image_count: 1,
                first_image_id: None,
            },
            business_owner_jid: None,
            body: None,
            footer: None,
        };
        assert!(product.validate().is_err());
        product.product.currency_code = Some("EUR".into());
        assert!(product.validate().is_ok());
    }

    #[test]
    fn group_invite_requires_group_jid() {
        let mut invite = GroupInviteInfo {
            invite_code: "AbCd".into(),
            invite_expiration: 1_700_000_000,
            text: "join us".into(),
            jid: "123@s.whatsapp.net".into(),
            subject: "Team".into(),
        };
        assert!(invite.validate().is_err());
        invite.jid = "1203630@g.us".into();
        assert!(invite.validate().is_ok());
    }
}
