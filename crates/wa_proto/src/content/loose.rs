//! Checks run on a loose JSON value before serde sees it.
//!
//! Serde alone would either drop a capability field the tag does not carry
//! (structs with flattened parts cannot deny unknown fields) or report a
//! field constraint as a plain deserialisation error. Both are caught here
//! so callers get the right error class.

use serde_json::{Map, Value};

use crate::capability::Capability;
use crate::error::ContentError;
use crate::media::check_loose_source;

use super::records::PinDuration;
use super::{capabilities_of, REGULAR_TAGS};

/// Field name → capability it belongs to.
const CAPABILITY_FIELDS: &[(&str, Capability)] = &[
    ("mentions", Capability::Mentions),
    ("contextInfo", Capability::Context),
    ("edit", Capability::Edit),
    ("width", Capability::Dimensions),
    ("height", Capability::Dimensions),
    ("viewOnce", Capability::ViewOnce),
];

const IMAGE_FIELDS: &[&str] = &[
    "image", "caption", "jpegThumbnail", "mimetype", "mentions", "contextInfo", "width", "height",
    "edit", "viewOnce",
];

const VIDEO_FIELDS: &[&str] = &[
    "video", "caption", "gifPlayback", "jpegThumbnail", "ptv", "mimetype", "mentions",
    "contextInfo", "width", "height", "edit", "viewOnce",
];

const STICKER_FIELDS: &[&str] = &["sticker", "isAnimated", "mimetype", "width", "height", "edit"];

const POLL_FIELDS: &[&str] = &[
    "name", "selectableCount", "values", "messageSecret", "toAnnouncementGroup", "mentions",
    "contextInfo", "edit",
];

/// The `'static` spelling of a known regular tag.
pub(super) fn static_tag(tag: &str) -> Option<&'static str> {
    REGULAR_TAGS.iter().copied().find(|t| *t == tag)
}

/// Validates the body of a regular tag. `body` is the value under the tag key.
pub(super) fn check(tag: &'static str, body: &Value) -> Result<(), ContentError> {
    let Some(fields) = body.as_object() else {
        return Ok(());
    };
    check_capabilities(tag, fields)?;
    check_flattened_fields(tag, fields)?;

    match tag {
        "image" | "video" | "audio" | "sticker" | "document" => {
            if let Some(source) = fields.get(tag) {
                check_loose_source(source)?;
            }
        }
        "product" => {
            if let Some(source) = fields.get("product").and_then(|p| p.get("productImage")) {
                check_loose_source(source)?;
            }
        }
        "pin" => {
            if let Some(secs) = fields.get("time").and_then(Value::as_u64) {
                let secs = u32::try_from(secs)
                    .map_err(|_| ContentError::constraint("time", format!("{secs}s is out of range")))?;
                PinDuration::try_from(secs)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_capabilities(tag: &'static str, fields: &Map<String, Value>) -> Result<(), ContentError> {
    let supported = capabilities_of(tag);
    for (name, capability) in CAPABILITY_FIELDS {
        if fields.contains_key(*name) && !supported.contains(capability) {
            return Err(ContentError::unsupported(tag, *capability));
        }
    }
    Ok(())
}

fn check_flattened_fields(tag: &'static str, fields: &Map<String, Value>) -> Result<(), ContentError> {
    let allowed = match tag {
        "image" => IMAGE_FIELDS,
        "video" => VIDEO_FIELDS,
        "sticker" => STICKER_FIELDS,
        "poll" => POLL_FIELDS,
        _ => return Ok(()),
    };
    match fields.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(unknown) => Err(ContentError::unknown_field(tag, unknown)),
        None => Ok(()),
    }
}
