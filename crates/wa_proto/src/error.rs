use thiserror::Error;

use crate::capability::Capability;

/// Construction-time failures of the content model.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A loose value carried zero, or more than one, discriminant tag.
    #[error("Shape violation: expected exactly one content tag, found {found:?}")]
    Shape { found: Vec<String> },

    #[error("Unknown content tag: {0}")]
    UnknownTag(String),

    #[error("Content tag `{tag}` has no field `{field}`")]
    UnknownField { tag: &'static str, field: String },

    #[error("Content tag `{tag}` does not support {capability}")]
    UnsupportedCapability {
        tag: &'static str,
        capability: Capability,
    },

    #[error("Invalid `{field}`: {reason}")]
    FieldConstraint { field: &'static str, reason: String },

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Key derivation error: {0}")]
    Crypto(#[from] wa_crypto::CryptoError),
}

impl ContentError {
    pub(crate) fn constraint(field: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(field, %reason, "content rejected");
        ContentError::FieldConstraint { field, reason }
    }

    pub(crate) fn unsupported(tag: &'static str, capability: Capability) -> Self {
        tracing::debug!(tag, %capability, "capability not supported by tag");
        ContentError::UnsupportedCapability { tag, capability }
    }

    pub(crate) fn unknown_field(tag: &'static str, field: &str) -> Self {
        tracing::debug!(tag, field, "unknown field for tag");
        ContentError::UnknownField { tag, field: field.to_string() }
    }

    /// True for the ShapeViolation class (wrong tag count or trait/tag mismatch).
    pub fn is_shape_violation(&self) -> bool {
        matches!(
            self,
            ContentError::Shape { .. }
                | ContentError::UnknownTag(_)
                | ContentError::UnknownField { .. }
                | ContentError::UnsupportedCapability { .. }
        )
    }

    /// True for the FieldConstraintViolation class.
    pub fn is_field_constraint(&self) -> bool {
        matches!(self, ContentError::FieldConstraint { .. })
    }
}

/// Failure reported by an injected collaborator (uploader, resolvers).
///
/// Propagated to the caller as-is; nothing in this crate retries or
/// substitutes a default.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Collaborator rejected the request: {0}")]
    Rejected(String),

    #[error("Collaborator timed out after {timeout_ms} ms")]
    TimedOut { timeout_ms: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
