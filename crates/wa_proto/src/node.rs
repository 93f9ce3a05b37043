//! Opaque binary-node record.
//!
//! Relay options may carry extra nodes to splice into the outgoing stanza.
//! Encoding them is the wire layer's job; here they are plain data.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BinaryNodeContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryNodeContent {
    Nodes(Vec<BinaryNode>),
    Bytes(#[serde(with = "crate::codec::base64_bytes")] Bytes),
    Text(String),
}

impl BinaryNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            content: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn children(mut self, nodes: Vec<BinaryNode>) -> Self {
        self.content = Some(BinaryNodeContent::Nodes(nodes));
        self
    }
}
