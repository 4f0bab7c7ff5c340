//! Untyped envelope.
//!
//! [`RawEnvelope`] is what the connection layer hands to subscribers: the
//! `type` tag is still a string and `data` is still a JSON value. Narrowing
//! to a typed payload happens in [`crate::Event::from_envelope`] and
//! [`crate::Command::from_envelope`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{MessageType, ProtocolError, Result};

/// Outer `{type, data, senderId}` wrapper for every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnvelope {
    /// Message type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload, shape depends on `kind`.
    #[serde(default)]
    pub data: Value,
    /// Identity that produced the envelope. Empty on server pushes.
    #[serde(default)]
    pub sender_id: String,
    /// Failure reported by the server for a rejected request. Such replies
    /// carry an empty `type` and no `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RawEnvelope {
    /// Build an envelope for a known type.
    pub fn new(kind: MessageType, data: Value, sender_id: impl Into<String>) -> Self {
        Self { kind: kind.as_str().to_owned(), data, sender_id: sender_id.into(), error: None }
    }

    /// Parse envelope JSON text.
    ///
    /// Only the envelope shape is checked here; `data` is left untyped.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::InvalidEnvelope)
    }

    /// Serialize to JSON text.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::InvalidEnvelope)
    }

    /// Server-side failure carried by this envelope, if any.
    pub fn server_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Known message type of this envelope. `None` for unknown tags.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::parse(&self.kind)
    }
}
