//! Protocol errors.

use thiserror::Error;

use crate::{Direction, MessageType};

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or narrowing envelopes.
///
/// None of these are fatal to a connection. Receivers log the error and drop
/// the offending frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame text is not a JSON envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// Envelope `type` is outside the known set.
    #[error("unknown message type: {0:?}")]
    UnknownType(String),

    /// Known type, but it travels the other way.
    #[error("{kind} is not an {expected} message")]
    UnexpectedDirection {
        /// Tag found on the envelope.
        kind: MessageType,
        /// Direction the caller was decoding.
        expected: Direction,
    },

    /// `data` does not match the payload shape for its type.
    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        /// Tag found on the envelope.
        kind: MessageType,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Payload or envelope could not be serialized.
    #[error("failed to encode {kind}: {source}")]
    Encode {
        /// Tag being encoded.
        kind: MessageType,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}
