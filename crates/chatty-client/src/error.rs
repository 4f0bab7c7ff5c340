//! Client error types.

use std::time::Duration;

use thiserror::Error;

/// Failures while opening or running a transport link.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Peer refused the connection or the handshake was rejected.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Link could not carry a frame.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Reasons [`crate::ConnectionManager::try_connect`] did not open a link.
///
/// The boolean API folds all of these into `false`; they are kept distinct
/// here for logging and tests.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No access credential was supplied.
    #[error("no access credential")]
    MissingCredential,

    /// A live link already exists.
    #[error("already connected")]
    AlreadyConnected,

    /// Configured endpoint is not a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Handshake did not finish in time.
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    /// Handshake failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures talking to the auth API.
///
/// Validation failures are not errors: they come back as
/// [`crate::LoginOutcome::Rejected`] and [`crate::SignupOutcome::Invalid`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Configured API URL is not a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Request could not be sent or its body not read.
    #[error("http error: {0}")]
    Http(String),

    /// Server answered with a status the contract does not cover.
    #[error("unexpected response ({status}): {message}")]
    UnexpectedResponse {
        /// HTTP status code.
        status: u16,
        /// Server's `message` field, if any.
        message: String,
    },

    /// Response body is not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
