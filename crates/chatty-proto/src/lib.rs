//! Chatty wire protocol
//!
//! Every message crossing the WebSocket is a JSON [`RawEnvelope`] of the
//! shape `{type, data, senderId}`. The `type` string selects one of a closed
//! set of [`MessageType`]s, each flowing in exactly one [`Direction`].
//!
//! Consumers narrow a raw envelope to a typed [`Event`] (server to client)
//! or [`Command`] (client to server) by matching on that tag. An unknown tag
//! is not fatal: decoding returns [`ProtocolError::UnknownType`] and the
//! caller logs and drops the frame, which keeps older clients working when
//! the server grows new message types.
//!
//! # Components
//!
//! - [`RawEnvelope`]: untyped envelope, the unit of transport
//! - [`Command`] / [`Event`]: typed payloads per direction
//! - [`builders`]: pure constructors for outbound command envelopes

#![forbid(unsafe_code)]

pub mod builders;
pub mod envelope;
pub mod errors;
mod message_type;
pub mod payloads;

pub use envelope::RawEnvelope;
pub use errors::{ProtocolError, Result};
pub use message_type::{Direction, MessageType};
pub use payloads::{ChatId, Command, Event, UserInfo};
