//! Typed payloads.
//!
//! [`Command`] and [`Event`] are the two closed sums of payloads, one per
//! [`Direction`]. Both encode into and narrow from a [`RawEnvelope`].
//!
//! # Invariants
//!
//! - Each variant maps to exactly one [`MessageType`] (enforced by match
//!   exhaustiveness in `message_type`).
//! - Narrowing checks the tag, then the direction, then the payload shape,
//!   and reports the first failure as a distinct [`ProtocolError`].

pub mod command;
pub mod event;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Direction, MessageType, ProtocolError, RawEnvelope, Result};

/// Chat identifier as issued by the server.
pub type ChatId = String;

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserInfo {
    /// Stable user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// Client-to-server payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ClientRequestChatList`
    RequestChatList(command::RequestChatList),
    /// `ClientCreateChat`
    CreateChat(command::CreateChat),
    /// `ClientRequestChatHistory`
    RequestChatHistory(command::RequestChatHistory),
    /// `ClientSendMessage`
    SendMessage(command::SendMessage),
}

impl Command {
    /// Message type of this payload.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::RequestChatList(_) => MessageType::RequestChatList,
            Self::CreateChat(_) => MessageType::CreateChat,
            Self::RequestChatHistory(_) => MessageType::RequestChatHistory,
            Self::SendMessage(_) => MessageType::SendMessage,
        }
    }

    /// Wrap in an envelope stamped with `sender_id`.
    pub fn into_envelope(self, sender_id: impl Into<String>) -> Result<RawEnvelope> {
        let kind = self.message_type();
        let data = match &self {
            Self::RequestChatList(inner) => encode_data(kind, inner),
            Self::CreateChat(inner) => encode_data(kind, inner),
            Self::RequestChatHistory(inner) => encode_data(kind, inner),
            Self::SendMessage(inner) => encode_data(kind, inner),
        }?;
        Ok(RawEnvelope::new(kind, data, sender_id))
    }

    /// Narrow an envelope to a command.
    pub fn from_envelope(envelope: &RawEnvelope) -> Result<Self> {
        let kind = resolve(envelope, Direction::Outbound)?;
        let data = &envelope.data;
        match kind {
            MessageType::RequestChatList => decode_data(kind, data).map(Self::RequestChatList),
            MessageType::CreateChat => decode_data(kind, data).map(Self::CreateChat),
            MessageType::RequestChatHistory => {
                decode_data(kind, data).map(Self::RequestChatHistory)
            },
            MessageType::SendMessage => decode_data(kind, data).map(Self::SendMessage),
            MessageType::ReceiveChatList
            | MessageType::ReceiveChat
            | MessageType::ReceiveChatHistory
            | MessageType::ReceiveMessage => {
                Err(ProtocolError::UnexpectedDirection { kind, expected: Direction::Outbound })
            },
        }
    }
}

/// Server-to-client payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `ClientReceiveChatList`
    ChatList(event::ChatList),
    /// `ClientReceiveChat`
    Chat(event::ChatPayload),
    /// `ClientReceiveChatHistory`
    ChatHistory(event::ChatHistory),
    /// `ClientReceiveMessage`
    Message(event::IncomingMessage),
}

impl Event {
    /// Message type of this payload.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::ChatList(_) => MessageType::ReceiveChatList,
            Self::Chat(_) => MessageType::ReceiveChat,
            Self::ChatHistory(_) => MessageType::ReceiveChatHistory,
            Self::Message(_) => MessageType::ReceiveMessage,
        }
    }

    /// Wrap in an envelope. Server pushes carry an empty `senderId`.
    pub fn into_envelope(self) -> Result<RawEnvelope> {
        let kind = self.message_type();
        let data = match &self {
            Self::ChatList(inner) => encode_data(kind, inner),
            Self::Chat(inner) => encode_data(kind, inner),
            Self::ChatHistory(inner) => encode_data(kind, inner),
            Self::Message(inner) => encode_data(kind, inner),
        }?;
        Ok(RawEnvelope::new(kind, data, String::new()))
    }

    /// Narrow an envelope to an event.
    pub fn from_envelope(envelope: &RawEnvelope) -> Result<Self> {
        let kind = resolve(envelope, Direction::Inbound)?;
        let data = &envelope.data;
        match kind {
            MessageType::ReceiveChatList => decode_data(kind, data).map(Self::ChatList),
            MessageType::ReceiveChat => decode_data(kind, data).map(Self::Chat),
            MessageType::ReceiveChatHistory => decode_data(kind, data).map(Self::ChatHistory),
            MessageType::ReceiveMessage => decode_data(kind, data).map(Self::Message),
            MessageType::RequestChatList
            | MessageType::CreateChat
            | MessageType::RequestChatHistory
            | MessageType::SendMessage => {
                Err(ProtocolError::UnexpectedDirection { kind, expected: Direction::Inbound })
            },
        }
    }
}

fn resolve(envelope: &RawEnvelope, expected: Direction) -> Result<MessageType> {
    let kind = envelope
        .message_type()
        .ok_or_else(|| ProtocolError::UnknownType(envelope.kind.clone()))?;
    if kind.direction() != expected {
        return Err(ProtocolError::UnexpectedDirection { kind, expected });
    }
    Ok(kind)
}

fn encode_data<T: Serialize>(kind: MessageType, inner: &T) -> Result<Value> {
    serde_json::to_value(inner).map_err(|source| ProtocolError::Encode { kind, source })
}

fn decode_data<T: DeserializeOwned>(kind: MessageType, data: &Value) -> Result<T> {
    T::deserialize(data).map_err(|source| ProtocolError::MalformedPayload { kind, source })
}

fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
