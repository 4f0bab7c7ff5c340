//! Observable application state types.
//!
//! These are the view model: chats and messages as the presentation layer
//! sees them, free of wire details like optional JSON fields or the
//! `chatID` spelling.

use chatty_proto::{
    ChatId, UserInfo,
    payloads::event::{ChatPayload, HistoryMessage, IncomingMessage},
};

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to server.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Connected and authenticated.
    Connected {
        /// Id of the logged-in user.
        user_id: String,
    },
}

/// A conversation's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    /// Stable chat id.
    pub chat_id: ChatId,
    /// Display name.
    pub name: String,
    /// Members.
    pub participants: Vec<UserInfo>,
}

impl From<ChatPayload> for ChatInfo {
    fn from(chat: ChatPayload) -> Self {
        Self { chat_id: chat.chat_id, name: chat.name, participants: chat.participant_infos }
    }
}

/// A message in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author's display name.
    pub sender_name: String,
    /// Message text.
    pub content: String,
    /// Server timestamp, when known.
    pub timestamp: Option<String>,
    /// Server-assigned id, when known.
    pub message_id: Option<String>,
}

impl Message {
    /// Message with no server metadata.
    pub fn new(sender_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            content: content.into(),
            timestamp: None,
            message_id: None,
        }
    }

    /// Split a live message into its chat id and the message itself.
    pub fn from_incoming(message: IncomingMessage) -> (ChatId, Self) {
        let IncomingMessage { chat_id, sender_name, content, timestamp, message_id } = message;
        (chat_id, Self { sender_name, content, timestamp, message_id })
    }
}

impl From<HistoryMessage> for Message {
    fn from(message: HistoryMessage) -> Self {
        Self {
            sender_name: message.sender_name,
            content: message.content,
            timestamp: Some(message.timestamp),
            message_id: Some(message.message_id),
        }
    }
}
