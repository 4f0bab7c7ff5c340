//! Server-to-client payloads.
//!
//! The server is written against nil-able slices, so list fields may arrive
//! as `null`. Those decode as empty lists.

use serde::{Deserialize, Serialize};

use super::nullable_vec;
use crate::{ChatId, UserInfo};

/// A chat as announced by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    /// Stable chat id.
    #[serde(alias = "chatID")]
    pub chat_id: ChatId,
    /// Display name.
    pub name: String,
    /// Chat members.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub participant_infos: Vec<UserInfo>,
}

/// A page of the user's chats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatList {
    /// Chats, most recently updated first.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub chats: Vec<ChatPayload>,
}

/// One message inside a history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    /// Server-assigned message id.
    pub message_id: String,
    /// Author's display name.
    pub sender_name: String,
    /// Message text.
    pub content: String,
    /// Server timestamp, RFC 3339.
    pub timestamp: String,
}

/// A page of a chat's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    /// Chat the page belongs to.
    #[serde(alias = "chatID")]
    pub chat_id: ChatId,
    /// Messages, newest first.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub messages: Vec<HistoryMessage>,
    /// Whether older messages remain on the server.
    #[serde(default)]
    pub has_more: bool,
}

/// A live message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    /// Chat the message was posted to.
    #[serde(alias = "chatID")]
    pub chat_id: ChatId,
    /// Author's display name.
    pub sender_name: String,
    /// Message text.
    pub content: String,
    /// Server timestamp, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Server-assigned message id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}
