//! Client-to-server payloads.

use serde::{Deserialize, Serialize};

use crate::ChatId;

/// Ask for a page of the user's chats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestChatList {
    /// Number of chats to skip.
    pub offset: u32,
    /// Maximum number of chats to return.
    pub limit: u32,
}

/// Create a chat.
///
/// The server answers with a `ClientReceiveChat` to every participant,
/// including the creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChat {
    /// Display name.
    pub name: String,
    /// Emails of the users to invite.
    pub participant_emails: Vec<String>,
}

/// Ask for a page of a chat's history.
///
/// Pages are newest first: `offset` counts messages back from the most
/// recent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestChatHistory {
    /// Target chat.
    #[serde(alias = "chatID")]
    pub chat_id: ChatId,
    /// Number of messages to skip.
    pub offset: u32,
    /// Maximum number of messages to return.
    pub limit: u32,
}

/// Post a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    /// Target chat.
    #[serde(alias = "chatID")]
    pub chat_id: ChatId,
    /// Author's user id.
    pub sender_id: String,
    /// Message text.
    pub content: String,
}
