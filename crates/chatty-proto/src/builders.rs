//! Outbound envelope constructors.
//!
//! One pure function per command. Each takes the caller's fields plus the
//! current identity's id and returns a complete envelope; none of them touch
//! the network.

use crate::{
    ChatId, Command, RawEnvelope, Result,
    payloads::command::{CreateChat, RequestChatHistory, RequestChatList, SendMessage},
};

/// `ClientRequestChatList` envelope.
pub fn request_chat_list(sender_id: &str, offset: u32, limit: u32) -> Result<RawEnvelope> {
    Command::RequestChatList(RequestChatList { offset, limit }).into_envelope(sender_id)
}

/// `ClientCreateChat` envelope.
pub fn create_chat(
    sender_id: &str,
    name: impl Into<String>,
    participant_emails: Vec<String>,
) -> Result<RawEnvelope> {
    Command::CreateChat(CreateChat { name: name.into(), participant_emails })
        .into_envelope(sender_id)
}

/// `ClientRequestChatHistory` envelope.
pub fn request_chat_history(
    sender_id: &str,
    chat_id: impl Into<ChatId>,
    offset: u32,
    limit: u32,
) -> Result<RawEnvelope> {
    Command::RequestChatHistory(RequestChatHistory { chat_id: chat_id.into(), offset, limit })
        .into_envelope(sender_id)
}

/// `ClientSendMessage` envelope. The author is the sender identity.
pub fn send_message(
    sender_id: &str,
    chat_id: impl Into<ChatId>,
    content: impl Into<String>,
) -> Result<RawEnvelope> {
    Command::SendMessage(SendMessage {
        chat_id: chat_id.into(),
        sender_id: sender_id.to_owned(),
        content: content.into(),
    })
    .into_envelope(sender_id)
}
