//! Message type discriminators.

use std::fmt;

/// Which way a message type travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Outbound,
    /// Server to client.
    Inbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outbound => f.write_str("outbound"),
            Self::Inbound => f.write_str("inbound"),
        }
    }
}

/// Closed set of envelope `type` tags.
///
/// # Invariants
///
/// - Each variant maps to exactly one wire string and one [`Direction`].
///   [`MessageType::parse`] is the inverse of [`MessageType::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Ask for a page of the user's chats.
    RequestChatList,
    /// Create a chat with a set of participants.
    CreateChat,
    /// Ask for a page of a chat's message history.
    RequestChatHistory,
    /// Post a message to a chat.
    SendMessage,
    /// A page of the user's chats.
    ReceiveChatList,
    /// A single chat (creation ack or push).
    ReceiveChat,
    /// A page of a chat's history, newest first.
    ReceiveChatHistory,
    /// A live message.
    ReceiveMessage,
}

impl MessageType {
    /// Every known message type.
    pub const ALL: [Self; 8] = [
        Self::RequestChatList,
        Self::CreateChat,
        Self::RequestChatHistory,
        Self::SendMessage,
        Self::ReceiveChatList,
        Self::ReceiveChat,
        Self::ReceiveChatHistory,
        Self::ReceiveMessage,
    ];

    /// Wire representation of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestChatList => "ClientRequestChatList",
            Self::CreateChat => "ClientCreateChat",
            Self::RequestChatHistory => "ClientRequestChatHistory",
            Self::SendMessage => "ClientSendMessage",
            Self::ReceiveChatList => "ClientReceiveChatList",
            Self::ReceiveChat => "ClientReceiveChat",
            Self::ReceiveChatHistory => "ClientReceiveChatHistory",
            Self::ReceiveMessage => "ClientReceiveMessage",
        }
    }

    /// Direction this type travels in.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::RequestChatList | Self::CreateChat | Self::RequestChatHistory | Self::SendMessage => {
                Direction::Outbound
            },
            Self::ReceiveChatList
            | Self::ReceiveChat
            | Self::ReceiveChatHistory
            | Self::ReceiveMessage => Direction::Inbound,
        }
    }

    /// Parse a wire tag. `None` for tags outside the known set.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inverts_as_str() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(MessageType::parse("clientreceivemessage"), None);
        assert_eq!(MessageType::parse(""), None);
    }

    #[test]
    fn four_types_each_way() {
        let outbound =
            MessageType::ALL.iter().filter(|k| k.direction() == Direction::Outbound).count();
        assert_eq!(outbound, 4);
        assert_eq!(MessageType::ALL.len() - outbound, 4);
    }
}
