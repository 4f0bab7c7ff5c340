//! Application side-effects and intents.
//!
//! [`AppAction`]s are produced by [`crate::App`] for the runtime to execute.
//! Protocol actions become envelopes in [`crate::Bridge`].

use chatty_proto::ChatId;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Open a new connection with the current credential.
    Reconnect,

    /// Request a page of the chat list.
    RequestChatList {
        /// Chats to skip.
        offset: u32,
        /// Page size.
        limit: u32,
    },

    /// Create a chat.
    CreateChat {
        /// Display name.
        name: String,
        /// Emails of the other members.
        participant_emails: Vec<String>,
    },

    /// Request a page of a chat's history.
    RequestHistory {
        /// Chat to page through.
        chat_id: ChatId,
        /// Messages to skip, newest first.
        offset: u32,
        /// Page size.
        limit: u32,
    },

    /// Send a message.
    SendMessage {
        /// Target chat.
        chat_id: ChatId,
        /// Message text.
        content: String,
    },
}

impl AppAction {
    /// Whether this action must go to the server.
    pub fn is_protocol(&self) -> bool {
        match self {
            Self::Render | Self::Quit | Self::Reconnect => false,
            Self::RequestChatList { .. }
            | Self::CreateChat { .. }
            | Self::RequestHistory { .. }
            | Self::SendMessage { .. } => true,
        }
    }
}
