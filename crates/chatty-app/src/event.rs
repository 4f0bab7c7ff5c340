//! Application input events.
//!
//! [`AppEvent`] is everything that drives [`crate::App`] from outside the
//! user's own intents: connection lifecycle changes reported by the runtime
//! and protocol events narrowed by [`crate::Bridge`].

use chatty_proto::{ChatId, UserInfo};

use crate::{ChatInfo, Message};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Handshake started.
    Connecting,

    /// Connection open for `user`.
    Connected {
        /// Logged-in user.
        user: UserInfo,
    },

    /// Connection closed or could not be opened.
    Disconnected {
        /// Why, if known.
        reason: Option<String>,
    },

    /// Full chat list.
    ChatList(Vec<ChatInfo>),

    /// A chat was created or changed.
    ChatReceived(ChatInfo),

    /// A page of older messages.
    HistoryReceived {
        /// Chat the page belongs to.
        chat_id: ChatId,
        /// Messages, newest first.
        messages: Vec<Message>,
        /// Whether older messages remain.
        has_more: bool,
    },

    /// A live message.
    MessageReceived {
        /// Chat the message was posted to.
        chat_id: ChatId,
        /// The message.
        message: Message,
    },

    /// Error to show the user.
    Error {
        /// Error description.
        message: String,
    },
}
