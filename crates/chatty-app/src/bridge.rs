//! Protocol-to-application translation layer.
//!
//! # Responsibilities
//!
//! - Converts protocol [`crate::AppAction`]s into command envelopes stamped
//!   with the current identity.
//! - Accumulates outgoing envelopes for the runtime to send in its next
//!   cycle.
//! - Narrows inbound envelopes into [`crate::AppEvent`]s. Unknown types are
//!   ignored; misdirected or malformed envelopes are logged and dropped.

use chatty_proto::{Event, ProtocolError, RawEnvelope, builders};

use crate::{AppAction, AppEvent, ChatInfo, Message};

/// Bridge between [`crate::App`] and the wire protocol.
#[derive(Debug, Default)]
pub struct Bridge {
    sender_id: String,
    outgoing: Vec<RawEnvelope>,
}

impl Bridge {
    /// Create a bridge with no identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent envelopes with `sender_id`.
    pub fn set_identity(&mut self, sender_id: impl Into<String>) {
        self.sender_id = sender_id.into();
    }

    /// Forget the identity and any unsent envelopes.
    pub fn clear_identity(&mut self) {
        self.sender_id.clear();
        self.outgoing.clear();
    }

    /// Identity envelopes are stamped with. Empty when logged out.
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let sender = self.sender_id.as_str();
        let built = match action {
            AppAction::RequestChatList { offset, limit } => {
                builders::request_chat_list(sender, offset, limit)
            },
            AppAction::CreateChat { name, participant_emails } => {
                builders::create_chat(sender, name, participant_emails)
            },
            AppAction::RequestHistory { chat_id, offset, limit } => {
                builders::request_chat_history(sender, chat_id, offset, limit)
            },
            AppAction::SendMessage { chat_id, content } => {
                builders::send_message(sender, chat_id, content)
            },
            AppAction::Render | AppAction::Quit | AppAction::Reconnect => return vec![],
        };

        match built {
            Ok(envelope) => {
                self.outgoing.push(envelope);
                vec![]
            },
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    /// Narrow an inbound envelope.
    pub fn handle_envelope(&self, envelope: &RawEnvelope) -> Option<AppEvent> {
        if let Some(error) = envelope.server_error() {
            tracing::warn!(error, "server rejected a request");
            return Some(AppEvent::Error { message: error.to_string() });
        }

        match Event::from_envelope(envelope) {
            Ok(Event::ChatList(list)) => {
                Some(AppEvent::ChatList(list.chats.into_iter().map(ChatInfo::from).collect()))
            },
            Ok(Event::Chat(chat)) => Some(AppEvent::ChatReceived(chat.into())),
            Ok(Event::ChatHistory(history)) => Some(AppEvent::HistoryReceived {
                chat_id: history.chat_id,
                messages: history.messages.into_iter().map(Message::from).collect(),
                has_more: history.has_more,
            }),
            Ok(Event::Message(incoming)) => {
                let (chat_id, message) = Message::from_incoming(incoming);
                Some(AppEvent::MessageReceived { chat_id, message })
            },
            Err(ProtocolError::UnknownType(kind)) => {
                tracing::debug!(%kind, "ignoring unknown message type");
                None
            },
            Err(e) => {
                tracing::warn!(error = %e, "dropping inbound envelope");
                None
            },
        }
    }

    /// Take pending outgoing envelopes.
    pub fn take_outgoing(&mut self) -> Vec<RawEnvelope> {
        std::mem::take(&mut self.outgoing)
    }
}
