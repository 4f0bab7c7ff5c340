//! Application state machine.
//!
//! [`App`] consumes [`crate::AppEvent`]s and user intents and produces
//! [`crate::AppAction`]s. It performs no I/O, so every behavior here is
//! testable without a runtime.
//!
//! # Responsibilities
//!
//! - Owns the [`ChatStore`] and applies inbound events to it.
//! - Tracks the selected chat. Selection is UI state; the store only
//!   answers "messages for id X".
//! - Tracks connection state and a transient status line.

use chatty_proto::ChatId;

use crate::{AppAction, AppEvent, ChatInfo, ChatStore, ConnectionState, Message};

/// Application state machine.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state.
    state: ConnectionState,
    /// Chats and messages.
    store: ChatStore,
    /// Selected chat. May name a chat the store does not (yet) hold.
    selected: Option<ChatId>,
    /// Page size for list and history requests.
    page_size: u32,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an app requesting pages of `page_size`.
    pub fn new(page_size: u32) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            store: ChatStore::new(),
            selected: None,
            page_size,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Connecting => {
                self.state = ConnectionState::Connecting;
                vec![AppAction::Render]
            },
            AppEvent::Connected { user } => {
                self.status_message = Some(format!("Connected as {}", user.name));
                self.state = ConnectionState::Connected { user_id: user.id };
                vec![AppAction::RequestChatList { offset: 0, limit: self.page_size }, AppAction::Render]
            },
            AppEvent::Disconnected { reason } => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some(match reason {
                    Some(reason) => format!("Disconnected: {reason}"),
                    None => "Disconnected".to_string(),
                });
                vec![AppAction::Render]
            },
            AppEvent::ChatList(chats) => {
                self.store = self.store.apply_chat_list(chats);
                vec![AppAction::Render]
            },
            AppEvent::ChatReceived(chat) => {
                self.store = self.store.apply_new_chat(chat);
                vec![AppAction::Render]
            },
            AppEvent::HistoryReceived { chat_id, messages, has_more } => {
                self.store = self.store.apply_chat_history(&chat_id, messages, has_more);
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived { chat_id, message } => {
                self.store = self.store.apply_new_message(&chat_id, message);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Record the selected chat.
    ///
    /// Selecting a known chat whose history has never been requested also
    /// requests its first history page.
    pub fn select_chat(&mut self, chat_id: Option<ChatId>) -> Vec<AppAction> {
        self.selected = chat_id;

        let Some(chat_id) = self.selected.clone() else {
            return vec![AppAction::Render];
        };
        if !self.store.contains(&chat_id) {
            self.status_message = Some(format!("Unknown chat {chat_id}"));
            return vec![AppAction::Render];
        }
        if self.store.has_more_history(&chat_id).is_some() {
            return vec![AppAction::Render];
        }
        match self.history_action(&chat_id) {
            Some(action) => vec![action, AppAction::Render],
            None => vec![AppAction::Render],
        }
    }

    /// Request the next history page of the selected chat.
    pub fn request_history(&mut self) -> Vec<AppAction> {
        let Some(chat_id) = self.selected.clone() else {
            self.status_message = Some("No chat selected".to_string());
            return vec![AppAction::Render];
        };
        match self.history_action(&chat_id) {
            Some(action) => vec![action, AppAction::Render],
            None => {
                self.status_message = Some("No older messages".to_string());
                vec![AppAction::Render]
            },
        }
    }

    /// Create a chat with the given members.
    pub fn create_chat(
        &mut self,
        name: impl Into<String>,
        participant_emails: Vec<String>,
    ) -> Vec<AppAction> {
        let name = name.into();
        self.status_message = Some(format!("Creating chat {name}..."));
        vec![AppAction::CreateChat { name, participant_emails }, AppAction::Render]
    }

    /// Send a message to the selected chat.
    ///
    /// Nothing is added locally: the server echoes the message back to
    /// every member, the sender included.
    pub fn send_message(&mut self, content: impl Into<String>) -> Vec<AppAction> {
        let content = content.into();
        if content.trim().is_empty() {
            return vec![];
        }
        match self.selected.clone() {
            Some(chat_id) => vec![AppAction::SendMessage { chat_id, content }],
            None => {
                self.status_message = Some("No chat selected".to_string());
                vec![AppAction::Render]
            },
        }
    }

    /// Request the first chat-list page again.
    pub fn refresh_chats(&self) -> Vec<AppAction> {
        vec![AppAction::RequestChatList { offset: 0, limit: self.page_size }]
    }

    /// Ask the runtime to connect again.
    pub fn reconnect(&mut self) -> Vec<AppAction> {
        if matches!(self.state, ConnectionState::Disconnected) {
            vec![AppAction::Reconnect]
        } else {
            self.status_message = Some("Already connected".to_string());
            vec![AppAction::Render]
        }
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Forget everything, as after logout.
    pub fn reset(&mut self) -> Vec<AppAction> {
        self.store = self.store.reset();
        self.selected = None;
        self.state = ConnectionState::Disconnected;
        self.status_message = None;
        vec![AppAction::Render]
    }

    /// Messages of the selected chat, newest first. Empty when nothing is
    /// selected or the selection matches no chat.
    pub fn messages_for_selected(&self) -> &[Message] {
        self.selected.as_deref().map(|id| self.store.messages_for(id)).unwrap_or_default()
    }

    /// Selected chat's metadata.
    pub fn selected_chat(&self) -> Option<&ChatInfo> {
        self.selected.as_deref().and_then(|id| self.store.get(id))
    }

    /// Selected chat id, matched or not.
    pub fn selected_chat_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Chat store snapshot.
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    /// Page size for list and history requests.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn history_action(&self, chat_id: &str) -> Option<AppAction> {
        let offset = self.store.next_history_offset(chat_id)?;
        Some(AppAction::RequestHistory { chat_id: chat_id.to_string(), offset, limit: self.page_size })
    }
}

#[cfg(test)]
mod tests {
    use chatty_proto::UserInfo;

    use super::*;

    fn chat(id: &str) -> ChatInfo {
        ChatInfo { chat_id: id.into(), name: format!("chat {id}"), participants: Vec::new() }
    }

    fn listed_app(ids: &[&str]) -> App {
        let mut app = App::new(20);
        let _ = app.handle(AppEvent::ChatList(ids.iter().map(|id| chat(id)).collect()));
        app
    }

    #[test]
    fn connected_requests_first_chat_page() {
        let mut app = App::new(20);
        let user = UserInfo { id: "u1".into(), name: "Alice".into(), email: "a@x.io".into() };

        let actions = app.handle(AppEvent::Connected { user });

        assert_eq!(actions, vec![
            AppAction::RequestChatList { offset: 0, limit: 20 },
            AppAction::Render
        ]);
        assert_eq!(app.connection_state(), &ConnectionState::Connected { user_id: "u1".into() });
    }

    #[test]
    fn selecting_unloaded_chat_requests_history() {
        let mut app = listed_app(&["1"]);

        let actions = app.select_chat(Some("1".into()));

        assert_eq!(actions, vec![
            AppAction::RequestHistory { chat_id: "1".into(), offset: 0, limit: 20 },
            AppAction::Render
        ]);
    }

    #[test]
    fn selecting_loaded_chat_only_renders() {
        let mut app = listed_app(&["1"]);
        let _ = app.handle(AppEvent::HistoryReceived {
            chat_id: "1".into(),
            messages: Vec::new(),
            has_more: false,
        });

        assert_eq!(app.select_chat(Some("1".into())), vec![AppAction::Render]);
    }

    #[test]
    fn selection_of_unknown_chat_shows_nothing() {
        let mut app = listed_app(&["1"]);
        let _ = app.handle(AppEvent::MessageReceived {
            chat_id: "1".into(),
            message: Message::new("eve68", "Hey!"),
        });

        let _ = app.select_chat(Some("404".into()));
        assert!(app.messages_for_selected().is_empty());
        assert_eq!(app.selected_chat_id(), Some("404"));

        let _ = app.select_chat(None);
        assert!(app.messages_for_selected().is_empty());
    }

    #[test]
    fn send_requires_selection() {
        let mut app = listed_app(&["1"]);

        assert_eq!(app.send_message("hi"), vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("No chat selected"));

        let _ = app.select_chat(Some("1".into()));
        assert_eq!(app.send_message("hi"), vec![AppAction::SendMessage {
            chat_id: "1".into(),
            content: "hi".into()
        }]);
        assert!(app.send_message("   ").is_empty());
    }

    #[test]
    fn request_history_uses_next_offset() {
        let mut app = listed_app(&["1"]);
        let _ = app.select_chat(Some("1".into()));
        let _ = app.handle(AppEvent::HistoryReceived {
            chat_id: "1".into(),
            messages: vec![Message::new("a", "old")],
            has_more: true,
        });

        assert_eq!(app.request_history(), vec![
            AppAction::RequestHistory { chat_id: "1".into(), offset: 1, limit: 20 },
            AppAction::Render
        ]);

        let _ = app.handle(AppEvent::HistoryReceived {
            chat_id: "1".into(),
            messages: Vec::new(),
            has_more: false,
        });
        assert_eq!(app.request_history(), vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("No older messages"));
    }

    #[test]
    fn selected_chat_shows_live_message() {
        let mut app = listed_app(&["1", "2"]);
        let _ = app.select_chat(Some("1".into()));
        assert!(app.messages_for_selected().is_empty());

        let _ = app.handle(AppEvent::MessageReceived {
            chat_id: "1".into(),
            message: Message::new("eve68", "Hey!"),
        });

        assert_eq!(app.messages_for_selected(), [Message::new("eve68", "Hey!")]);
    }

    #[test]
    fn live_message_during_history_request_keeps_next_offset() {
        let with_id = |id: &str| Message { message_id: Some(id.into()), ..Message::new("eve68", id) };
        let mut app = listed_app(&["1"]);
        assert_eq!(app.select_chat(Some("1".into()))[0], AppAction::RequestHistory {
            chat_id: "1".into(),
            offset: 0,
            limit: 20
        });

        let _ = app.handle(AppEvent::MessageReceived { chat_id: "1".into(), message: with_id("m9") });
        let _ = app.handle(AppEvent::HistoryReceived {
            chat_id: "1".into(),
            messages: vec![with_id("m9"), with_id("m8")],
            has_more: true,
        });

        let ids: Vec<_> =
            app.messages_for_selected().iter().map(|m| m.message_id.as_deref()).collect();
        assert_eq!(ids, [Some("m9"), Some("m8")]);
        assert_eq!(app.request_history()[0], AppAction::RequestHistory {
            chat_id: "1".into(),
            offset: 2,
            limit: 20
        });
    }

    #[test]
    fn reset_clears_store_and_selection() {
        let mut app = listed_app(&["1"]);
        let _ = app.select_chat(Some("1".into()));

        let _ = app.reset();

        assert!(!app.store().is_initialized());
        assert_eq!(app.selected_chat_id(), None);
        assert_eq!(app.connection_state(), &ConnectionState::Disconnected);
    }

    #[test]
    fn reconnect_only_while_disconnected() {
        let mut app = App::new(20);
        assert_eq!(app.reconnect(), vec![AppAction::Reconnect]);

        let _ = app.handle(AppEvent::Connecting);
        assert_eq!(app.reconnect(), vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("Already connected"));
    }

    #[test]
    fn disconnect_reason_reaches_status() {
        let mut app = App::new(20);
        let _ = app.handle(AppEvent::Disconnected { reason: Some("timed out".into()) });
        assert_eq!(app.status_message(), Some("Disconnected: timed out"));
    }
}
