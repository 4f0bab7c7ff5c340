//! Plain-text rendering
//!
//! Converts App state into the block of lines the CLI prints. Pure: no I/O,
//! so the output is snapshot tested.

use chatty_app::{App, ConnectionState};

/// Newest messages shown for the selected chat.
pub const MESSAGES_SHOWN: usize = 10;

/// Render the whole view: chat list, selected chat, status line.
pub fn render(app: &App) -> String {
    let mut lines = Vec::new();
    chats(app, &mut lines);
    selected(app, &mut lines);
    lines.push(String::new());
    lines.push(status(app));
    lines.join("\n")
}

fn chats(app: &App, lines: &mut Vec<String>) {
    let store = app.store();
    if !store.is_initialized() {
        lines.push("(loading chats)".to_string());
        return;
    }
    if store.is_empty() {
        lines.push("(no chats)".to_string());
        return;
    }
    let selected = app.selected_chat_id();
    for chat in store.chat_summaries() {
        let marker = if selected == Some(chat.chat_id.as_str()) { '>' } else { '-' };
        lines.push(format!("{marker} {}: {}", chat.chat_id, chat.name));
    }
}

fn selected(app: &App, lines: &mut Vec<String>) {
    let Some(chat) = app.selected_chat() else {
        return;
    };

    lines.push(String::new());
    lines.push(format!("# {}", chat.name));

    // Stored newest first; shown oldest first
    let messages = app.messages_for_selected();
    let shown = &messages[..messages.len().min(MESSAGES_SHOWN)];
    if shown.len() < messages.len() || app.store().has_more_history(&chat.chat_id) == Some(true) {
        lines.push("(older messages: /more)".to_string());
    }
    for message in shown.iter().rev() {
        lines.push(format!("{}: {}", message.sender_name, message.content));
    }
}

fn status(app: &App) -> String {
    let state = match app.connection_state() {
        ConnectionState::Disconnected => "offline",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Connected { .. } => "online",
    };
    match app.status_message() {
        Some(message) => format!("[{state}] {message}"),
        None => format!("[{state}]"),
    }
}
