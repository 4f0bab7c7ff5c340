//! Chat store.
//!
//! The normalized collection of chats and their messages, driven by inbound
//! events. Every mutation takes `&self` and returns the next snapshot;
//! entries are shared through [`Arc`], so a snapshot costs one pointer per
//! chat and untouched chats are never copied.
//!
//! # Invariants
//!
//! - The store is uninitialized until the first chat list arrives. Until
//!   then every mutation except [`ChatStore::apply_chat_list`] is a no-op.
//! - A message belongs to an existing chat. Messages for unknown chats are
//!   dropped, not queued.
//! - Messages are newest first, in arrival order. Nothing is re-sorted by
//!   timestamp and live messages are never deduplicated.
//! - A history page overlaps live messages that arrived while it was in
//!   flight. Page entries whose server id is already held are skipped, so
//!   the message count stays the server-side offset of the next page.
//! - Chat ids are unique: a chat announced twice is updated in place, and a
//!   list naming an id twice keeps the first.

use std::sync::Arc;

use crate::{ChatInfo, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChatEntry {
    info: ChatInfo,
    messages: Vec<Message>,
    /// `None` until a history page has arrived.
    has_more: Option<bool>,
}

impl ChatEntry {
    fn listed(info: ChatInfo) -> Self {
        Self { info, messages: Vec::new(), has_more: None }
    }

    /// Whether a message with the same server id is already held.
    fn holds(&self, message: &Message) -> bool {
        message.message_id.as_ref().is_some_and(|id| {
            self.messages.iter().any(|held| held.message_id.as_ref() == Some(id))
        })
    }
}

/// Snapshot of every chat the client knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatStore {
    chats: Option<Vec<Arc<ChatEntry>>>,
}

impl ChatStore {
    /// Create an uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chat list has been applied.
    pub fn is_initialized(&self) -> bool {
        self.chats.is_some()
    }

    /// Number of chats.
    pub fn len(&self) -> usize {
        self.chats.as_ref().map_or(0, Vec::len)
    }

    /// Whether there are no chats.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole contents with `chats`, in order, without messages.
    ///
    /// A repeated id keeps its first occurrence.
    #[must_use]
    pub fn apply_chat_list(&self, chats: impl IntoIterator<Item = ChatInfo>) -> Self {
        let mut entries: Vec<Arc<ChatEntry>> = Vec::new();
        for info in chats {
            if entries.iter().any(|entry| entry.info.chat_id == info.chat_id) {
                tracing::debug!(chat_id = %info.chat_id, "repeated chat in list, skipped");
                continue;
            }
            entries.push(Arc::new(ChatEntry::listed(info)));
        }
        Self { chats: Some(entries) }
    }

    /// Add a chat at the front, or update it in place if already known.
    ///
    /// An update replaces name and participants and keeps messages.
    #[must_use]
    pub fn apply_new_chat(&self, chat: ChatInfo) -> Self {
        let Some(chats) = &self.chats else {
            tracing::debug!(chat_id = %chat.chat_id, "chat before chat list, dropped");
            return self.clone();
        };

        let mut next = chats.clone();
        match self.position(&chat.chat_id) {
            Some(index) => {
                let entry = &chats[index];
                next[index] = Arc::new(ChatEntry {
                    info: chat,
                    messages: entry.messages.clone(),
                    has_more: entry.has_more,
                });
            },
            None => next.insert(0, Arc::new(ChatEntry::listed(chat))),
        }
        Self { chats: Some(next) }
    }

    /// Prepend a live message to its chat.
    #[must_use]
    pub fn apply_new_message(&self, chat_id: &str, message: Message) -> Self {
        self.update(chat_id, |entry| {
            let mut messages = Vec::with_capacity(entry.messages.len() + 1);
            messages.push(message);
            messages.extend(entry.messages.iter().cloned());
            ChatEntry { info: entry.info.clone(), messages, has_more: entry.has_more }
        })
    }

    /// Append a history page after the messages already present.
    ///
    /// Pages arrive newest first and each holds messages older than
    /// everything already in the chat, except for live messages that
    /// arrived after the page was requested. Those are already held and
    /// are skipped by server id.
    #[must_use]
    pub fn apply_chat_history(&self, chat_id: &str, page: Vec<Message>, has_more: bool) -> Self {
        self.update(chat_id, |entry| {
            let mut messages = entry.messages.clone();
            messages.extend(page.into_iter().filter(|message| !entry.holds(message)));
            ChatEntry { info: entry.info.clone(), messages, has_more: Some(has_more) }
        })
    }

    /// Uninitialized store, as after logout.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::default()
    }

    /// Chats in store order.
    pub fn chat_summaries(&self) -> impl Iterator<Item = &ChatInfo> + '_ {
        self.chats.iter().flatten().map(|entry| &entry.info)
    }

    /// Metadata of one chat.
    pub fn get(&self, chat_id: &str) -> Option<&ChatInfo> {
        self.entry(chat_id).map(|entry| &entry.info)
    }

    /// Whether `chat_id` is known.
    pub fn contains(&self, chat_id: &str) -> bool {
        self.position(chat_id).is_some()
    }

    /// Messages of a chat, newest first. Empty for unknown chats.
    pub fn messages_for(&self, chat_id: &str) -> &[Message] {
        self.entry(chat_id).map(|entry| entry.messages.as_slice()).unwrap_or_default()
    }

    /// `has_more` from the last history page. `None` before the first page
    /// or for unknown chats.
    pub fn has_more_history(&self, chat_id: &str) -> Option<bool> {
        self.entry(chat_id).and_then(|entry| entry.has_more)
    }

    /// Offset of the next history page, or `None` when the chat is unknown
    /// or its history is exhausted.
    pub fn next_history_offset(&self, chat_id: &str) -> Option<u32> {
        let entry = self.entry(chat_id)?;
        if entry.has_more == Some(false) {
            return None;
        }
        Some(u32::try_from(entry.messages.len()).unwrap_or(u32::MAX))
    }

    fn position(&self, chat_id: &str) -> Option<usize> {
        self.chats.as_ref()?.iter().position(|entry| entry.info.chat_id == chat_id)
    }

    fn entry(&self, chat_id: &str) -> Option<&ChatEntry> {
        let index = self.position(chat_id)?;
        self.chats.as_ref().map(|chats| chats[index].as_ref())
    }

    fn update(&self, chat_id: &str, f: impl FnOnce(&ChatEntry) -> ChatEntry) -> Self {
        let (Some(chats), Some(index)) = (&self.chats, self.position(chat_id)) else {
            tracing::debug!(chat_id, "event for unknown chat, dropped");
            return self.clone();
        };

        let mut next = chats.clone();
        next[index] = Arc::new(f(&chats[index]));
        Self { chats: Some(next) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(id: &str) -> ChatInfo {
        ChatInfo { chat_id: id.into(), name: format!("chat {id}"), participants: Vec::new() }
    }

    fn store(ids: &[&str]) -> ChatStore {
        ChatStore::new().apply_chat_list(ids.iter().map(|id| chat(id)))
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn new_store_is_uninitialized() {
        let store = ChatStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.chat_summaries().count(), 0);
    }

    #[test]
    fn chat_list_replaces_contents() {
        let first = store(&["1", "2"]).apply_new_message("1", Message::new("a", "hi"));
        let second = first.apply_chat_list([chat("3")]);

        let ids: Vec<_> = second.chat_summaries().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, ["3"]);
        assert!(second.messages_for("1").is_empty());
    }

    #[test]
    fn new_chat_before_list_is_dropped() {
        let store = ChatStore::new().apply_new_chat(chat("1"));
        assert!(!store.is_initialized());
    }

    #[test]
    fn new_chat_is_prepended() {
        let store = store(&["1"]).apply_new_chat(chat("2"));
        let ids: Vec<_> = store.chat_summaries().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn known_chat_is_updated_in_place() {
        let renamed =
            ChatInfo { chat_id: "1".into(), name: "renamed".into(), participants: Vec::new() };
        let store = store(&["2", "1"])
            .apply_new_message("1", Message::new("a", "kept"))
            .apply_new_chat(renamed);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1").map(|c| c.name.as_str()), Some("renamed"));
        assert_eq!(contents(store.messages_for("1")), ["kept"]);
        let ids: Vec<_> = store.chat_summaries().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn messages_are_newest_first() {
        let store = store(&["1"])
            .apply_new_message("1", Message::new("a", "first"))
            .apply_new_message("1", Message::new("b", "second"));

        assert_eq!(contents(store.messages_for("1")), ["second", "first"]);
    }

    #[test]
    fn duplicate_messages_are_kept() {
        let message = Message::new("a", "again");
        let store = store(&["1"])
            .apply_new_message("1", message.clone())
            .apply_new_message("1", message);

        assert_eq!(store.messages_for("1").len(), 2);
    }

    #[test]
    fn message_for_unknown_chat_is_dropped() {
        let before = store(&["1"]);
        let after = before.apply_new_message("99", Message::new("a", "lost"));
        assert_eq!(before, after);
    }

    #[test]
    fn history_appends_after_live_messages() {
        let store = store(&["1"])
            .apply_new_message("1", Message::new("a", "live"))
            .apply_chat_history(
                "1",
                vec![Message::new("b", "old"), Message::new("c", "older")],
                true,
            );

        assert_eq!(contents(store.messages_for("1")), ["live", "old", "older"]);
        assert_eq!(store.has_more_history("1"), Some(true));
        assert_eq!(store.next_history_offset("1"), Some(3));
    }

    #[test]
    fn history_skips_live_messages_it_overlaps() {
        let with_id = |id: &str| Message { message_id: Some(id.into()), ..Message::new("a", id) };
        // m9 arrives live while the first page is in flight; the page has it too
        let store = store(&["1"])
            .apply_new_message("1", with_id("m9"))
            .apply_chat_history("1", vec![with_id("m9"), with_id("m8")], true);

        assert_eq!(contents(store.messages_for("1")), ["m9", "m8"]);
        assert_eq!(store.next_history_offset("1"), Some(2));
    }

    #[test]
    fn history_without_server_ids_is_kept() {
        let store = store(&["1"])
            .apply_new_message("1", Message::new("a", "same"))
            .apply_chat_history("1", vec![Message::new("a", "same")], false);

        assert_eq!(contents(store.messages_for("1")), ["same", "same"]);
    }

    #[test]
    fn repeated_id_in_list_keeps_first() {
        let mut second = chat("1");
        second.name = "second".into();
        let store = ChatStore::new().apply_chat_list([chat("1"), chat("2"), second]);

        let ids: Vec<_> = store.chat_summaries().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(store.get("1").map(|c| c.name.as_str()), Some("chat 1"));
    }

    #[test]
    fn exhausted_history_has_no_next_offset() {
        let store = store(&["1"]).apply_chat_history("1", Vec::new(), false);
        assert_eq!(store.next_history_offset("1"), None);
        assert_eq!(store.next_history_offset("unknown"), None);
    }

    #[test]
    fn untouched_entries_are_shared() {
        let before = store(&["1", "2"]);
        let after = before.apply_new_message("1", Message::new("a", "hi"));

        let (Some(old), Some(new)) = (&before.chats, &after.chats) else {
            unreachable!("both snapshots are initialized");
        };
        assert!(Arc::ptr_eq(&old[1], &new[1]));
        assert!(!Arc::ptr_eq(&old[0], &new[0]));
    }

    #[test]
    fn reset_uninitializes() {
        let store = store(&["1"]).reset();
        assert!(!store.is_initialized());
        assert!(store.messages_for("1").is_empty());
    }
}
