//! Fuzz target for ChatStore under arbitrary event sequences
//!
//! # Invariants
//!
//! - Chat ids stay unique
//! - A message for a known chat lands at index 0, the rest unchanged
//! - A message for an unknown chat leaves the store unchanged
//! - Nothing but a chat list initializes the store

#![no_main]

use arbitrary::Arbitrary;
use chatty_app::{ChatInfo, ChatStore, Message};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    List { ids: Vec<u8> },
    NewChat { id: u8 },
    NewMessage { id: u8, content: String },
    History { id: u8, count: u8, has_more: bool },
    Reset,
}

fn chat(id: u8) -> ChatInfo {
    ChatInfo { chat_id: id.to_string(), name: format!("chat {id}"), participants: Vec::new() }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut store = ChatStore::new();

    for op in ops {
        let is_list = matches!(op, Op::List { .. });
        let next = match op {
            Op::List { mut ids } => {
                ids.sort_unstable();
                ids.dedup();
                store.apply_chat_list(ids.into_iter().map(chat))
            }
            Op::NewChat { id } => store.apply_new_chat(chat(id)),
            Op::NewMessage { id, content } => {
                let chat_id = id.to_string();
                let message = Message::new("fuzz", content);
                let next = store.apply_new_message(&chat_id, message.clone());
                if store.contains(&chat_id) {
                    let messages = next.messages_for(&chat_id);
                    assert_eq!(messages[0], message);
                    assert_eq!(&messages[1..], store.messages_for(&chat_id));
                } else {
                    assert_eq!(next, store);
                }
                next
            }
            Op::History { id, count, has_more } => {
                let page = (0..count % 8).map(|n| Message::new("old", n.to_string())).collect();
                store.apply_chat_history(&id.to_string(), page, has_more)
            }
            Op::Reset => store.reset(),
        };

        if next.is_initialized() && !store.is_initialized() {
            assert!(is_list, "only a chat list initializes the store");
        }

        let mut ids: Vec<&str> = next.chat_summaries().map(|c| c.chat_id.as_str()).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count, "duplicate chat id");

        store = next;
    }
});
