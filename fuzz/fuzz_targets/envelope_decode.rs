//! Fuzz target for RawEnvelope::decode and payload narrowing
//!
//! Feeds arbitrary text through the full inbound path:
//! - Envelope decoding (malformed JSON, missing or mistyped fields)
//! - Narrowing to events and commands (unknown tags, wrong direction,
//!   payloads that do not match their tag)
//!
//! # Invariants
//!
//! - NEVER panic. All invalid inputs return an error.
//! - A successfully narrowed payload re-encodes and narrows back to itself.

#![no_main]

use chatty_proto::{Command, Event, RawEnvelope};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(envelope) = RawEnvelope::decode(text) else {
        return;
    };
    let _ = envelope.server_error();

    if let Ok(event) = Event::from_envelope(&envelope) {
        let encoded = event.clone().into_envelope().expect("narrowed event must re-encode");
        let again = Event::from_envelope(&encoded).expect("re-encoded event must narrow");
        assert_eq!(again, event);
    }

    if let Ok(command) = Command::from_envelope(&envelope) {
        let encoded = command
            .clone()
            .into_envelope(envelope.sender_id.clone())
            .expect("narrowed command must re-encode");
        let again = Command::from_envelope(&encoded).expect("re-encoded command must narrow");
        assert_eq!(again, command);
    }
});
