//! Application layer for Chatty
//!
//! Pure state machines and a generic runtime for chat clients. The store and
//! the app perform no I/O; the runtime binds them to a session and a
//! connection through the [`Driver`] seam, so tests drive the same code that
//! runs in production.
//!
//! # Components
//!
//! - [`ChatStore`]: snapshot of chats and their messages
//! - [`App`]: state machine (selection, status, event application)
//! - [`Bridge`]: protocol bridge (App actions to envelopes and back)
//! - [`Driver`]: trait for frontend I/O
//! - [`Runtime`]: orchestration loop owning session and connection

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod error;
mod event;
mod runtime;
mod state;
mod store;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use driver::Driver;
pub use error::RuntimeError;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ChatInfo, ConnectionState, Message};
pub use store::ChatStore;
