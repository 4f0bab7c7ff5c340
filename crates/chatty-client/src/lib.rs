//! Client
//!
//! Connection and identity plumbing for the Chatty protocol: everything
//! between the typed envelopes of [`chatty_proto`] and the application state
//! machines in `chatty-app`.
//!
//! # Components
//!
//! - [`ConnectionManager`]: at most one live link, fan-out of inbound
//!   envelopes to subscribers, best-effort send
//! - [`Transport`]: seam for opening links ([`transport::MemoryTransport`]
//!   for tests and simulation)
//! - [`Session`]: current identity and access credential over an
//!   [`AuthApi`] ([`auth::MemoryAuthApi`] for tests and simulation)
//! - [`ClientConfig`]: endpoints, timeouts, page size
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::WsTransport`]: WebSocket links via tokio-tungstenite
//! - [`auth::HttpAuthApi`]: the form-encoded HTTP auth endpoints via reqwest

#![forbid(unsafe_code)]

pub mod auth;
mod config;
mod connection;
mod error;
mod session;
pub mod transport;

pub use auth::{AuthApi, FormErrors, LoginOutcome, SignupForm, SignupOutcome};
pub use chatty_proto::{ChatId, UserInfo};
pub use config::ClientConfig;
pub use connection::{ConnectionManager, HandlerError, Subscription};
pub use error::{AuthError, ConnectionError, TransportError};
pub use session::Session;
pub use transport::{Link, Transport};
