//! Terminal client for Chatty
//!
//! A thin shell over [`chatty_app::Driver`] that reads line commands and
//! prints a plain-text view. All orchestration lives in the generic
//! [`chatty_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod terminal;
pub mod view;

use chatty_app::RuntimeError;
use chatty_client::AuthError;
use thiserror::Error;

pub use terminal::LineDriver;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error from stdin or stdout.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Auth client could not be built.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Runtime failure.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// The server refused the credentials.
    #[error("login rejected: {0}")]
    LoginRejected(String),
}
