//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from a specific
//! frontend. Each frontend implements it for its own input and output while
//! the generic [`crate::Runtime`] handles connection and protocol
//! orchestration.

use std::future::Future;

use crate::{App, AppAction};

/// Frontend I/O for the application runtime.
///
/// # Implementations
///
/// - **CLI**: line commands from stdin, plain text to stdout
/// - **Tests**: scripted input, recorded renders
pub trait Driver: Send {
    /// Frontend error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Wait for user input and apply it to `app`.
    ///
    /// Returns the actions the input produced. Must be cancel safe: the
    /// runtime drops this future whenever a server event arrives first.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release frontend resources.
    fn stop(&mut self);
}
