//! Runtime errors.

use chatty_client::AuthError;
use thiserror::Error;

/// Failures surfaced by [`crate::Runtime`].
///
/// Connection and send failures are not here: they are reported to the
/// [`crate::App`] as status and never returned.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A chat operation was used without a logged-in session.
    #[error("not logged in")]
    NotAuthenticated,

    /// The identity provider could not be reached or answered unexpectedly.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The frontend failed.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RuntimeError {
    pub(crate) fn driver(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(error))
    }
}
