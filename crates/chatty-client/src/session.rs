//! Current identity and access credential.

use chatty_proto::UserInfo;

use crate::{AuthApi, AuthError, LoginOutcome, SignupForm, SignupOutcome};

/// Authenticated state over an [`AuthApi`].
///
/// Identity and credential are set together on a successful login and
/// cleared together on logout.
#[derive(Debug)]
pub struct Session<A: AuthApi> {
    api: A,
    identity: Option<UserInfo>,
    credential: Option<String>,
}

impl<A: AuthApi> Session<A> {
    /// Create an unauthenticated session.
    pub fn new(api: A) -> Self {
        Self { api, identity: None, credential: None }
    }

    /// Log in. State changes only on [`LoginOutcome::Success`].
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let outcome = self.api.login(email, password).await?;
        match &outcome {
            LoginOutcome::Success { user, access_token } => {
                tracing::info!(user_id = %user.id, "logged in");
                self.identity = Some(user.clone());
                self.credential = Some(access_token.clone());
            },
            LoginOutcome::Rejected { non_field_errors } => {
                tracing::info!(errors = non_field_errors.len(), "login rejected");
            },
        }
        Ok(outcome)
    }

    /// Register an account. Does not log in.
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupOutcome, AuthError> {
        self.api.signup(form).await
    }

    /// Replace the access credential with a fresh one.
    ///
    /// The new credential is kept only while a user is logged in.
    pub async fn refresh(&mut self) -> Result<String, AuthError> {
        let credential = self.api.refresh().await?;
        if self.identity.is_some() {
            self.credential = Some(credential.clone());
        }
        Ok(credential)
    }

    /// Log out.
    ///
    /// The server call is best effort; local state is cleared regardless.
    pub async fn logout(&mut self) {
        if let Some(credential) = self.credential.take() {
            if let Err(e) = self.api.logout(&credential).await {
                tracing::warn!(error = %e, "server logout failed");
            }
        }
        if let Some(user) = self.identity.take() {
            tracing::info!(user_id = %user.id, "logged out");
        }
    }

    /// Logged-in user, if any.
    pub fn current_identity(&self) -> Option<&UserInfo> {
        self.identity.as_ref()
    }

    /// Access credential, if any.
    pub fn current_credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Whether both identity and credential are present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.credential.is_some()
    }

    /// Underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }
}
