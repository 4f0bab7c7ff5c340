//! In-process identity provider.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatty_proto::UserInfo;

use super::{AuthApi, FormErrors, LoginOutcome, SignupForm, SignupOutcome};
use crate::AuthError;

#[derive(Debug)]
struct Account {
    user: UserInfo,
    password: String,
}

#[derive(Debug, Default)]
struct Directory {
    accounts: Vec<Account>,
    issued: u64,
    logged_in: Option<String>,
    revoked: Vec<String>,
    unavailable: bool,
}

impl Directory {
    fn issue(&mut self, user_id: &str) -> String {
        self.issued += 1;
        format!("token-{user_id}-{}", self.issued)
    }
}

/// [`AuthApi`] backed by an in-memory account list.
///
/// Cloning shares the directory, so a test can keep a handle while a
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthApi {
    directory: Arc<Mutex<Directory>>,
}

impl MemoryAuthApi {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account that can log in with `password`.
    #[must_use]
    pub fn with_account(self, user: UserInfo, password: impl Into<String>) -> Self {
        self.directory().accounts.push(Account { user, password: password.into() });
        self
    }

    /// Make every subsequent call fail as if the server were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.directory().unavailable = unavailable;
    }

    /// Credentials revoked through [`AuthApi::logout`], oldest first.
    pub fn revoked(&self) -> Vec<String> {
        self.directory().revoked.clone()
    }

    fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn available(&self) -> Result<MutexGuard<'_, Directory>, AuthError> {
        let directory = self.directory();
        if directory.unavailable {
            return Err(AuthError::Http("auth service unavailable".to_string()));
        }
        Ok(directory)
    }
}

impl AuthApi for MemoryAuthApi {
    async fn signup(&self, form: &SignupForm) -> Result<SignupOutcome, AuthError> {
        let mut directory = self.available()?;

        let mut errors = FormErrors::default();
        for (field, value) in [("name", &form.name), ("email", &form.email), ("password", &form.password)]
        {
            if value.trim().is_empty() {
                errors.field_errors.insert(field.to_string(), "This field cannot be blank".into());
            }
        }
        if directory.accounts.iter().any(|account| account.user.email == form.email) {
            errors.field_errors.insert("email".into(), "Email address is already in use".into());
        }
        if !errors.is_empty() {
            return Ok(SignupOutcome::Invalid(errors));
        }

        let id = format!("user-{}", directory.accounts.len() + 1);
        let user = UserInfo { id, name: form.name.clone(), email: form.email.clone() };
        directory.accounts.push(Account { user, password: form.password.clone() });
        Ok(SignupOutcome::Created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let mut directory = self.available()?;

        let user = directory
            .accounts
            .iter()
            .find(|account| account.user.email == email && account.password == password)
            .map(|account| account.user.clone());

        match user {
            Some(user) => {
                let access_token = directory.issue(&user.id);
                directory.logged_in = Some(user.id.clone());
                Ok(LoginOutcome::Success { user, access_token })
            },
            None => Ok(LoginOutcome::Rejected {
                non_field_errors: vec!["Email or password is incorrect".to_string()],
            }),
        }
    }

    async fn refresh(&self) -> Result<String, AuthError> {
        let mut directory = self.available()?;
        match directory.logged_in.clone() {
            Some(user_id) => Ok(directory.issue(&user_id)),
            None => Err(AuthError::UnexpectedResponse {
                status: 401,
                message: "Refresh token not found".to_string(),
            }),
        }
    }

    async fn logout(&self, credential: &str) -> Result<(), AuthError> {
        let mut directory = self.available()?;
        directory.logged_in = None;
        directory.revoked.push(credential.to_string());
        Ok(())
    }
}
