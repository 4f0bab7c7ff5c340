//! Identity provider contract.
//!
//! [`AuthApi`] is the seam between [`crate::Session`] and whatever issues
//! credentials. The HTTP implementation lives behind the `transport`
//! feature; [`MemoryAuthApi`] serves tests and simulations.
//!
//! The server wraps every response in `{data, message, status}`. The
//! `parse_*` functions turn a status code and body into an outcome and are
//! independent of any HTTP client.

#[cfg(feature = "transport")]
mod http;
mod memory;

use std::{collections::BTreeMap, future::Future};

use chatty_proto::UserInfo;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

#[cfg(feature = "transport")]
pub use http::HttpAuthApi;
pub use memory::MemoryAuthApi;

use crate::AuthError;

/// Issues and revokes access credentials.
pub trait AuthApi: Send + Sync {
    /// Register an account.
    fn signup(
        &self,
        form: &SignupForm,
    ) -> impl Future<Output = Result<SignupOutcome, AuthError>> + Send;

    /// Exchange email and password for an identity and access credential.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginOutcome, AuthError>> + Send;

    /// Obtain a fresh access credential.
    fn refresh(&self) -> impl Future<Output = Result<String, AuthError>> + Send;

    /// Revoke the session identified by `credential`.
    fn logout(&self, credential: &str) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Result of a login attempt the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted.
    Success {
        /// Authenticated user.
        user: UserInfo,
        /// Access credential for the WebSocket and protected endpoints.
        access_token: String,
    },
    /// Credentials refused.
    Rejected {
        /// Messages for the user, possibly empty.
        non_field_errors: Vec<String>,
    },
}

/// Result of a signup attempt the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Account created; the user can log in.
    Created,
    /// Form rejected.
    Invalid(FormErrors),
}

/// Validation errors for a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormErrors {
    /// Errors not tied to a field.
    #[serde(default, alias = "NonFieldErrors", deserialize_with = "nullable")]
    pub non_field_errors: Vec<String>,
    /// Errors keyed by field name.
    #[serde(default, alias = "FieldErrors", deserialize_with = "nullable")]
    pub field_errors: BTreeMap<String, String>,
}

impl FormErrors {
    /// Whether no error was reported.
    pub fn is_empty(&self) -> bool {
        self.non_field_errors.is_empty() && self.field_errors.is_empty()
    }
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    data: Option<T>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    user_info: Option<UserInfo>,
    #[serde(default)]
    access_token: String,
    #[serde(default, alias = "NonFieldErrors", deserialize_with = "nullable")]
    non_field_errors: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    access_token: String,
}

/// Interpret a `/user/login` response.
pub fn parse_login_response(status: u16, body: &str) -> Result<LoginOutcome, AuthError> {
    match status {
        200 => {
            let response: ApiResponse<LoginData> = serde_json::from_str(body)?;
            match response.data {
                Some(LoginData { user_info: Some(user), access_token, .. })
                    if !access_token.is_empty() =>
                {
                    Ok(LoginOutcome::Success { user, access_token })
                },
                _ => Err(AuthError::UnexpectedResponse {
                    status,
                    message: "login succeeded without identity or credential".to_string(),
                }),
            }
        },
        422 => {
            let response: ApiResponse<LoginData> = serde_json::from_str(body)?;
            let non_field_errors =
                response.data.map(|data| data.non_field_errors).unwrap_or_default();
            Ok(LoginOutcome::Rejected { non_field_errors })
        },
        _ => Ok(LoginOutcome::Rejected { non_field_errors: Vec::new() }),
    }
}

/// Interpret a `/user/signup` response.
///
/// Errors are read from `data.form`, falling back to `data` itself. A
/// rejection with no listed errors carries the server's message instead.
pub fn parse_signup_response(status: u16, body: &str) -> Result<SignupOutcome, AuthError> {
    if (200..300).contains(&status) {
        return Ok(SignupOutcome::Created);
    }
    if status >= 500 {
        return Err(AuthError::UnexpectedResponse { status, message: message_of(body) });
    }

    let response: ApiResponse<Value> = serde_json::from_str(body)?;
    let mut errors = match response.data {
        Some(Value::Object(mut data)) => {
            let form = data.remove("form").unwrap_or(Value::Object(data));
            decode_or_default::<FormErrors>(form)?
        },
        _ => FormErrors::default(),
    };
    if errors.is_empty() && !response.message.is_empty() {
        errors.non_field_errors.push(response.message);
    }
    Ok(SignupOutcome::Invalid(errors))
}

/// Interpret a `/user/refresh` response, yielding the new credential.
pub fn parse_refresh_response(status: u16, body: &str) -> Result<String, AuthError> {
    if status != 200 {
        return Err(AuthError::UnexpectedResponse { status, message: message_of(body) });
    }
    let response: ApiResponse<RefreshData> = serde_json::from_str(body)?;
    match response.data {
        Some(RefreshData { access_token }) if !access_token.is_empty() => Ok(access_token),
        _ => Err(AuthError::UnexpectedResponse {
            status,
            message: "refresh returned no credential".to_string(),
        }),
    }
}

/// Interpret a `/user/logout` response.
pub fn parse_logout_response(status: u16, body: &str) -> Result<(), AuthError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(AuthError::UnexpectedResponse { status, message: message_of(body) })
    }
}

/// Server's `message` field, or the raw body when it is not an envelope.
fn message_of(body: &str) -> String {
    serde_json::from_str::<ApiResponse<Value>>(body)
        .map(|response| response.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> Result<T, AuthError> {
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value)?)
}

/// Treat `null` as the empty collection.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
