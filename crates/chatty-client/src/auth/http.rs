//! HTTP auth API over reqwest.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::{
    AuthApi, LoginOutcome, SignupForm, SignupOutcome, parse_login_response,
    parse_logout_response, parse_refresh_response, parse_signup_response,
};
use crate::{AuthError, ClientConfig};

/// [`AuthApi`] over the server's form-encoded HTTP endpoints.
///
/// The refresh credential travels as a cookie set by login, so the client
/// keeps a cookie store for its lifetime.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
    token_param: String,
    timeout: Duration,
}

impl HttpAuthApi {
    /// Create a client for `config.api_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, AuthError> {
        Url::parse(&config.api_url)?;
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token_param: config.token_param.clone(),
            timeout: config.request_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    fn classify(&self, error: &reqwest::Error) -> AuthError {
        if error.is_timeout() {
            AuthError::Timeout(self.timeout)
        } else {
            AuthError::Http(error.to_string())
        }
    }

    async fn post(&self, url: Url, form: &[(&str, &str)]) -> Result<(u16, String), AuthError> {
        tracing::debug!(path = url.path(), "auth request");

        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(&e))?;

        tracing::debug!(status, "auth response");
        Ok((status, body))
    }
}

impl AuthApi for HttpAuthApi {
    async fn signup(&self, form: &SignupForm) -> Result<SignupOutcome, AuthError> {
        let url = self.endpoint("/user/signup")?;
        let fields = [
            ("name", form.name.as_str()),
            ("email", form.email.as_str()),
            ("password", form.password.as_str()),
        ];
        let (status, body) = self.post(url, &fields).await?;
        parse_signup_response(status, &body)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let url = self.endpoint("/user/login")?;
        let (status, body) = self.post(url, &[("email", email), ("password", password)]).await?;
        parse_login_response(status, &body)
    }

    async fn refresh(&self) -> Result<String, AuthError> {
        let url = self.endpoint("/user/refresh")?;
        let (status, body) = self.post(url, &[]).await?;
        parse_refresh_response(status, &body)
    }

    async fn logout(&self, credential: &str) -> Result<(), AuthError> {
        let mut url = self.endpoint("/user/logout")?;
        url.query_pairs_mut().append_pair(&self.token_param, credential);
        let (status, body) = self.post(url, &[]).await?;
        parse_logout_response(status, &body)
    }
}
