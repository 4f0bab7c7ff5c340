//! Client configuration.

use std::time::Duration;

/// Endpoints, timeouts and paging for a client.
///
/// URLs are kept as strings and parsed when used, so a bad value surfaces as
/// an error from the operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket endpoint, without the credential.
    pub ws_url: String,
    /// Base URL of the HTTP auth API.
    pub api_url: String,
    /// Query parameter carrying the access credential on authenticated
    /// requests and the WebSocket handshake.
    pub token_param: String,
    /// Upper bound on the WebSocket handshake.
    pub connect_timeout: Duration,
    /// Upper bound on each HTTP auth request.
    pub request_timeout: Duration,
    /// Page size for chat-list and history requests.
    pub page_size: u32,
}

impl ClientConfig {
    /// Default page size for list and history requests.
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// Default timeout for handshakes and HTTP requests.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8080/ws".to_string(),
            api_url: "http://localhost:8080".to_string(),
            token_param: "access_token".to_string(),
            connect_timeout: Self::DEFAULT_TIMEOUT,
            request_timeout: Self::DEFAULT_TIMEOUT,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}
