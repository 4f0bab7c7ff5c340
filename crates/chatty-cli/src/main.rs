//! Chatty CLI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Credentials from the environment
//! CHATTY_EMAIL=alice@example.com CHATTY_PASSWORD=secret chatty
//!
//! # Explicit endpoints
//! chatty --ws-url ws://chat.example.com/ws --api-url https://chat.example.com \
//!     --email alice@example.com --password secret
//! ```

use std::time::Duration;

use chatty_app::Runtime;
use chatty_cli::{CliError, LineDriver};
use chatty_client::{ClientConfig, LoginOutcome, auth::HttpAuthApi, transport::WsTransport};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Chatty terminal client
#[derive(Parser, Debug)]
#[command(name = "chatty")]
#[command(about = "Line-oriented client for the Chatty messaging service")]
#[command(version)]
struct Args {
    /// WebSocket endpoint, without the credential
    #[arg(long, env = "CHATTY_WS_URL", default_value = "ws://localhost:8080/ws")]
    ws_url: String,

    /// Base URL of the auth API
    #[arg(long, env = "CHATTY_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Login email
    #[arg(long, env = "CHATTY_EMAIL")]
    email: String,

    /// Login password
    #[arg(long, env = "CHATTY_PASSWORD", hide_env_values = true)]
    password: String,

    /// Query parameter carrying the access credential
    #[arg(long, default_value = "access_token")]
    token_param: String,

    /// Upper bound on the WebSocket handshake and each auth request
    #[arg(long, default_value = "5000")]
    connect_timeout_ms: u64,

    /// Chats and messages requested per page
    #[arg(long, default_value_t = ClientConfig::DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn config(&self) -> ClientConfig {
        let timeout = Duration::from_millis(self.connect_timeout_ms);
        ClientConfig {
            ws_url: self.ws_url.clone(),
            api_url: self.api_url.clone(),
            token_param: self.token_param.clone(),
            connect_timeout: timeout,
            request_timeout: timeout,
            page_size: self.page_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the view
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    run(&args).await?;
    Ok(())
}

async fn run(args: &Args) -> Result<(), CliError> {
    let config = args.config();
    let driver = LineDriver::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    let api = HttpAuthApi::new(&config)?;
    let mut runtime = Runtime::new(driver, WsTransport, api, &config);

    match runtime.login(&args.email, &args.password).await? {
        LoginOutcome::Success { user, .. } => {
            tracing::info!(user_id = %user.id, "logged in");
        },
        LoginOutcome::Rejected { non_field_errors } => {
            return Err(CliError::LoginRejected(non_field_errors.join("; ")));
        },
    }

    let result = runtime.run().await;
    runtime.logout().await?;
    tracing::info!("logged out");

    result?;
    Ok(())
}
