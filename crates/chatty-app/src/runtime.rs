//! Generic runtime for application orchestration.
//!
//! The runtime is the long-lived context of a client session. It owns the
//! [`Session`], the one [`ConnectionManager`], the [`App`] and the
//! [`Bridge`], and ties the connection's lifecycle to authentication:
//!
//! - login: on success, stamp the identity, subscribe the inbound forwarder
//!   and connect. A rejected login never opens a connection.
//! - logout: disconnect, drop every handler, revoke the credential and
//!   reset the app to its uninitialized state.
//!
//! Inbound envelopes reach the runtime through a channel fed by the
//! forwarder, so the store has exactly one writer: the loop in
//! [`Runtime::step`].

use std::time::Duration;

use chatty_client::{
    AuthApi, ClientConfig, ConnectionManager, LoginOutcome, Session, Subscription, Transport,
    UserInfo,
};
use chatty_proto::{ChatId, RawEnvelope};
use tokio::sync::mpsc;

use crate::{App, AppAction, AppEvent, Bridge, ConnectionState, Driver, RuntimeError};

/// Idle time after which the runtime checks whether the link is still up.
const LIVENESS_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime that orchestrates App, Bridge, Session and connection.
///
/// # Type Parameters
///
/// - `D`: frontend I/O driver
/// - `T`: transport the connection manager opens links with
/// - `A`: identity provider
pub struct Runtime<D, T, A>
where
    D: Driver,
    T: Transport,
    A: AuthApi,
{
    driver: D,
    app: App,
    bridge: Bridge,
    session: Session<A>,
    connection: ConnectionManager<T>,
    inbound_tx: mpsc::UnboundedSender<RawEnvelope>,
    inbound: mpsc::UnboundedReceiver<RawEnvelope>,
    forwarder: Option<Subscription>,
    reconnect_requested: bool,
}

impl<D, T, A> Runtime<D, T, A>
where
    D: Driver,
    T: Transport,
    A: AuthApi,
{
    /// Create a logged-out runtime.
    pub fn new(driver: D, transport: T, api: A, config: &ClientConfig) -> Self {
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        Self {
            driver,
            app: App::new(config.page_size),
            bridge: Bridge::new(),
            session: Session::new(api),
            connection: ConnectionManager::new(transport, config),
            inbound_tx,
            inbound,
            forwarder: None,
            reconnect_requested: false,
        }
    }

    /// Log in and, on success, connect.
    ///
    /// A connection failure is reported to the app as status; the login
    /// itself still succeeded.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, RuntimeError> {
        if self.session.is_authenticated() {
            self.logout().await?;
        }

        let outcome = self.session.login(email, password).await?;
        match &outcome {
            LoginOutcome::Success { user, .. } => self.start(user.clone()).await?,
            LoginOutcome::Rejected { non_field_errors } => {
                let status = if non_field_errors.is_empty() {
                    "Login failed".to_string()
                } else {
                    non_field_errors.join("; ")
                };
                self.app.set_status(status);
                self.render()?;
            },
        }
        Ok(outcome)
    }

    /// Connect again after the link dropped.
    ///
    /// The credential from login may have expired by now, so a fresh one is
    /// requested first. If the refresh fails the current one is tried.
    /// Returns whether a link is open afterwards.
    pub async fn reconnect(&mut self) -> Result<bool, RuntimeError> {
        let user = self.session.current_identity().cloned().ok_or(RuntimeError::NotAuthenticated)?;
        if !self.connection.is_connected() {
            if let Err(e) = self.session.refresh().await {
                tracing::warn!(error = %e, "credential refresh failed, reusing current credential");
            }
            self.start(user).await?;
        }
        Ok(self.connection.is_connected())
    }

    /// Log out and tear down the connection.
    pub async fn logout(&mut self) -> Result<(), RuntimeError> {
        self.connection.disconnect();
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.unsubscribe();
        }
        self.connection.clear_all_handlers();
        self.session.logout().await;
        self.bridge.clear_identity();
        while self.inbound.try_recv().is_ok() {}

        let actions = self.app.reset();
        self.process_actions(actions)?;
        Ok(())
    }

    /// Run until the driver quits.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NotAuthenticated`] if called before login, or
    /// an error if the driver fails.
    pub async fn run(&mut self) -> Result<(), RuntimeError> {
        self.ensure_authenticated()?;
        self.render()?;

        while !self.step().await? {}

        self.driver.stop();
        Ok(())
    }

    /// Process one inbound envelope, one input, or one idle liveness check.
    ///
    /// Server events win over input when both are ready. A reconnect
    /// requested by the input runs before returning. Returns `true` if the
    /// application should quit.
    pub async fn step(&mut self) -> Result<bool, RuntimeError> {
        let actions = tokio::select! {
            biased;
            Some(envelope) = self.inbound.recv() => self.handle_envelope(&envelope),
            input = self.driver.poll_event(&mut self.app) => input.map_err(RuntimeError::driver)?,
            () = tokio::time::sleep(LIVENESS_INTERVAL) => self.check_liveness(),
        };
        let quit = self.process_actions(actions)?;

        if std::mem::take(&mut self.reconnect_requested) && !quit {
            self.reconnect().await?;
        }
        Ok(quit)
    }

    /// Select a chat, requesting its history if needed.
    pub fn select_chat(&mut self, chat_id: Option<ChatId>) -> Result<(), RuntimeError> {
        self.ensure_authenticated()?;
        let actions = self.app.select_chat(chat_id);
        self.process_actions(actions)?;
        Ok(())
    }

    /// Send a message to the selected chat.
    pub fn send_message(&mut self, content: impl Into<String>) -> Result<(), RuntimeError> {
        self.ensure_authenticated()?;
        let actions = self.app.send_message(content);
        self.process_actions(actions)?;
        Ok(())
    }

    /// Create a chat.
    pub fn create_chat(
        &mut self,
        name: impl Into<String>,
        participant_emails: Vec<String>,
    ) -> Result<(), RuntimeError> {
        self.ensure_authenticated()?;
        let actions = self.app.create_chat(name, participant_emails);
        self.process_actions(actions)?;
        Ok(())
    }

    /// Request the next history page of the selected chat.
    pub fn request_history(&mut self) -> Result<(), RuntimeError> {
        self.ensure_authenticated()?;
        let actions = self.app.request_history();
        self.process_actions(actions)?;
        Ok(())
    }

    /// Whether the link is live.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &Session<A> {
        &self.session
    }

    /// Get a reference to the connection manager.
    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    /// Get a reference to the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    async fn start(&mut self, user: UserInfo) -> Result<(), RuntimeError> {
        let credential =
            self.session.current_credential().ok_or(RuntimeError::NotAuthenticated)?.to_string();
        self.bridge.set_identity(user.id.clone());
        self.subscribe_forwarder();

        let actions = self.app.handle(AppEvent::Connecting);
        self.process_actions(actions)?;

        let event = match self.connection.try_connect(&credential).await {
            Ok(()) => AppEvent::Connected { user },
            Err(e) => {
                tracing::warn!(error = %e, "failed to connect");
                AppEvent::Disconnected { reason: Some(e.to_string()) }
            },
        };
        let actions = self.app.handle(event);
        self.process_actions(actions)?;
        Ok(())
    }

    fn subscribe_forwarder(&mut self) {
        if self.forwarder.is_some() {
            return;
        }
        let inbound = self.inbound_tx.clone();
        self.forwarder = Some(self.connection.subscribe(move |envelope| {
            inbound.send(envelope.clone())?;
            Ok(())
        }));
    }

    fn handle_envelope(&mut self, envelope: &RawEnvelope) -> Vec<AppAction> {
        match self.bridge.handle_envelope(envelope) {
            Some(event) => self.app.handle(event),
            None => vec![],
        }
    }

    fn check_liveness(&mut self) -> Vec<AppAction> {
        let believes_connected = matches!(self.app.connection_state(), ConnectionState::Connected { .. });
        if believes_connected && !self.connection.is_connected() {
            tracing::warn!("connection lost");
            return self.app.handle(AppEvent::Disconnected { reason: Some("connection lost".into()) });
        }
        vec![]
    }

    /// Execute actions, feeding resulting events back into the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, RuntimeError> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.render()?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Reconnect => self.reconnect_requested = true,

                    // Protocol operations go through the bridge
                    AppAction::RequestChatList { .. }
                    | AppAction::CreateChat { .. }
                    | AppAction::RequestHistory { .. }
                    | AppAction::SendMessage { .. } => {
                        self.ensure_authenticated()?;
                        for event in self.bridge.process_app_action(action) {
                            pending_actions.extend(self.app.handle(event));
                        }
                        pending_actions.extend(self.send_outgoing());
                    },
                }
            }
        }
        Ok(false)
    }

    /// Send queued envelopes. Failures become status, never errors.
    fn send_outgoing(&mut self) -> Vec<AppAction> {
        let mut actions = Vec::new();
        for envelope in self.bridge.take_outgoing() {
            if !self.connection.send(&envelope) {
                self.app.set_status(format!("Not connected, {} not sent", envelope.kind));
                actions.push(AppAction::Render);
            }
        }
        actions
    }

    fn render(&mut self) -> Result<(), RuntimeError> {
        self.driver.render(&self.app).map_err(RuntimeError::driver)
    }

    fn ensure_authenticated(&self) -> Result<(), RuntimeError> {
        if self.session.is_authenticated() { Ok(()) } else { Err(RuntimeError::NotAuthenticated) }
    }
}
