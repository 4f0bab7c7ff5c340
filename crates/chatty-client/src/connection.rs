//! Connection manager.
//!
//! [`ConnectionManager`] owns at most one live [`Link`] and fans every
//! inbound envelope out to the registered handlers, in receipt order.
//!
//! # Failure model
//!
//! Nothing here returns an error across the async boundary to the caller of
//! [`ConnectionManager::connect`], [`ConnectionManager::send`] or
//! [`ConnectionManager::disconnect`]: failures are logged and folded into a
//! `bool`. [`ConnectionManager::try_connect`] keeps the reason for callers
//! that need it.
//!
//! There is no reconnect. A link that drops stays down until `connect` is
//! called again; the stale handle is released at that point so it cannot
//! block the new attempt.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chatty_proto::RawEnvelope;
use tokio::{
    sync::mpsc,
    task::{AbortHandle, JoinHandle},
};
use url::Url;

use crate::{ClientConfig, ConnectionError, Link, Transport};

/// Error a message handler may report. Logged, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = Arc<dyn Fn(&RawEnvelope) -> Result<(), HandlerError> + Send + Sync>;

#[derive(Default)]
struct HandlerRegistry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

impl HandlerRegistry {
    fn insert(&mut self, handler: Handler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    fn snapshot(&self) -> Vec<Handler> {
        self.handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect()
    }
}

fn lock(registry: &Mutex<HandlerRegistry>) -> MutexGuard<'_, HandlerRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration of one handler.
///
/// Dropping a `Subscription` does not unregister; call
/// [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<HandlerRegistry>>,
}

impl Subscription {
    /// Remove exactly this handler. Idempotent.
    ///
    /// Returns `true` if the handler was still registered.
    pub fn unsubscribe(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| lock(&registry).remove(self.id))
    }
}

struct ActiveLink {
    to_server: mpsc::Sender<String>,
    /// Set once the inbound side has ended.
    closed: Arc<AtomicBool>,
    dispatch: JoinHandle<()>,
    transport: Option<AbortHandle>,
}

impl ActiveLink {
    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && !self.to_server.is_closed()
    }

    /// Graceful close: the transport sees its outbound channel end.
    fn close(self) {
        drop(self.to_server);
        self.dispatch.abort();
    }

    /// Hard stop for links that are already dead.
    fn abort(self) {
        self.dispatch.abort();
        if let Some(handle) = self.transport {
            handle.abort();
        }
    }
}

/// Owns the connection to the server.
///
/// Generic over [`Transport`] so tests and simulations can substitute
/// [`crate::transport::MemoryTransport`].
pub struct ConnectionManager<T: Transport> {
    transport: T,
    endpoint: String,
    token_param: String,
    connect_timeout: Duration,
    link: Option<ActiveLink>,
    handlers: Arc<Mutex<HandlerRegistry>>,
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager. No connection is opened until [`Self::connect`].
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            endpoint: config.ws_url.clone(),
            token_param: config.token_param.clone(),
            connect_timeout: config.connect_timeout,
            link: None,
            handlers: Arc::default(),
        }
    }

    /// Open the connection, authenticating with `credential`.
    ///
    /// Returns `false` if the credential is empty, a connection is already
    /// open, or the handshake fails or times out.
    pub async fn connect(&mut self, credential: &str) -> bool {
        match self.try_connect(credential).await {
            Ok(()) => true,
            Err(ConnectionError::AlreadyConnected) => {
                tracing::debug!("connect ignored, already connected");
                false
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to connect");
                false
            },
        }
    }

    /// Open the connection, reporting why it failed.
    pub async fn try_connect(&mut self, credential: &str) -> Result<(), ConnectionError> {
        if credential.is_empty() {
            return Err(ConnectionError::MissingCredential);
        }
        if self.is_connected() {
            return Err(ConnectionError::AlreadyConnected);
        }
        if let Some(stale) = self.link.take() {
            tracing::debug!("releasing stale link");
            stale.abort();
        }

        let url = self.url_for(credential)?;
        let link = tokio::time::timeout(self.connect_timeout, self.transport.open(&url))
            .await
            .map_err(|_| ConnectionError::Timeout(self.connect_timeout))??;

        self.link = Some(self.attach(link));
        tracing::info!(endpoint = %self.endpoint, "connected");
        Ok(())
    }

    /// Close the connection if it is open.
    ///
    /// Returns `false` when there was nothing open to close.
    pub fn disconnect(&mut self) -> bool {
        match self.link.take() {
            Some(link) if link.is_open() => {
                link.close();
                tracing::info!("disconnected");
                true
            },
            Some(stale) => {
                stale.abort();
                false
            },
            None => false,
        }
    }

    /// Transmit an envelope if the connection is open.
    ///
    /// At-most-once: nothing is queued for later delivery.
    pub fn send(&self, envelope: &RawEnvelope) -> bool {
        let Some(link) = self.link.as_ref().filter(|link| link.is_open()) else {
            tracing::warn!(kind = %envelope.kind, "not connected, message not sent");
            return false;
        };

        let text = match envelope.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, kind = %envelope.kind, "failed to encode envelope");
                return false;
            },
        };

        match link.to_server.try_send(text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, kind = %envelope.kind, "message not sent");
                false
            },
        }
    }

    /// Whether the link is live right now.
    ///
    /// Checks the link itself rather than a cached flag, so a connection the
    /// server dropped reads as closed even before anyone reacted to it.
    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(ActiveLink::is_open)
    }

    /// Register a handler for every inbound envelope.
    ///
    /// Handlers run in registration order, once per envelope, in receipt
    /// order. A handler that errors or panics is logged and skipped; the
    /// remaining handlers still run.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&RawEnvelope) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let id = lock(&self.handlers).insert(Arc::new(handler));
        Subscription { id, registry: Arc::downgrade(&self.handlers) }
    }

    /// Drop every registered handler.
    pub fn clear_all_handlers(&self) {
        lock(&self.handlers).handlers.clear();
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        lock(&self.handlers).handlers.len()
    }

    fn url_for(&self, credential: &str) -> Result<Url, ConnectionError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut().append_pair(&self.token_param, credential);
        Ok(url)
    }

    fn attach(&self, link: Link) -> ActiveLink {
        let (to_server, mut from_server, transport) = link.into_parts();
        let closed = Arc::new(AtomicBool::new(false));
        let handlers = Arc::clone(&self.handlers);
        let flag = Arc::clone(&closed);

        let dispatch = tokio::spawn(async move {
            while let Some(text) = from_server.recv().await {
                match RawEnvelope::decode(&text) {
                    Ok(envelope) => dispatch(&handlers, &envelope),
                    Err(e) => tracing::warn!(error = %e, "dropping unparseable frame"),
                }
            }
            flag.store(true, Ordering::Release);
            tracing::info!("connection closed by server");
        });

        ActiveLink { to_server, closed, dispatch, transport }
    }
}

/// Deliver one envelope to every handler registered at this moment.
fn dispatch(registry: &Mutex<HandlerRegistry>, envelope: &RawEnvelope) {
    let handlers = lock(registry).snapshot();
    for handler in handlers {
        match catch_unwind(AssertUnwindSafe(|| handler(envelope))) {
            Ok(Ok(())) => {},
            Ok(Err(e)) => {
                tracing::warn!(error = %e, kind = %envelope.kind, "message handler failed");
            },
            Err(_) => tracing::error!(kind = %envelope.kind, "message handler panicked"),
        }
    }
}
