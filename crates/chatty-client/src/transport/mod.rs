//! Transport seam.
//!
//! A [`Transport`] opens a [`Link`]: a pair of text channels bridged to the
//! server by tasks the transport owns. Protocol logic never sees sockets,
//! which lets the same [`crate::ConnectionManager`] run over a real
//! WebSocket or over in-process channels.

mod memory;
#[cfg(feature = "transport")]
mod ws;

use std::future::Future;

use tokio::{sync::mpsc, task::AbortHandle};
use url::Url;

pub use memory::{MemoryPeer, MemoryTransport};
#[cfg(feature = "transport")]
pub use ws::WsTransport;

use crate::TransportError;

/// Channel capacity for each direction of a link.
pub const LINK_CAPACITY: usize = 64;

/// Opens links to a server.
pub trait Transport: Send + Sync {
    /// Open a link to `url`, completing once the handshake has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer refuses or the handshake fails.
    fn open(&self, url: &Url) -> impl Future<Output = Result<Link, TransportError>> + Send;
}

/// One open connection, as a pair of text channels.
///
/// Dropping `to_server` asks the transport to close the connection
/// gracefully. The transport drops its end of `from_server` once the
/// connection is gone, for whatever reason.
#[derive(Debug)]
pub struct Link {
    /// Frames to transmit.
    pub to_server: mpsc::Sender<String>,
    /// Frames received, in arrival order.
    pub from_server: mpsc::Receiver<String>,
    /// Hard stop for the transport's tasks.
    abort_handle: Option<AbortHandle>,
}

impl Link {
    /// Create a link from its two channel ends.
    pub fn new(to_server: mpsc::Sender<String>, from_server: mpsc::Receiver<String>) -> Self {
        Self { to_server, from_server, abort_handle: None }
    }

    /// Attach the task that bridges this link to the network.
    #[must_use]
    pub fn with_abort_handle(mut self, handle: AbortHandle) -> Self {
        self.abort_handle = Some(handle);
        self
    }

    /// Split into channel ends and the abort handle.
    pub fn into_parts(
        self,
    ) -> (mpsc::Sender<String>, mpsc::Receiver<String>, Option<AbortHandle>) {
        (self.to_server, self.from_server, self.abort_handle)
    }
}
