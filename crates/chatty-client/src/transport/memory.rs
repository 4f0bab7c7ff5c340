//! In-process transport.
//!
//! Every successful [`MemoryTransport::open`] hands the far end of the new
//! link to the test (or simulated server) as a [`MemoryPeer`].

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use url::Url;

use super::{LINK_CAPACITY, Link, Transport};
use crate::TransportError;

#[derive(Debug, Default)]
struct Behavior {
    refuse: bool,
    stall: bool,
    opened: Vec<Url>,
}

/// Transport over in-process channels.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    behavior: Arc<Mutex<Behavior>>,
    peers: mpsc::UnboundedSender<MemoryPeer>,
}

/// Server side of a [`MemoryTransport`] link.
#[derive(Debug)]
pub struct MemoryPeer {
    /// URL the client opened, credential included.
    pub url: Url,
    /// Frames the client sent.
    pub from_client: mpsc::Receiver<String>,
    /// Frames to deliver to the client.
    pub to_client: mpsc::Sender<String>,
}

impl MemoryTransport {
    /// Create a transport and the receiver that yields a peer per link.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        (Self { behavior: Arc::default(), peers }, rx)
    }

    /// Fail every subsequent handshake.
    pub fn refuse_connections(&self, refuse: bool) {
        self.behavior().refuse = refuse;
    }

    /// Never complete subsequent handshakes.
    pub fn stall_connections(&self, stall: bool) {
        self.behavior().stall = stall;
    }

    /// URLs of every open attempt so far, including failed ones.
    pub fn attempts(&self) -> Vec<Url> {
        self.behavior().opened.clone()
    }

    fn behavior(&self) -> std::sync::MutexGuard<'_, Behavior> {
        self.behavior.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    async fn open(&self, url: &Url) -> Result<Link, TransportError> {
        let (refuse, stall) = {
            let mut behavior = self.behavior();
            behavior.opened.push(url.clone());
            (behavior.refuse, behavior.stall)
        };

        if refuse {
            return Err(TransportError::Handshake("connection refused".into()));
        }
        if stall {
            std::future::pending::<()>().await;
        }

        let (to_server, from_client) = mpsc::channel(LINK_CAPACITY);
        let (to_client, from_server) = mpsc::channel(LINK_CAPACITY);
        self.peers
            .send(MemoryPeer { url: url.clone(), from_client, to_client })
            .map_err(|_| TransportError::Handshake("no peer listening".into()))?;

        Ok(Link::new(to_server, from_server))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("ws://chat.test/ws?access_token=t").unwrap()
    }

    #[tokio::test]
    async fn open_hands_peer_to_listener() {
        let (transport, mut peers) = MemoryTransport::new();
        let link = transport.open(&url()).await.unwrap();
        let mut peer = peers.recv().await.unwrap();

        link.to_server.send("ping".into()).await.unwrap();
        assert_eq!(peer.from_client.recv().await.as_deref(), Some("ping"));
        assert_eq!(peer.url, url());
    }

    #[tokio::test]
    async fn refused_open_is_recorded() {
        let (transport, _peers) = MemoryTransport::new();
        transport.refuse_connections(true);

        assert!(transport.open(&url()).await.is_err());
        assert_eq!(transport.attempts().len(), 1);
    }

    #[tokio::test]
    async fn dropping_peer_closes_inbound() {
        let (transport, mut peers) = MemoryTransport::new();
        let mut link = transport.open(&url()).await.unwrap();
        drop(peers.recv().await);

        assert_eq!(link.from_server.recv().await, None);
        assert!(link.to_server.is_closed());
    }
}
