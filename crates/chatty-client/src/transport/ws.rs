//! WebSocket transport.
//!
//! Provides [`WsTransport`] which bridges a [`Link`] to a tokio-tungstenite
//! socket. This is a thin layer that only moves text frames; envelope parsing
//! stays in [`crate::ConnectionManager`].

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};
use url::Url;

use super::{LINK_CAPACITY, Link, Transport};
use crate::TransportError;

/// Close reason sent on a client-initiated disconnect.
const CLOSE_REASON: &str = "Client closed connection";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport over `ws://` / `wss://` WebSockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

impl Transport for WsTransport {
    async fn open(&self, url: &Url) -> Result<Link, TransportError> {
        let (socket, response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        tracing::debug!(status = %response.status(), "websocket handshake complete");

        let (to_server, outbound) = mpsc::channel(LINK_CAPACITY);
        let (inbound, from_server) = mpsc::channel(LINK_CAPACITY);
        let handle = tokio::spawn(run_socket(socket, outbound, inbound));

        Ok(Link::new(to_server, from_server).with_abort_handle(handle.abort_handle()))
    }
}

/// Pump frames between the socket and the link until either side closes.
async fn run_socket(
    socket: Socket,
    mut outbound: mpsc::Receiver<String>,
    inbound: mpsc::Sender<String>,
) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            next = outbound.recv() => match next {
                Some(text) => {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        tracing::warn!(error = %e, "websocket write failed");
                        break;
                    }
                },
                None => {
                    let frame = CloseFrame { code: CloseCode::Normal, reason: CLOSE_REASON.into() };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        tracing::debug!(error = %e, "close frame not delivered");
                    }
                    break;
                },
            },
            next = stream.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(text.as_str().to_owned()).await.is_err() {
                        break;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "server closed websocket");
                    break;
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "websocket read failed");
                    break;
                },
                None => break,
            },
        }
    }
}
