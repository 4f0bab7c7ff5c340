//! Runtime tests over the in-memory transport and identity provider.
//!
//! The test plays the server: it reads what the client sends from the
//! [`MemoryPeer`] and pushes frames back through it.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::convert::Infallible;

use chatty_app::{App, AppAction, ConnectionState, Driver, Runtime, RuntimeError};
use chatty_client::{
    ClientConfig, LoginOutcome, UserInfo,
    auth::MemoryAuthApi,
    transport::{MemoryPeer, MemoryTransport},
};
use chatty_proto::{Command, RawEnvelope};
use tokio::sync::mpsc;

/// One scripted user input.
enum Input {
    Send(String),
    Quit,
}

/// Driver fed from a channel. A closed script quits.
struct ScriptDriver {
    script: mpsc::UnboundedReceiver<Input>,
    renders: usize,
    stopped: bool,
}

impl Driver for ScriptDriver {
    type Error = Infallible;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        Ok(match self.script.recv().await {
            Some(Input::Send(content)) => app.send_message(content),
            Some(Input::Quit) | None => app.quit(),
        })
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

struct Harness {
    runtime: Runtime<ScriptDriver, MemoryTransport, MemoryAuthApi>,
    transport: MemoryTransport,
    peers: mpsc::UnboundedReceiver<MemoryPeer>,
    api: MemoryAuthApi,
    script: mpsc::UnboundedSender<Input>,
}

fn alice() -> UserInfo {
    UserInfo { id: "u1".into(), name: "Alice".into(), email: "alice@chatty.test".into() }
}

fn harness() -> Harness {
    let (transport, peers) = MemoryTransport::new();
    let api = MemoryAuthApi::new().with_account(alice(), "secret");
    let (script, rx) = mpsc::unbounded_channel();
    let driver = ScriptDriver { script: rx, renders: 0, stopped: false };
    let runtime = Runtime::new(driver, transport.clone(), api.clone(), &ClientConfig::default());
    Harness { runtime, transport, peers, api, script }
}

/// Log in and take the server side of the link, past the initial chat-list
/// request.
async fn logged_in(h: &mut Harness) -> MemoryPeer {
    let outcome = h.runtime.login("alice@chatty.test", "secret").await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Success { .. }));

    let mut peer = h.peers.recv().await.unwrap();
    let first = next_command(&mut peer).await;
    assert!(matches!(first, Command::RequestChatList(_)));
    peer
}

async fn next_command(peer: &mut MemoryPeer) -> Command {
    let frame = peer.from_client.recv().await.unwrap();
    let envelope = RawEnvelope::decode(&frame).unwrap();
    assert_eq!(envelope.sender_id, "u1");
    Command::from_envelope(&envelope).unwrap()
}

async fn push(h: &mut Harness, peer: &MemoryPeer, frame: &str) {
    peer.to_client.send(frame.to_string()).await.unwrap();
    let quit = h.runtime.step().await.unwrap();
    assert!(!quit);
}

const CHAT_LIST: &str = r#"{"type":"ClientReceiveChatList","data":{"chats":[
    {"chatId":"1","name":"General","participantInfos":null}
]}}"#;

#[tokio::test]
async fn rejected_login_never_connects() {
    let mut h = harness();

    let outcome = h.runtime.login("alice@chatty.test", "wrong").await.unwrap();

    assert!(matches!(outcome, LoginOutcome::Rejected { .. }));
    assert!(h.transport.attempts().is_empty());
    assert!(!h.runtime.is_connected());
    assert!(!h.runtime.session().is_authenticated());
    assert_eq!(h.runtime.app().status_message(), Some("Email or password is incorrect"));
}

#[tokio::test]
async fn login_connects_with_credential_and_requests_chats() {
    let mut h = harness();

    h.runtime.login("alice@chatty.test", "secret").await.unwrap();

    let attempts = h.transport.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].query(), Some("access_token=token-u1-1"));
    assert!(h.runtime.is_connected());
    assert_eq!(h.runtime.app().connection_state(), &ConnectionState::Connected {
        user_id: "u1".into()
    });

    let mut peer = h.peers.recv().await.unwrap();
    let Command::RequestChatList(request) = next_command(&mut peer).await else {
        panic!("first command must request the chat list");
    };
    assert_eq!((request.offset, request.limit), (0, 20));
}

#[tokio::test]
async fn live_messages_reach_known_chats_only() {
    let mut h = harness();
    let peer = logged_in(&mut h).await;

    push(&mut h, &peer, CHAT_LIST).await;
    push(
        &mut h,
        &peer,
        r#"{"type":"ClientReceiveMessage","data":{"chatID":"1","senderName":"eve68","content":"Hey!"}}"#,
    )
    .await;
    push(
        &mut h,
        &peer,
        r#"{"type":"ClientReceiveMessage","data":{"chatID":"99","senderName":"eve68","content":"lost"}}"#,
    )
    .await;

    let store = h.runtime.app().store();
    let messages = store.messages_for("1");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender_name, "eve68");
    assert_eq!(messages[0].content, "Hey!");
    assert!(!store.contains("99"));
}

#[tokio::test]
async fn selecting_a_chat_requests_history_then_sends() {
    let mut h = harness();
    let mut peer = logged_in(&mut h).await;
    push(&mut h, &peer, CHAT_LIST).await;

    h.runtime.select_chat(Some("1".into())).unwrap();
    let Command::RequestChatHistory(request) = next_command(&mut peer).await else {
        panic!("selection must request history");
    };
    assert_eq!((request.chat_id.as_str(), request.offset, request.limit), ("1", 0, 20));

    h.runtime.send_message("hello").unwrap();
    let Command::SendMessage(sent) = next_command(&mut peer).await else {
        panic!("send must produce a send command");
    };
    assert_eq!(sent.chat_id, "1");
    assert_eq!(sent.content, "hello");
    // Nothing local until the server echoes it
    assert!(h.runtime.app().store().messages_for("1").is_empty());
}

#[tokio::test]
async fn scripted_input_is_sent_and_quit_stops_driver() {
    let mut h = harness();
    let mut peer = logged_in(&mut h).await;
    push(&mut h, &peer, CHAT_LIST).await;
    h.runtime.select_chat(Some("1".into())).unwrap();
    let _history = next_command(&mut peer).await;

    h.script.send(Input::Send("from script".into())).unwrap();
    h.script.send(Input::Quit).unwrap();
    h.runtime.run().await.unwrap();

    let Command::SendMessage(sent) = next_command(&mut peer).await else {
        panic!("scripted line must be sent");
    };
    assert_eq!(sent.content, "from script");
    assert!(h.runtime.driver().stopped);
    assert!(h.runtime.driver().renders > 0);
}

#[tokio::test]
async fn chat_operations_require_login() {
    let mut h = harness();

    assert!(matches!(h.runtime.send_message("hi"), Err(RuntimeError::NotAuthenticated)));
    assert!(matches!(
        h.runtime.select_chat(Some("1".into())),
        Err(RuntimeError::NotAuthenticated)
    ));
    assert!(matches!(h.runtime.request_history(), Err(RuntimeError::NotAuthenticated)));
    assert!(matches!(h.runtime.run().await, Err(RuntimeError::NotAuthenticated)));
    assert!(matches!(h.runtime.reconnect().await, Err(RuntimeError::NotAuthenticated)));
    assert!(h.transport.attempts().is_empty());
}

#[tokio::test]
async fn logout_tears_everything_down() {
    let mut h = harness();
    let mut peer = logged_in(&mut h).await;
    push(&mut h, &peer, CHAT_LIST).await;
    assert_eq!(h.runtime.connection().handler_count(), 1);

    h.runtime.logout().await.unwrap();

    assert_eq!(peer.from_client.recv().await, None);
    assert!(!h.runtime.is_connected());
    assert_eq!(h.runtime.connection().handler_count(), 0);
    assert!(!h.runtime.app().store().is_initialized());
    assert!(!h.runtime.session().is_authenticated());
    assert_eq!(h.api.revoked(), vec!["token-u1-1".to_string()]);
    assert!(matches!(h.runtime.send_message("hi"), Err(RuntimeError::NotAuthenticated)));
}

#[tokio::test]
async fn failed_connect_keeps_login_and_allows_reconnect() {
    let mut h = harness();
    h.transport.refuse_connections(true);

    let outcome = h.runtime.login("alice@chatty.test", "secret").await.unwrap();

    assert!(matches!(outcome, LoginOutcome::Success { .. }));
    assert!(h.runtime.session().is_authenticated());
    assert!(!h.runtime.is_connected());
    assert!(h.runtime.app().status_message().is_some_and(|s| s.starts_with("Disconnected:")));

    h.transport.refuse_connections(false);
    assert!(h.runtime.reconnect().await.unwrap());

    let mut peer = h.peers.recv().await.unwrap();
    assert!(matches!(next_command(&mut peer).await, Command::RequestChatList(_)));
    assert_eq!(h.runtime.connection().handler_count(), 1);
}

#[tokio::test]
async fn reconnect_uses_fresh_credential() {
    let mut h = harness();
    let peer = logged_in(&mut h).await;
    drop(peer);

    assert!(h.runtime.reconnect().await.unwrap());

    let queries: Vec<_> =
        h.transport.attempts().iter().map(|url| url.query().map(str::to_string)).collect();
    assert_eq!(queries, [
        Some("access_token=token-u1-1".to_string()),
        Some("access_token=token-u1-2".to_string())
    ]);
    assert_eq!(h.runtime.session().current_credential(), Some("token-u1-2"));
}

#[tokio::test]
async fn reconnect_falls_back_when_refresh_fails() {
    let mut h = harness();
    let peer = logged_in(&mut h).await;
    drop(peer);
    h.api.set_unavailable(true);

    assert!(h.runtime.reconnect().await.unwrap());

    let attempts = h.transport.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].query(), Some("access_token=token-u1-1"));
    assert!(h.runtime.session().is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn lost_link_is_reported() {
    let mut h = harness();
    let peer = logged_in(&mut h).await;

    drop(peer);
    let quit = h.runtime.step().await.unwrap();

    assert!(!quit);
    assert!(!h.runtime.is_connected());
    assert_eq!(h.runtime.app().connection_state(), &ConnectionState::Disconnected);
    assert_eq!(h.runtime.app().status_message(), Some("Disconnected: connection lost"));
}

#[tokio::test]
async fn server_error_reply_becomes_status() {
    let mut h = harness();
    let peer = logged_in(&mut h).await;

    push(&mut h, &peer, r#"{"type":"","data":null,"error":"messageprocessor: cannot get chat"}"#)
        .await;

    assert_eq!(
        h.runtime.app().status_message(),
        Some("Error: messageprocessor: cannot get chat")
    );
}
