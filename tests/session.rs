use linechat::{ChannelListener, ChatClient, ChatEvent, ChatListener, ConnectionState, TextMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(3);

struct FakeServer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl FakeServer {
    async fn expect_line(&mut self) -> String {
        let mut line = String::new();
        timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for client line")
            .expect("read from client");
        line.trim_end().to_string()
    }

    async fn send(&mut self, line: &str) {
        self.send_raw(line.as_bytes()).await;
    }

    async fn send_raw(&mut self, line: &[u8]) {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }
}

async fn connected_client() -> (
    Arc<ChatClient>,
    mpsc::UnboundedReceiver<ChatEvent>,
    FakeServer,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (tx, rx) = mpsc::unbounded_channel();
    let client = Arc::new(ChatClient::new());
    client.add_listener(Arc::new(ChannelListener::new(tx)));

    let (connected, accepted) = tokio::join!(client.connect("127.0.0.1", port), listener.accept());
    assert!(connected);
    let (stream, _) = accepted.unwrap();
    let (reader, writer) = stream.into_split();
    let server = FakeServer {
        reader: BufReader::new(reader),
        writer,
    };
    (client, rx, server)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<ChatEvent>) -> ChatEvent {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_full_session() {
    let (client, mut rx, mut server) = connected_client().await;
    assert_eq!(client.connection_state(), ConnectionState::Connected);
    let reader = client.start_listening().expect("reader starts");

    assert_eq!(client.try_login("alice").await, Ok(true));
    assert_eq!(server.expect_line().await, "login alice");
    server.send("loginok").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::LoginResult {
            success: true,
            message: "loginok".into()
        }
    );

    assert_eq!(client.refresh_user_list().await, Ok(true));
    assert_eq!(server.expect_line().await, "users");
    server.send("users alice bob carol").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::UserList {
            usernames: vec!["alice".into(), "bob".into(), "carol".into()]
        }
    );

    // Unknown and malformed lines are skipped without ending the session
    server.send("weather sunny").await;
    server.send("").await;
    server.send("msgerr").await;
    server.send("msg root Hello world").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::MessageReceived(TextMessage {
            sender: "root".into(),
            is_private: false,
            body: "Hello world".into(),
        })
    );

    assert_eq!(client.send_private_message("bob", "hi there").await, Ok(true));
    assert_eq!(server.expect_line().await, "privmsg bob hi there");
    assert_eq!(client.send_public_message("hello all").await, Ok(true));
    assert_eq!(server.expect_line().await, "msg hello all");

    server.send("msgerr incorrect recipient").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::MessageError {
            text: "incorrect recipient".into()
        }
    );
    assert_eq!(client.last_error(), "incorrect recipient");

    assert_eq!(client.ask_supported_commands().await, Ok(true));
    assert_eq!(server.expect_line().await, "help");
    server.send("supported msg privmsg users help").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::SupportedCommands {
            commands: ["supported", "msg", "privmsg", "users", "help"]
                .map(String::from)
                .to_vec()
        }
    );

    drop(server);
    assert_eq!(next_event(&mut rx).await, ChatEvent::Disconnected);
    timeout(WAIT, reader).await.unwrap().unwrap();
    assert!(!client.is_connection_active());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_explicit_disconnect_stops_reader() {
    let (client, mut rx, _server) = connected_client().await;
    let reader = client.start_listening().expect("reader starts");
    assert!(client.start_listening().is_none());

    client.disconnect().await;
    client.disconnect().await;

    timeout(WAIT, reader).await.unwrap().unwrap();
    assert_eq!(next_event(&mut rx).await, ChatEvent::Disconnected);
    assert!(rx.try_recv().is_err());
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    assert_eq!(client.send_public_message("anyone?").await, Ok(false));
}

#[tokio::test]
async fn test_disconnect_racing_stream_error() {
    let (client, mut rx, server) = connected_client().await;
    let reader = client.start_listening().expect("reader starts");

    // Peer closes while the caller disconnects at the same time
    let caller = {
        let client = client.clone();
        tokio::spawn(async move { client.disconnect().await })
    };
    drop(server);
    caller.await.unwrap();

    timeout(WAIT, reader).await.unwrap().unwrap();
    assert_eq!(next_event(&mut rx).await, ChatEvent::Disconnected);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
    assert!(!client.is_connection_active());
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let (client, mut rx, _server) = connected_client().await;
    client.disconnect().await;
    assert_eq!(next_event(&mut rx).await, ChatEvent::Disconnected);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (connected, accepted) = tokio::join!(client.connect("127.0.0.1", port), listener.accept());
    assert!(connected);
    let (stream, _) = accepted.unwrap();
    let (reader, writer) = stream.into_split();
    let mut server = FakeServer {
        reader: BufReader::new(reader),
        writer,
    };

    let handle = client.start_listening().expect("reader starts again");
    server.send("loginerr username taken").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::LoginResult {
            success: false,
            message: "username taken".into()
        }
    );
    assert_eq!(client.last_error(), "username taken");

    client.disconnect().await;
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_removed_listener_gets_nothing() {
    let (client, mut rx, mut server) = connected_client().await;
    let (tx2, mut rx2) = mpsc::unbounded_channel();
    let second: Arc<dyn ChatListener> = Arc::new(ChannelListener::new(tx2));
    client.add_listener(second.clone());
    client.remove_listener(&second);

    let _reader = client.start_listening().expect("reader starts");
    server.send("cmderr unknown command").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::CommandError {
            text: "unknown command".into()
        }
    );
    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn test_invalid_utf8_does_not_end_session() {
    let (client, mut rx, mut server) = connected_client().await;
    let _reader = client.start_listening().expect("reader starts");

    server.send_raw(b"msg root caf\xe9").await;
    server.send("msg root still here").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::MessageReceived(TextMessage {
            sender: "root".into(),
            is_private: false,
            body: "caf\u{FFFD}".into(),
        })
    );
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::MessageReceived(TextMessage {
            sender: "root".into(),
            is_private: false,
            body: "still here".into(),
        })
    );
    assert!(client.is_connection_active());
}

#[tokio::test]
async fn test_oversized_line_is_skipped() {
    let (client, mut rx, mut server) = connected_client().await;
    let _reader = client.start_listening().expect("reader starts");

    let flood = format!("msg root {}", "a".repeat(linechat::MAX_LINE_LEN));
    server.send(&flood).await;
    server.send("msg root after the flood").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::MessageReceived(TextMessage {
            sender: "root".into(),
            is_private: false,
            body: "after the flood".into(),
        })
    );
    assert!(client.is_connection_active());
}

#[tokio::test]
async fn test_panicking_disconnect_listener_allows_restart() {
    struct PanicsOnDisconnect;
    impl ChatListener for PanicsOnDisconnect {
        fn on_disconnect(&self) {
            panic!("listener failure");
        }
    }

    let (client, mut rx, server) = connected_client().await;
    let exploding: Arc<dyn ChatListener> = Arc::new(PanicsOnDisconnect);
    client.add_listener(exploding.clone());
    let reader = client.start_listening().expect("reader starts");

    // The reader task fires on_disconnect when the peer goes away
    drop(server);
    assert_eq!(next_event(&mut rx).await, ChatEvent::Disconnected);
    timeout(WAIT, reader)
        .await
        .unwrap()
        .expect("reader task finishes cleanly");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (connected, accepted) = tokio::join!(client.connect("127.0.0.1", port), listener.accept());
    assert!(connected);
    let _stream = accepted.unwrap();
    let reader = client.start_listening().expect("reader starts again");

    // Foreground disconnect with the same listener must not unwind either
    client.disconnect().await;
    assert_eq!(next_event(&mut rx).await, ChatEvent::Disconnected);
    timeout(WAIT, reader).await.unwrap().unwrap();
    client.remove_listener(&exploding);
}
