// Shared primitives for one-time server bootstrapping across integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use futures::{SinkExt, StreamExt};
use laserstrike_server::domain::{Detection, Detector, DetectorError, ShotImage};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Base URL published once the server thread has bound its listener.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

/// Detector stand-in: the decoded image bytes name the target it "sees".
struct EchoDetector;

#[async_trait]
impl Detector for EchoDetector {
    async fn detect(
        &self,
        image: &ShotImage,
        valid_targets: &[String],
    ) -> Result<Option<Detection>, DetectorError> {
        let seen = String::from_utf8_lossy(image.bytes()).to_string();
        Ok(valid_targets.contains(&seen).then(|| Detection {
            target_id: seen,
            distance: 4.2,
        }))
    }
}

/// Builds a shot image that the test detector resolves to `target_id`.
pub fn image_of(target_id: &str) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(target_id)
    )
}

pub fn unique_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // The server outlives individual `#[tokio::test]` runtimes on its own thread.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                let state = laserstrike_server::build_state(Arc::new(EchoDetector));
                laserstrike_server::serve(listener, state)
                    .await
                    .expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

pub fn ws_url(player_id: &str) -> String {
    let base = ensure_server();
    let host = base
        .strip_prefix("http://")
        .expect("base url should use http://");
    format!("ws://{host}/ws/{player_id}")
}

/// Opens a player channel and waits until the server has registered it.
///
/// The handshake can complete before the channel is tracked, so an empty shot is
/// sent and its rejection awaited; the reply only comes from a running channel.
pub async fn open_socket(player_id: &str) -> Socket {
    let (mut socket, _) = connect_async(ws_url(player_id))
        .await
        .expect("websocket should connect");
    socket
        .send(Message::Text(r#"{"requestId":"sync"}"#.into()))
        .await
        .expect("send should succeed");
    next_matching(&mut socket, |v| v["requestId"] == "sync").await;
    socket
}

// Other tests share this server, so skip frames that are not ours.
pub async fn next_matching(socket: &mut Socket, matches: impl Fn(&Value) -> bool) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = socket
                .next()
                .await
                .expect("socket should stay open")
                .expect("frame should be readable");
            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(text.as_str()).expect("json frame");
                if matches(&value) {
                    return value;
                }
            }
        }
    })
    .await
    .expect("expected message before timeout")
}

/// Reads until the server's close frame and returns its reason.
pub async fn close_reason(socket: &mut Socket) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|f| f.reason.as_str().to_string());
                }
                Some(Ok(_)) => continue,
                _ => break None,
            }
        }
    })
    .await
    .expect("expected close before timeout")
}

pub async fn register(client: &reqwest::Client, id: &str, name: &str) -> serde_json::Value {
    let res = client
        .post(format!("{}/users", ensure_server()))
        .json(&serde_json::json!({ "id": id, "name": name }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    res.json().await.expect("json body")
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // Retry briefly to avoid racing the server's bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
