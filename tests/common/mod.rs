//! Fake TV shared by the integration tests.
//!
//! Serves the metadata document with `wiremock` and the remote-control
//! channel with a plain `tokio-tungstenite` server on loopback.

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tizen_remote::protocol::Security;
use tizen_remote::{DeviceConfigBuilder, DeviceId, ProtocolProfile, ProtocolSelection};

// ============================================================================
// Constants
// ============================================================================

/// Device id served in the default metadata document.
pub const DEVICE_ID: &str = "uuid:5b5e3a3c-8d59-4f0b-9c2e-7e2c9f1b5a11";

/// Client name used by the tests.
pub const CLIENT_NAME: &str = "Test Remote";

/// How long a test waits for the fake TV to see a frame.
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

/// What the fake TV does in answer to a frame.
#[derive(Debug, Clone)]
pub enum Action {
    /// Send a text frame.
    Send(Value),
    /// Close the socket.
    Close,
}

/// Maps a received frame to the fake TV's actions.
pub type Responder = Arc<dyn Fn(&Value) -> Vec<Action> + Send + Sync>;

/// Behavior of a fake TV.
pub struct Setup {
    /// Status of the metadata endpoint.
    pub metadata_status: u16,
    /// Metadata document.
    pub metadata: Value,
    /// Actions run as soon as a socket is accepted.
    pub greeting: Vec<Action>,
    /// Answers to client frames.
    pub responder: Responder,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            metadata_status: 200,
            metadata: metadata_document(),
            greeting: vec![Action::Send(connect_event(None))],
            responder: silent(),
        }
    }
}

// ============================================================================
// FakeTv
// ============================================================================

/// A running fake TV.
pub struct FakeTv {
    metadata_server: MockServer,
    socket_port: u16,
    request_uri: Arc<Mutex<Option<String>>>,
    connections: Arc<AtomicUsize>,
    frames: mpsc::UnboundedReceiver<Value>,
}

impl FakeTv {
    /// Starts a fake TV that accepts the handshake and never answers.
    pub async fn start() -> Self {
        Self::start_with(Setup::default()).await
    }

    /// Starts a fake TV with the given behavior.
    pub async fn start_with(setup: Setup) -> Self {
        init_tracing();

        let metadata_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/"))
            .respond_with(
                ResponseTemplate::new(setup.metadata_status).set_body_json(setup.metadata.clone()),
            )
            .mount(&metadata_server)
            .await;

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind socket");
        let socket_port = listener.local_addr().expect("local addr").port();

        let request_uri = Arc::new(Mutex::new(None));
        let connections = Arc::new(AtomicUsize::new(0));
        let (frames_tx, frames) = mpsc::unbounded_channel();

        tokio::spawn(accept_loop(
            listener,
            setup.greeting,
            setup.responder,
            Arc::clone(&request_uri),
            Arc::clone(&connections),
            frames_tx,
        ));

        Self {
            metadata_server,
            socket_port,
            request_uri,
            connections,
            frames,
        }
    }

    /// Returns a profile pointing at this fake TV.
    pub fn profile(&self) -> ProtocolProfile {
        ProtocolProfile {
            metadata_port: self.metadata_server.address().port(),
            socket_security: Security::Plain,
            socket_port: self.socket_port,
            ..ProtocolProfile::token_auth()
        }
    }

    /// Returns a config builder for this fake TV.
    pub fn config(&self) -> DeviceConfigBuilder {
        tizen_remote::DeviceConfig::builder()
            .host("127.0.0.1")
            .name(CLIENT_NAME)
            .protocol(ProtocolSelection::Fixed(self.profile()))
    }

    /// Returns the request URI of the last accepted socket.
    pub fn request_uri(&self) -> Option<String> {
        self.request_uri.lock().clone()
    }

    /// Returns how many sockets were accepted.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Waits for the next frame sent by the client.
    pub async fn next_frame(&mut self) -> Value {
        tokio::time::timeout(FRAME_TIMEOUT, self.frames.recv())
            .await
            .expect("frame within timeout")
            .expect("fake TV running")
    }

    /// Returns a frame already received, if any.
    pub fn try_frame(&mut self) -> Option<Value> {
        self.frames.try_recv().ok()
    }
}

/// Accepts sockets until the test ends.
async fn accept_loop(
    listener: TcpListener,
    greeting: Vec<Action>,
    responder: Responder,
    request_uri: Arc<Mutex<Option<String>>>,
    connections: Arc<AtomicUsize>,
    frames_tx: mpsc::UnboundedSender<Value>,
) {
    while let Ok((stream, _)) = listener.accept().await {
        let uri = Arc::clone(&request_uri);
        let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            *uri.lock() = Some(request.uri().to_string());
            Ok(response)
        };

        let Ok(socket) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
            continue;
        };
        connections.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(serve(
            socket,
            greeting.clone(),
            Arc::clone(&responder),
            frames_tx.clone(),
        ));
    }
}

/// Runs one socket.
async fn serve(
    socket: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    greeting: Vec<Action>,
    responder: Responder,
    frames_tx: mpsc::UnboundedSender<Value>,
) {
    let (mut write, mut read) = socket.split();

    for action in greeting {
        match action {
            Action::Send(frame) => {
                let _ = write.send(Message::Text(frame.to_string().into())).await;
            }
            Action::Close => {
                let _ = write.close().await;
                return;
            }
        }
    }

    while let Some(Ok(message)) = read.next().await {
        let Message::Text(text) = message else {
            continue;
        };

        let frame: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let _ = frames_tx.send(frame.clone());

        for action in responder(&frame) {
            match action {
                Action::Send(reply) => {
                    let _ = write.send(Message::Text(reply.to_string().into())).await;
                }
                Action::Close => {
                    let _ = write.close().await;
                    return;
                }
            }
        }
    }
}

// ============================================================================
// Responders
// ============================================================================

/// Never answers.
pub fn silent() -> Responder {
    Arc::new(|_: &Value| Vec::<Action>::new())
}

/// Answers emitted events by name.
pub fn on_event<F>(answer: F) -> Responder
where
    F: Fn(&str, &Value) -> Vec<Action> + Send + Sync + 'static,
{
    Arc::new(move |frame: &Value| match frame["params"]["event"].as_str() {
        Some(event) => answer(event, frame),
        None => Vec::new(),
    })
}

// ============================================================================
// Frames
// ============================================================================

/// Default metadata document.
pub fn metadata_document() -> Value {
    json!({
        "id": DEVICE_ID,
        "name": "[TV] Samsung 7 Series (55)",
        "version": "2.0.25",
        "type": "Samsung SmartTV",
        "device": {
            "modelName": "UE55RU7400",
            "TokenAuthSupport": "true",
            "PowerState": "on"
        }
    })
}

/// Handshake acknowledgment.
pub fn connect_event(token: Option<&str>) -> Value {
    let mut data = json!({ "id": "client-1", "clients": [] });
    if let Some(token) = token {
        data["token"] = json!(token);
    }
    json!({ "event": "ms.channel.connect", "data": data })
}

/// Access refusal.
pub fn unauthorized_event() -> Value {
    json!({ "event": "ms.channel.unauthorized" })
}

/// Installed app list.
pub fn app_list_event(apps: &[(&str, u32, &str)]) -> Value {
    let data: Vec<Value> = apps
        .iter()
        .map(|(id, app_type, name)| json!({ "appId": id, "app_type": app_type, "name": name }))
        .collect();
    json!({ "event": "ed.installedApp.get", "data": { "data": data } })
}

/// Launch outcome.
pub fn launch_event(status: Value) -> Value {
    json!({ "event": "ed.apps.launch", "data": status })
}

/// Device id of the default metadata document.
pub fn device_id() -> DeviceId {
    DeviceId::from(DEVICE_ID)
}

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber once; filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
