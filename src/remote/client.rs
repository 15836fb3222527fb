//! Remote-control session with a TV.
//!
//! Each [`RemoteClient`] owns:
//! - One WebSocket connection and its event loop
//! - The metadata document fetched when connecting
//! - The protocol profile chosen for the device
//!
//! # Example
//!
//! ```no_run
//! use tizen_remote::{DeviceConfig, RemoteClient, RemoteKey};
//!
//! # async fn example() -> tizen_remote::Result<()> {
//! let config = DeviceConfig::builder()
//!     .host("192.168.1.20")
//!     .name("Living Room Remote")
//!     .cache_tokens()
//!     .build()?;
//!
//! let client = RemoteClient::connect(config).await?;
//! client.send_key(RemoteKey::Home).await?;
//!
//! for app in client.get_installed_apps().await? {
//!     println!("{} {:?}", app.app_id, app.name);
//! }
//!
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::device::{DeviceConfig, FileTokenStore, MetadataFetcher, RemoteKey, TokenStore};
use crate::error::{Error, Result};
use crate::protocol::{Command, DeviceMetadata, InboundEvent, KeyAction, ProtocolProfile};
use crate::transport::{Connection, Reply, TokenHandler, open_socket};

use super::app::InstalledApp;

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle of a session.
///
/// ```text
/// Connecting ──► Authenticating ──► Ready ──► Closed
///      │                │
///      └────────────────┴──► Failed
/// ```
///
/// A [`RemoteClient`] is only handed out once `Ready`, so callers observe
/// `Ready` or `Closed`. The other states appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Fetching metadata and opening the socket.
    Connecting,
    /// Socket open, waiting for the handshake acknowledgment.
    Authenticating,
    /// Handshake complete, commands accepted.
    Ready,
    /// Socket closed.
    Closed,
    /// Connecting failed.
    Failed,
}

/// Records a state change.
fn transition(state: &mut SessionState, next: SessionState, host: &str) {
    debug!(host, from = ?*state, to = ?next, "Session state changed");
    *state = next;
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a client.
struct ClientInner {
    /// TV address.
    host: String,
    /// Metadata fetched while connecting.
    metadata: DeviceMetadata,
    /// Protocol variant in use.
    profile: ProtocolProfile,
    /// Open connection, cleared on disconnect.
    connection: Mutex<Option<Connection>>,
}

// ============================================================================
// RemoteClient
// ============================================================================

/// A connected remote-control session.
///
/// Cloning is cheap; clones share the session. Only one command runs at a
/// time: a second call while one is pending fails with
/// [`Error::CommandInProgress`].
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<ClientInner>,
}

// ============================================================================
// RemoteClient - Display
// ============================================================================

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("host", &self.inner.host)
            .field("device_id", &self.inner.metadata.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RemoteClient - Connect
// ============================================================================

impl RemoteClient {
    /// Connects to the TV described by `config`.
    ///
    /// Tokens are cached according to [`DeviceConfig::token_cache`].
    ///
    /// # Errors
    ///
    /// See [`connect_with_store`](Self::connect_with_store).
    pub async fn connect(config: DeviceConfig) -> Result<Self> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::from_config(config.token_cache()));
        Self::connect_with_store(config, store).await
    }

    /// Connects to the TV described by `config`, caching tokens in `store`.
    ///
    /// Fetches the metadata, picks the protocol profile, resolves a token
    /// (explicit, then cached), opens the socket and waits for the TV to
    /// acknowledge the connection. A token in the acknowledgment is saved
    /// before this returns.
    ///
    /// # Errors
    ///
    /// - [`Error::MetadataFetch`] if the TV does not answer; no socket is opened
    /// - [`Error::Connection`] if the socket cannot be opened
    /// - [`Error::AuthorizationRequired`] if the TV refused access
    /// - [`Error::ConnectionClosed`] if the socket closed during the handshake
    pub async fn connect_with_store(config: DeviceConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let mut state = SessionState::Connecting;
        debug!(host = config.host(), state = ?state, "Session state changed");

        match Self::open_session(&config, store, &mut state).await {
            Ok(client) => {
                transition(&mut state, SessionState::Ready, config.host());
                info!(
                    host = config.host(),
                    device_id = %client.inner.metadata.id,
                    token_auth = client.inner.profile.token_auth,
                    "Connected to TV"
                );
                Ok(client)
            }
            Err(e) => {
                transition(&mut state, SessionState::Failed, config.host());
                warn!(host = config.host(), error = %e, "Connection to TV failed");
                Err(e)
            }
        }
    }

    /// Runs the connect sequence up to the handshake acknowledgment.
    async fn open_session(
        config: &DeviceConfig,
        store: Arc<dyn TokenStore>,
        state: &mut SessionState,
    ) -> Result<Self> {
        let host = config.host();

        let fetcher = MetadataFetcher::new()?;
        let metadata = fetcher
            .fetch(host, &config.protocol().metadata_profile())
            .await?;

        let profile = config.protocol().resolve(&metadata);
        debug!(
            host,
            token_auth = profile.token_auth,
            tls = profile.socket_security.is_tls(),
            port = profile.socket_port,
            "Protocol profile selected"
        );

        let token = Self::resolve_token(config, store.as_ref(), &metadata).await;

        let url = profile.socket_url(host, config.name(), token.as_deref())?;
        let stream = open_socket(&url, profile.socket_security).await?;

        let on_token = Self::token_handler(Arc::clone(&store), &metadata, host);
        let (connection, handshake) =
            Connection::establish(stream, profile.events.clone(), Some(on_token))?;

        transition(state, SessionState::Authenticating, host);

        if let Err(e) = Connection::wait_connected(handshake).await {
            connection.shutdown();
            return Err(e);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                host: host.to_string(),
                metadata,
                profile,
                connection: Mutex::new(Some(connection)),
            }),
        })
    }

    /// Picks the token to present: explicit, then cached, then none.
    ///
    /// A resolved token is saved again to refresh its cache entry.
    async fn resolve_token(
        config: &DeviceConfig,
        store: &dyn TokenStore,
        metadata: &DeviceMetadata,
    ) -> Option<String> {
        let token = match config.token() {
            Some(token) => Some(token.to_string()),
            None => match store.retrieve_token(&metadata.id).await {
                Ok(token) => token,
                Err(e) => {
                    warn!(device_id = %metadata.id, error = %e, "Failed to read token cache");
                    None
                }
            },
        };

        match &token {
            Some(token) => {
                if let Err(e) = store.save_token(&metadata.id, token, config.host()).await {
                    warn!(device_id = %metadata.id, error = %e, "Failed to save token");
                }
            }
            None => {
                warn!(
                    host = config.host(),
                    "No token supplied. Accept the connection on the TV"
                );
            }
        }

        token
    }

    /// Builds the callback saving a token from the handshake acknowledgment.
    fn token_handler(store: Arc<dyn TokenStore>, metadata: &DeviceMetadata, host: &str) -> TokenHandler {
        let device_id = metadata.id.clone();
        let host = host.to_string();

        Arc::new(move |token: String| -> BoxFuture<'static, ()> {
            let store = Arc::clone(&store);
            let device_id = device_id.clone();
            let host = host.clone();

            Box::pin(async move {
                match store.save_token(&device_id, &token, &host).await {
                    Ok(()) => debug!(device_id = %device_id, "Token from TV saved"),
                    Err(e) => warn!(device_id = %device_id, error = %e, "Failed to save token"),
                }
            })
        })
    }
}

// ============================================================================
// RemoteClient - Accessors
// ============================================================================

impl RemoteClient {
    /// Returns the TV address.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Returns the metadata fetched while connecting.
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &DeviceMetadata {
        &self.inner.metadata
    }

    /// Returns the protocol profile in use.
    #[inline]
    #[must_use]
    pub fn profile(&self) -> &ProtocolProfile {
        &self.inner.profile
    }

    /// Returns the session state.
    ///
    /// `Closed` after [`disconnect`](Self::disconnect) or once the TV closed
    /// the socket.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match &*self.inner.connection.lock() {
            Some(connection) if !connection.is_closed() => SessionState::Ready,
            _ => SessionState::Closed,
        }
    }

    /// Returns `true` while a command is waiting for its outcome.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner
            .connection
            .lock()
            .as_ref()
            .is_some_and(Connection::is_busy)
    }

    /// Returns the open connection.
    fn connection(&self) -> Result<Connection> {
        self.inner.connection.lock().clone().ok_or(Error::NotConnected)
    }
}

// ============================================================================
// RemoteClient - Keys
// ============================================================================

impl RemoteClient {
    /// Clicks a remote key.
    ///
    /// Resolves [`KEY_PRESS_GRACE`](crate::transport::KEY_PRESS_GRACE)
    /// after the frame was written; the TV does not acknowledge key presses.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] after [`disconnect`](Self::disconnect)
    /// - [`Error::CommandInProgress`] if another command is pending
    /// - [`Error::ConnectionClosed`] if the socket closes first
    pub async fn send_key(&self, key: RemoteKey) -> Result<()> {
        self.send_key_action(key, KeyAction::Click).await
    }

    /// Clicks a key by its raw code, e.g. `"KEY_MENU"`.
    ///
    /// # Errors
    ///
    /// See [`send_key`](Self::send_key).
    pub async fn send_key_code(&self, code: &str) -> Result<()> {
        self.press(code, KeyAction::Click).await
    }

    /// Clicks, presses or releases a remote key.
    ///
    /// A `Press` must be followed by a `Release` for the TV to stop
    /// repeating the key.
    ///
    /// # Errors
    ///
    /// See [`send_key`](Self::send_key).
    pub async fn send_key_action(&self, key: RemoteKey, action: KeyAction) -> Result<()> {
        self.press(key.code(), action).await
    }

    /// Sends a key frame.
    async fn press(&self, code: &str, action: KeyAction) -> Result<()> {
        let connection = self.connection()?;

        debug!(host = %self.inner.host, key = code, ?action, "Sending key");
        connection.send(&Command::key(code, action), false).await?;
        Ok(())
    }
}

// ============================================================================
// RemoteClient - Apps
// ============================================================================

impl RemoteClient {
    /// Lists the apps installed on the TV.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] after [`disconnect`](Self::disconnect)
    /// - [`Error::CommandInProgress`] if another command is pending
    /// - [`Error::Protocol`] if the TV answers with another event
    pub async fn get_installed_apps(&self) -> Result<Vec<InstalledApp>> {
        let connection = self.connection()?;
        let command = Command::emit(self.inner.profile.events.installed_apps.clone());

        match connection.send(&command, true).await? {
            Some(InboundEvent::InstalledApps(apps)) => {
                debug!(count = apps.len(), "Installed apps received");
                Ok(apps.into_iter().map(InstalledApp::from).collect())
            }
            other => Err(unexpected_reply("installed app list", &other)),
        }
    }

    /// Launches an installed app.
    ///
    /// Fetches the app list first to choose the launch action.
    ///
    /// # Errors
    ///
    /// - [`Error::AppNotFound`] if no installed app has this id; nothing is
    ///   sent to launch it
    /// - [`Error::LaunchFailed`] if the TV answers with a status other than 200
    /// - any error of [`get_installed_apps`](Self::get_installed_apps)
    pub async fn launch_app_by_id(&self, app_id: &str) -> Result<()> {
        let apps = self.get_installed_apps().await?;

        let app = apps
            .into_iter()
            .find(|app| app.app_id == *app_id)
            .ok_or_else(|| Error::app_not_found(app_id))?;

        let action = app.launch_action();
        let command = Command::launch(self.inner.profile.events.launch_app.clone(), &app.app_id, action);
        let connection = self.connection()?;

        debug!(app_id = %app.app_id, ?action, "Launching app");

        match connection.send(&command, true).await? {
            Some(InboundEvent::LaunchResult(status)) if status.as_u64() == Some(200) => {
                info!(app_id = %app.app_id, "App launched");
                Ok(())
            }
            Some(InboundEvent::LaunchResult(status)) => Err(Error::launch_failed(status.to_string())),
            other => Err(unexpected_reply("launch result", &other)),
        }
    }
}

/// Describes a reply of the wrong kind.
fn unexpected_reply(expected: &str, reply: &Reply) -> Error {
    let actual = reply.as_ref().map_or("no reply", InboundEvent::kind);
    Error::protocol(format!("Expected {expected}, got {actual}"))
}

// ============================================================================
// RemoteClient - Disconnect
// ============================================================================

impl RemoteClient {
    /// Closes the socket.
    ///
    /// A pending command fails with [`Error::ConnectionClosed`]; later
    /// commands fail with [`Error::NotConnected`]. Calling this again does
    /// nothing.
    pub fn disconnect(&self) {
        let connection = self.inner.connection.lock().take();

        match connection {
            Some(connection) => {
                connection.shutdown();
                info!(host = %self.inner.host, "Disconnected from TV");
            }
            None => debug!(host = %self.inner.host, "Already disconnected"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
