//! Tizen Remote - Remote control for Samsung smart TVs.
//!
//! This library drives a TV over its remote-control WebSocket: it pairs with
//! the TV, sends remote keys, lists installed apps and launches them.
//!
//! # Architecture
//!
//! The client follows a request/response model over a single socket:
//!
//! - **Local End (Rust)**: Sends one command at a time, waits for its event
//! - **Remote End (TV)**: Answers with `{event, data}` frames
//!
//! Key design principles:
//!
//! - Each [`RemoteClient`] owns: one WebSocket connection + event loop
//! - At most one command is outstanding; a second one fails fast
//! - Key presses have no acknowledgment and resolve after a short grace delay
//! - Tokens issued by the TV are cached per device to skip the on-screen prompt
//!
//! # Quick Start
//!
//! ```no_run
//! use tizen_remote::{DeviceConfig, RemoteClient, RemoteKey, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = DeviceConfig::builder()
//!         .host("192.168.1.20")
//!         .name("Living Room Remote")
//!         .cache_tokens()
//!         .build()?;
//!
//!     // Accept the prompt on the TV the first time
//!     let client = RemoteClient::connect(config).await?;
//!
//!     client.send_key(RemoteKey::Menu).await?;
//!     client.launch_app_by_id("3201907018807").await?;
//!
//!     client.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`device`] | Configuration, metadata, token cache, key catalog |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types and protocol variants |
//! | [`remote`] | [`RemoteClient`] and session state |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Device configuration, metadata, tokens and keys.
///
/// Use [`DeviceConfig::builder()`] to describe a TV.
pub mod device;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for devices and apps.
pub mod identifiers;

/// Remote-control protocol message types.
///
/// Frames, metadata document and protocol profiles.
pub mod protocol;

/// Remote-control session.
pub mod remote;

/// WebSocket transport layer.
///
/// Internal module handling the socket and the command slot.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Device types
pub use device::{
    DeviceConfig, DeviceConfigBuilder, FileTokenStore, MemoryTokenStore, MetadataFetcher,
    RemoteKey, TokenCache, TokenStore,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{AppId, DeviceId};

// Protocol types
pub use protocol::{DeviceMetadata, KeyAction, LaunchAction, ProtocolProfile, ProtocolSelection};

// Session types
pub use remote::{InstalledApp, RemoteClient, SessionState};
