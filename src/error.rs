//! Error types for the TV remote client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use tizen_remote::{RemoteClient, RemoteKey, Result};
//!
//! async fn example(client: &RemoteClient) -> Result<()> {
//!     client.send_key(RemoteKey::Menu).await?;
//!     client.launch_app_by_id("111299001912").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Device | [`Error::MetadataFetch`], [`Error::AuthorizationRequired`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Command | [`Error::CommandInProgress`], [`Error::Protocol`] |
//! | Application | [`Error::AppNotFound`], [`Error::LaunchFailed`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::AppId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant carries enough context to tell an offline device apart from
/// one that needs on-screen approval or one that rejected a request.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the device configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// Device metadata could not be fetched.
    ///
    /// Returned when the HTTP metadata request fails or answers with a
    /// non-200 status. Usually means the TV is off or the address is wrong.
    #[error("Metadata request failed: {message}. Try restarting the TV and checking its IP address")]
    MetadataFetch {
        /// Description of the underlying failure.
        message: String,
    },

    /// The TV refused access to its remote API.
    ///
    /// Returned when the TV answers with an unauthorized event. The prompt
    /// shown on the TV must be accepted before reconnecting.
    #[error("Not authorised to access the TV API. Accept the on-screen prompt on the TV")]
    AuthorizationRequired,

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the socket cannot be opened or a frame cannot be written.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed.
    ///
    /// Returned to a pending command when the socket closes under it.
    #[error("Connection closed")]
    ConnectionClosed,

    /// No socket is open.
    ///
    /// Returned when a command is issued after [`disconnect`](crate::RemoteClient::disconnect).
    #[error("Not connected to TV. Call connect() first")]
    NotConnected,

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// Another command is still waiting for its response.
    ///
    /// The protocol has no correlation identifiers, so only one command may
    /// be in flight per connection.
    #[error("Command already in progress")]
    CommandInProgress,

    /// Unexpected or malformed message from the TV.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Application Errors
    // ========================================================================
    /// No installed app with the requested id.
    #[error("No app found with ID \"{app_id}\". Is it installed?")]
    AppNotFound {
        /// The requested app id.
        app_id: AppId,
    },

    /// The TV answered a launch request with a non-success status.
    #[error("Failed to launch app: {status}")]
    LaunchFailed {
        /// Status payload returned by the TV.
        status: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a metadata fetch error.
    #[inline]
    pub fn metadata_fetch(message: impl Into<String>) -> Self {
        Self::MetadataFetch {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an app not found error.
    #[inline]
    pub fn app_not_found(app_id: impl Into<AppId>) -> Self {
        Self::AppNotFound {
            app_id: app_id.into(),
        }
    }

    /// Creates a launch failed error.
    #[inline]
    pub fn launch_failed(status: impl Into<String>) -> Self {
        Self::LaunchFailed {
            status: status.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::WebSocket(_)
                | Self::ChannelClosed(_)
        )
    }

    /// Returns `true` if the TV is waiting for the user to approve access.
    #[inline]
    #[must_use]
    pub fn needs_authorization(&self) -> bool {
        matches!(self, Self::AuthorizationRequired)
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the call is repeated, possibly
    /// after reconnecting.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CommandInProgress
                | Self::AuthorizationRequired
                | Self::MetadataFetch { .. }
                | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
