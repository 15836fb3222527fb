//! Protocol variants.
//!
//! TVs speak one of two dialects of the same protocol:
//!
//! | Profile | Metadata | Socket | Token |
//! |---------|----------|--------|-------|
//! | [`ProtocolProfile::token_auth`] | `http://<ip>:8001/api/v2/` | `wss://<ip>:8002` | yes |
//! | [`ProtocolProfile::legacy`] | `http://<ip>:8001/api/v2/` | `ws://<ip>:8001` | no |
//!
//! [`ProtocolSelection::Auto`] picks one from the `TokenAuthSupport`
//! capability in the device metadata.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use url::Url;

use crate::error::{Error, Result};

use super::metadata::DeviceMetadata;

// ============================================================================
// Constants
// ============================================================================

/// Port of the HTTP metadata endpoint and the legacy socket.
pub const HTTP_PORT: u16 = 8001;

/// Port of the TLS socket.
pub const WSS_PORT: u16 = 8002;

/// Remote-control channel name.
pub const REMOTE_CONTROL_CHANNEL: &str = "samsung.remote.control";

/// Path of the metadata document.
const METADATA_PATH: &str = "/api/v2/";

// ============================================================================
// Security
// ============================================================================

/// Whether an endpoint is reached over TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Security {
    /// Plain TCP.
    Plain,
    /// TLS with certificate validation disabled (TVs use self-signed certs).
    Tls,
}

impl Security {
    /// Returns the HTTP scheme.
    #[inline]
    #[must_use]
    pub const fn http_scheme(self) -> &'static str {
        match self {
            Self::Plain => "http",
            Self::Tls => "https",
        }
    }

    /// Returns the WebSocket scheme.
    #[inline]
    #[must_use]
    pub const fn ws_scheme(self) -> &'static str {
        match self {
            Self::Plain => "ws",
            Self::Tls => "wss",
        }
    }

    /// Returns `true` for TLS.
    #[inline]
    #[must_use]
    pub const fn is_tls(self) -> bool {
        matches!(self, Self::Tls)
    }
}

// ============================================================================
// EventNames
// ============================================================================

/// Names of the inbound and emitted events a profile understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames {
    /// Access refused, approval needed on the TV.
    pub unauthorized: String,
    /// Handshake acknowledgment, may carry a token.
    pub connect: String,
    /// Installed app list request and response.
    pub installed_apps: String,
    /// App launch request and response.
    pub launch_app: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            unauthorized: "ms.channel.unauthorized".to_string(),
            connect: "ms.channel.connect".to_string(),
            installed_apps: "ed.installedApp.get".to_string(),
            launch_app: "ed.apps.launch".to_string(),
        }
    }
}

// ============================================================================
// ProtocolProfile
// ============================================================================

/// Endpoints and event names of one protocol variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolProfile {
    /// Metadata endpoint security.
    pub metadata_security: Security,
    /// Metadata endpoint port.
    pub metadata_port: u16,
    /// Socket security.
    pub socket_security: Security,
    /// Socket port.
    pub socket_port: u16,
    /// Channel path segment.
    pub channel: String,
    /// Event names.
    pub events: EventNames,
    /// Whether the socket URI carries a token.
    pub token_auth: bool,
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        Self::token_auth()
    }
}

impl ProtocolProfile {
    /// Profile of TVs that issue tokens (2018 and later).
    #[must_use]
    pub fn token_auth() -> Self {
        Self {
            metadata_security: Security::Plain,
            metadata_port: HTTP_PORT,
            socket_security: Security::Tls,
            socket_port: WSS_PORT,
            channel: REMOTE_CONTROL_CHANNEL.to_string(),
            events: EventNames::default(),
            token_auth: true,
        }
    }

    /// Profile of older TVs without token support.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            socket_security: Security::Plain,
            socket_port: HTTP_PORT,
            token_auth: false,
            ..Self::token_auth()
        }
    }

    /// Returns the metadata URL for `host`.
    #[must_use]
    pub fn metadata_url(&self, host: &str) -> String {
        format!(
            "{}://{}:{}{}",
            self.metadata_security.http_scheme(),
            host,
            self.metadata_port,
            METADATA_PATH
        )
    }

    /// Returns the socket URL for `host`.
    ///
    /// The client name is base64 encoded. The token is only included when
    /// this profile uses token authentication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the result is not a valid URL.
    pub fn socket_url(&self, host: &str, name: &str, token: Option<&str>) -> Result<Url> {
        let encoded_name = Base64Standard.encode(name);

        let mut raw = format!(
            "{}://{}:{}/api/v2/channels/{}?name={}",
            self.socket_security.ws_scheme(),
            host,
            self.socket_port,
            self.channel,
            urlencoding::encode(&encoded_name)
        );

        if self.token_auth
            && let Some(token) = token
        {
            raw.push_str("&token=");
            raw.push_str(&urlencoding::encode(token));
        }

        Url::parse(&raw).map_err(|e| Error::config(format!("Invalid socket URL {raw}: {e}")))
    }
}

// ============================================================================
// ProtocolSelection
// ============================================================================

/// How the protocol variant is chosen for a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProtocolSelection {
    /// Choose from the device's `TokenAuthSupport` capability.
    #[default]
    Auto,
    /// Always use the given profile.
    Fixed(ProtocolProfile),
}

impl ProtocolSelection {
    /// Returns the profile whose metadata endpoint is queried first.
    #[must_use]
    pub fn metadata_profile(&self) -> ProtocolProfile {
        match self {
            Self::Auto => ProtocolProfile::token_auth(),
            Self::Fixed(profile) => profile.clone(),
        }
    }

    /// Resolves the profile for a device.
    #[must_use]
    pub fn resolve(&self, metadata: &DeviceMetadata) -> ProtocolProfile {
        match self {
            Self::Fixed(profile) => profile.clone(),
            Self::Auto if metadata.supports_token_auth() => ProtocolProfile::token_auth(),
            Self::Auto => ProtocolProfile::legacy(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
