//! Device configuration.
//!
//! Provides a fluent API for describing the TV to connect to.
//!
//! # Example
//!
//! ```no_run
//! use tizen_remote::DeviceConfig;
//!
//! # fn example() -> tizen_remote::Result<()> {
//! let config = DeviceConfig::builder()
//!     .host("192.168.1.20")
//!     .name("Living Room Remote")
//!     .cache_tokens()
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::protocol::{ProtocolProfile, ProtocolSelection};

use super::token::DEFAULT_CACHE_LOCATION;

// ============================================================================
// TokenCache
// ============================================================================

/// Whether tokens are cached between connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenCache {
    /// Tokens are neither read from nor written to disk.
    #[default]
    Disabled,
    /// Tokens are cached in a JSON file.
    Enabled {
        /// Cache file path.
        location: PathBuf,
    },
}

impl TokenCache {
    /// Caching at the default location.
    #[must_use]
    pub fn default_location() -> Self {
        Self::Enabled {
            location: PathBuf::from(DEFAULT_CACHE_LOCATION),
        }
    }

    /// Returns `true` if caching is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }
}

// ============================================================================
// DeviceConfig
// ============================================================================

/// Immutable description of a TV and how to authenticate with it.
///
/// Use [`DeviceConfig::builder()`] to create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    host: String,
    name: String,
    token: Option<String>,
    token_cache: TokenCache,
    protocol: ProtocolSelection,
}

impl DeviceConfig {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::new()
    }

    /// Returns the TV address.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the client name shown on the TV's approval prompt.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the explicitly configured token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the token cache setting.
    #[inline]
    #[must_use]
    pub fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    /// Returns how the protocol variant is chosen.
    #[inline]
    #[must_use]
    pub fn protocol(&self) -> &ProtocolSelection {
        &self.protocol
    }
}

// ============================================================================
// DeviceConfigBuilder
// ============================================================================

/// Builder for a [`DeviceConfig`].
#[derive(Debug, Default, Clone)]
pub struct DeviceConfigBuilder {
    /// TV address.
    host: Option<String>,
    /// Client name.
    name: Option<String>,
    /// Explicit token.
    token: Option<String>,
    /// Token cache setting.
    token_cache: TokenCache,
    /// Protocol selection.
    protocol: ProtocolSelection,
}

impl DeviceConfigBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TV address (IP or hostname).
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the client name shown on the TV's approval prompt.
    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a token obtained earlier. Takes precedence over the cache.
    #[inline]
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Enables token caching at the default location.
    #[inline]
    #[must_use]
    pub fn cache_tokens(mut self) -> Self {
        self.token_cache = TokenCache::default_location();
        self
    }

    /// Enables token caching at `path`.
    #[inline]
    #[must_use]
    pub fn cache_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache = TokenCache::Enabled {
            location: path.into(),
        };
        self
    }

    /// Sets the token cache directly.
    #[inline]
    #[must_use]
    pub fn token_cache(mut self, cache: TokenCache) -> Self {
        self.token_cache = cache;
        self
    }

    /// Forces a protocol profile instead of choosing from capabilities.
    #[inline]
    #[must_use]
    pub fn profile(mut self, profile: ProtocolProfile) -> Self {
        self.protocol = ProtocolSelection::Fixed(profile);
        self
    }

    /// Sets the protocol selection directly.
    #[inline]
    #[must_use]
    pub fn protocol(mut self, protocol: ProtocolSelection) -> Self {
        self.protocol = protocol;
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if host or name is missing or blank
    pub fn build(self) -> Result<DeviceConfig> {
        let host = self.validate_host()?;
        let name = self.validate_name()?;

        Ok(DeviceConfig {
            host,
            name,
            token: self.token.filter(|t| !t.is_empty()),
            token_cache: self.token_cache,
            protocol: self.protocol,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DeviceConfigBuilder {
    /// Validates the host.
    fn validate_host(&self) -> Result<String> {
        let host = self.host.as_deref().map(str::trim).unwrap_or_default();

        if host.is_empty() {
            return Err(Error::config(
                "TV host is required. Use .host() to set it.\n\
                 Example: DeviceConfig::builder().host(\"192.168.1.20\")",
            ));
        }

        if host.contains(['/', ' ', '?', '#']) {
            return Err(Error::config(format!(
                "Invalid TV host: {host:?}. Expected an IP address or hostname."
            )));
        }

        Ok(host.to_string())
    }

    /// Validates the client name.
    fn validate_name(&self) -> Result<String> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();

        if name.is_empty() {
            return Err(Error::config(
                "Client name is required. Use .name() to set it.\n\
                 Example: DeviceConfig::builder().name(\"Living Room Remote\")",
            ));
        }

        Ok(name.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
