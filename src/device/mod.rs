//! Device-side concerns: configuration, metadata, tokens and keys.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`DeviceConfig`] and its builder |
//! | `key` | [`RemoteKey`] catalog |
//! | `metadata` | [`MetadataFetcher`] |
//! | `token` | [`TokenStore`] and its implementations |

// ============================================================================
// Submodules
// ============================================================================

/// Device configuration and builder.
pub mod config;

/// Remote key catalog.
pub mod key;

/// Device metadata retrieval.
pub mod metadata;

/// Authorization token cache.
pub mod token;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{DeviceConfig, DeviceConfigBuilder, TokenCache};
pub use key::RemoteKey;
pub use metadata::MetadataFetcher;
pub use token::{
    DEFAULT_CACHE_LOCATION, FileTokenStore, MemoryTokenStore, TokenCacheEntry, TokenCacheFile,
    TokenStore,
};
