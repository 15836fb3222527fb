//! Remote-control session: the public client surface.
//!
//! This module contains:
//!
//! - [`RemoteClient`] - Connected session with the TV
//! - [`SessionState`] - Session lifecycle
//! - [`InstalledApp`] - App reported by the TV

// ============================================================================
// Submodules
// ============================================================================

/// Installed application model.
pub mod app;

/// Remote-control session.
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use app::InstalledApp;
pub use client::{RemoteClient, SessionState};
