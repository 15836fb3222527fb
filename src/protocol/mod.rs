//! Remote-control protocol message types.
//!
//! This module defines the frames exchanged with the TV over the
//! remote-control channel, the metadata document fetched before the
//! handshake, and the profiles of the two protocol variants.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Command` | Local → TV | Key press or channel event |
//! | `InboundMessage` | TV → Local | Handshake, responses, notifications |
//! | `DeviceMetadata` | TV → Local (HTTP) | Identity and capabilities |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Outbound `{method, params}` frames |
//! | `event` | Inbound `{event, data}` frames |
//! | `metadata` | Device metadata document |
//! | `profile` | Protocol variants and endpoint URLs |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound command frames.
pub mod command;

/// Inbound message types.
pub mod event;

/// Device metadata document.
pub mod metadata;

/// Protocol variants.
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, EmitParams, KeyAction, LaunchAction, RemoteControlParams};
pub use event::{ConnectAck, InboundEvent, InboundMessage, RawApp};
pub use metadata::{DeviceInfo, DeviceMetadata};
pub use profile::{EventNames, ProtocolProfile, ProtocolSelection, Security};
