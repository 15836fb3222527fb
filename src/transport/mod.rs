//! WebSocket transport layer.
//!
//! This module handles communication between the Rust client and the TV's
//! remote-control channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  RemoteClient   │                              │  TV             │
//! │                 │         WebSocket            │                 │
//! │  Connection     │─────────────────────────────►│  remote.control │
//! │  + CommandSlot  │      <ip>:8002 (wss)         │  channel        │
//! │                 │      <ip>:8001 (ws)          │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `endpoint::open_socket` - Open the socket (TLS validation disabled)
//! 2. `Connection::establish` - Arm the handshake and start the event loop
//! 3. `Connection::wait_connected` - Wait for the connect acknowledgment
//! 4. `Connection::send` - One command at a time through the `CommandSlot`
//! 5. `Connection::shutdown` - Close the socket
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `endpoint` | Socket opening |
//! | `slot` | Single-occupancy command mailbox |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// WebSocket endpoint connection.
pub mod endpoint;

/// Single-occupancy command mailbox.
pub mod slot;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, KEY_PRESS_GRACE, Reply, TokenHandler};
pub use endpoint::{SocketStream, open_socket};
pub use slot::{CommandSlot, PendingCommand, Ticket};
