//! Inbound message types.
//!
//! Every frame from the TV is an `{event, data}` envelope. There are no
//! correlation ids: a response is recognised only by its event name.
//!
//! # Event Types
//!
//! | Event | Variant |
//! |-------|---------|
//! | `ms.channel.unauthorized` | [`InboundEvent::Unauthorized`] |
//! | `ms.channel.connect` | [`InboundEvent::Connected`] |
//! | `ed.installedApp.get` | [`InboundEvent::InstalledApps`] |
//! | `ed.apps.launch` | [`InboundEvent::LaunchResult`] |
//! | anything else | [`InboundEvent::Unknown`] |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::profile::EventNames;

// ============================================================================
// InboundMessage
// ============================================================================

/// A raw frame from the TV.
///
/// # Format
///
/// ```json
/// {
///   "event": "ms.channel.connect",
///   "data": { "id": "...", "token": "13315209", "clients": [ ... ] }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Event name.
    pub event: String,

    /// Event-specific payload.
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    /// Parses the message into a typed event using the profile's event names.
    #[must_use]
    pub fn into_event(self, names: &EventNames) -> InboundEvent {
        let event = self.event.as_str();

        if event == names.unauthorized {
            InboundEvent::Unauthorized
        } else if event == names.connect {
            InboundEvent::Connected(ConnectAck::from_data(&self.data))
        } else if event == names.installed_apps {
            match serde_json::from_value::<AppListData>(self.data) {
                Ok(list) => InboundEvent::InstalledApps(list.data),
                Err(e) => InboundEvent::Malformed {
                    event: self.event,
                    reason: e.to_string(),
                },
            }
        } else if event == names.launch_app {
            InboundEvent::LaunchResult(self.data)
        } else {
            InboundEvent::Unknown {
                event: self.event,
                data: self.data,
            }
        }
    }
}

// ============================================================================
// InboundEvent
// ============================================================================

/// Parsed inbound events for exhaustive dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// The TV refused access; approval is pending on screen.
    Unauthorized,

    /// Handshake acknowledgment.
    Connected(ConnectAck),

    /// Installed app list.
    InstalledApps(Vec<RawApp>),

    /// Launch outcome; `200` means success.
    LaunchResult(Value),

    /// A known event whose payload did not match its expected shape.
    Malformed {
        /// Event name.
        event: String,
        /// Decoding failure.
        reason: String,
    },

    /// Unknown event type.
    Unknown {
        /// Event name.
        event: String,
        /// Event payload.
        data: Value,
    },
}

impl InboundEvent {
    /// Returns a short name for logging.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Connected(_) => "connected",
            Self::InstalledApps(_) => "installed_apps",
            Self::LaunchResult(_) => "launch_result",
            Self::Malformed { event, .. } | Self::Unknown { event, .. } => event.as_str(),
        }
    }
}

// ============================================================================
// ConnectAck
// ============================================================================

/// Data of the handshake acknowledgment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectAck {
    /// Fresh token, issued after on-screen approval.
    pub token: Option<String>,
    /// Id assigned to this client by the TV.
    pub client_id: Option<String>,
}

impl ConnectAck {
    /// Extracts the acknowledgment from event data.
    ///
    /// Tokens arrive as strings on most firmwares and as numbers on some.
    fn from_data(data: &Value) -> Self {
        let token = match data.get("token") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let client_id = data
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Self { token, client_id }
    }
}

// ============================================================================
// RawApp
// ============================================================================

/// An app descriptor as sent by the TV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawApp {
    /// App id.
    #[serde(rename = "appId")]
    pub app_id: String,

    /// App type; `2` is a web app.
    #[serde(rename = "app_type", default)]
    pub app_type: u32,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Icon path on the TV.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Payload of the app list event.
#[derive(Debug, Deserialize)]
struct AppListData {
    #[serde(default)]
    data: Vec<RawApp>,
}

// ============================================================================
// Tests
// ============================================================================
