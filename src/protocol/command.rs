//! Outbound command frames.
//!
//! Every frame is a JSON object in `{method, params}` form. The TV knows two
//! methods:
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `ms.remote.control` | Remote key press |
//! | `ms.channel.emit` | App list, app launch and other host events |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::identifiers::AppId;

// ============================================================================
// Constants
// ============================================================================

/// Recipient of channel events handled by the TV itself.
pub const HOST_RECIPIENT: &str = "host";

/// Remote type expected by the TV for key presses.
const SEND_REMOTE_KEY: &str = "SendRemoteKey";

// ============================================================================
// Command
// ============================================================================

/// A command frame sent to the TV.
///
/// # Format
///
/// ```json
/// {
///   "method": "ms.remote.control",
///   "params": { "Cmd": "Click", "DataOfCmd": "KEY_MENU", "Option": "false", "TypeOfRemote": "SendRemoteKey" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Command {
    /// Remote key press.
    #[serde(rename = "ms.remote.control")]
    RemoteControl(RemoteControlParams),

    /// Event emitted on the remote-control channel.
    #[serde(rename = "ms.channel.emit")]
    ChannelEmit(EmitParams),
}

impl Command {
    /// Creates a key command.
    #[must_use]
    pub fn key(code: impl Into<String>, action: KeyAction) -> Self {
        Self::RemoteControl(RemoteControlParams {
            cmd: action,
            data_of_cmd: code.into(),
            option: "false".to_string(),
            type_of_remote: SEND_REMOTE_KEY.to_string(),
        })
    }

    /// Creates a host event with no payload.
    #[must_use]
    pub fn emit(event: impl Into<String>) -> Self {
        Self::ChannelEmit(EmitParams {
            event: event.into(),
            to: HOST_RECIPIENT.to_string(),
            data: None,
        })
    }

    /// Creates an app launch event.
    #[must_use]
    pub fn launch(event: impl Into<String>, app_id: &AppId, action: LaunchAction) -> Self {
        Self::ChannelEmit(EmitParams {
            event: event.into(),
            to: HOST_RECIPIENT.to_string(),
            data: Some(json!({
                "action_type": action,
                "appId": app_id,
            })),
        })
    }

    /// Returns the method name of this command.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::RemoteControl(_) => "ms.remote.control",
            Self::ChannelEmit(_) => "ms.channel.emit",
        }
    }
}

// ============================================================================
// RemoteControlParams
// ============================================================================

/// Parameters of `ms.remote.control`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteControlParams {
    /// How the key is pressed.
    #[serde(rename = "Cmd")]
    pub cmd: KeyAction,

    /// Key code, e.g. `KEY_MENU`.
    #[serde(rename = "DataOfCmd")]
    pub data_of_cmd: String,

    /// Always `"false"`.
    #[serde(rename = "Option")]
    pub option: String,

    /// Always `SendRemoteKey`.
    #[serde(rename = "TypeOfRemote")]
    pub type_of_remote: String,
}

// ============================================================================
// EmitParams
// ============================================================================

/// Parameters of `ms.channel.emit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitParams {
    /// Event name, e.g. `ed.installedApp.get`.
    pub event: String,

    /// Recipient, `host` for TV-handled events.
    pub to: String,

    /// Optional event payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ============================================================================
// KeyAction
// ============================================================================

/// How a remote key is pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    /// Press and release.
    #[default]
    Click,
    /// Hold the key down until [`KeyAction::Release`].
    Press,
    /// Release a held key.
    Release,
}

// ============================================================================
// LaunchAction
// ============================================================================

/// How the TV should start an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchAction {
    /// Web apps, launched through a deep link.
    DeepLink,
    /// Native Tizen apps.
    NativeLaunch,
}

impl LaunchAction {
    /// App type reported by the TV for web apps.
    pub const DEEP_LINK_APP_TYPE: u32 = 2;

    /// Picks the launch action for an app type from the installed-app list.
    #[inline]
    #[must_use]
    pub fn for_app_type(app_type: u32) -> Self {
        if app_type == Self::DEEP_LINK_APP_TYPE {
            Self::DeepLink
        } else {
            Self::NativeLaunch
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
