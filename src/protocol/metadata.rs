//! Device metadata document.
//!
//! Returned by `GET /api/v2/` before the socket is opened. Field coverage
//! differs between TV generations, so every field defaults when absent.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::DeviceId;

// ============================================================================
// DeviceMetadata
// ============================================================================

/// Identity, capability and network descriptor of a TV.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid:5b5e3a3c-...",
///   "name": "[TV] Samsung 7 Series (55)",
///   "version": "2.0.25",
///   "type": "Samsung SmartTV",
///   "uri": "http://192.168.1.20:8001/api/v2/",
///   "remote": "1.0",
///   "isSupport": "{...}",
///   "device": { "modelName": "UE55RU7400", "TokenAuthSupport": "true", ... }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMetadata {
    /// Stable device id, used as the token cache key.
    pub id: DeviceId,
    /// Friendly name.
    pub name: String,
    /// API version.
    pub version: String,
    /// Device type.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Metadata URI.
    pub uri: String,
    /// Remote API version.
    pub remote: String,
    /// JSON-encoded feature flags.
    #[serde(rename = "isSupport")]
    pub is_support: String,
    /// Hardware and network details.
    pub device: DeviceInfo,
}

impl DeviceMetadata {
    /// Returns `true` if the TV issues authorization tokens.
    #[inline]
    #[must_use]
    pub fn supports_token_auth(&self) -> bool {
        self.device.token_auth_support.eq_ignore_ascii_case("true")
    }

    /// Returns `true` if the TV runs in developer mode.
    #[inline]
    #[must_use]
    pub fn developer_mode(&self) -> bool {
        self.device.developer_mode == "1"
    }
}

// ============================================================================
// DeviceInfo
// ============================================================================

/// The `device` section of the metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Model year code, e.g. `19_MUSEL_UHD`.
    pub model: String,
    /// Model name, e.g. `UE55RU7400`.
    pub model_name: String,
    /// Description.
    pub description: String,
    /// `wired` or `wireless`.
    pub network_type: String,
    /// Wireless network name.
    pub ssid: String,
    /// Address as seen by the TV.
    pub ip: String,
    /// Firmware version.
    pub firmware_version: String,
    /// Device name.
    pub name: String,
    /// Device id.
    pub id: String,
    /// UPnP device name.
    pub udn: String,
    /// Screen resolution.
    pub resolution: String,
    /// Country code.
    pub country_code: String,
    /// MSF version.
    pub msf_version: String,
    /// Smart Hub agreement flag.
    pub smart_hub_agreement: String,
    /// Wireless MAC address.
    pub wifi_mac: String,
    /// `"1"` when developer mode is on.
    pub developer_mode: String,
    /// Developer host address.
    #[serde(rename = "developerIP")]
    pub developer_ip: String,
    /// Operating system, e.g. `Tizen`.
    #[serde(rename = "OS")]
    pub os: String,
    /// `"true"` if the TV supports token authentication.
    #[serde(rename = "TokenAuthSupport")]
    pub token_auth_support: String,
    /// Power state, e.g. `on`.
    #[serde(rename = "PowerState")]
    pub power_state: String,
}

// ============================================================================
// Tests
// ============================================================================
