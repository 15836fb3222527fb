//! Installed application model.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::AppId;
use crate::protocol::{LaunchAction, RawApp};

// ============================================================================
// InstalledApp
// ============================================================================

/// An application installed on the TV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    /// App id, as accepted by [`launch_app_by_id`](crate::RemoteClient::launch_app_by_id).
    pub app_id: AppId,
    /// App type reported by the TV.
    pub app_type: u32,
    /// Display name, when the TV reports one.
    pub name: Option<String>,
}

impl InstalledApp {
    /// Returns how the TV is asked to launch this app.
    #[inline]
    #[must_use]
    pub fn launch_action(&self) -> LaunchAction {
        LaunchAction::for_app_type(self.app_type)
    }
}

impl From<RawApp> for InstalledApp {
    fn from(raw: RawApp) -> Self {
        Self {
            app_id: AppId::new(raw.app_id),
            app_type: raw.app_type,
            name: raw.name,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
