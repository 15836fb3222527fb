//! Remote key definitions.
//!
//! Provides constants for the keys of a physical remote.
//!
//! # Example
//!
//! ```ignore
//! use tizen_remote::RemoteKey;
//!
//! client.send_key(RemoteKey::Home).await?;
//! client.send_key(RemoteKey::VolumeUp).await?;
//!
//! // Keys missing from the catalog can be sent by code:
//! client.send_key_code("KEY_AMBILIGHT").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// RemoteKey
// ============================================================================

/// Keys of a physical remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    // ========================================================================
    // Power & Menus
    // ========================================================================
    /// Power toggle
    Power,
    /// Home screen
    Home,
    /// Settings menu
    Menu,
    /// Leave the current app
    Exit,
    /// Back
    Return,
    /// Input source
    Source,
    /// Program guide
    Guide,
    /// Info overlay
    Info,
    /// Tools menu
    Tools,

    // ========================================================================
    // Navigation
    // ========================================================================
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Confirm selection
    Enter,

    // ========================================================================
    // Volume & Channel
    // ========================================================================
    /// Volume up
    VolumeUp,
    /// Volume down
    VolumeDown,
    /// Mute toggle
    Mute,
    /// Next channel
    ChannelUp,
    /// Previous channel
    ChannelDown,
    /// Last viewed channel
    PreviousChannel,
    /// Channel list
    ChannelList,

    // ========================================================================
    // Playback
    // ========================================================================
    /// Play
    Play,
    /// Pause
    Pause,
    /// Stop
    Stop,
    /// Rewind
    Rewind,
    /// Fast forward
    FastForward,
    /// Record
    Record,

    // ========================================================================
    // Color Keys
    // ========================================================================
    /// Red (A)
    Red,
    /// Green (B)
    Green,
    /// Yellow (C)
    Yellow,
    /// Blue (D)
    Blue,

    // ========================================================================
    // Digits
    // ========================================================================
    /// Digit 0
    Digit0,
    /// Digit 1
    Digit1,
    /// Digit 2
    Digit2,
    /// Digit 3
    Digit3,
    /// Digit 4
    Digit4,
    /// Digit 5
    Digit5,
    /// Digit 6
    Digit6,
    /// Digit 7
    Digit7,
    /// Digit 8
    Digit8,
    /// Digit 9
    Digit9,
}

impl RemoteKey {
    /// Returns the key code sent on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Power => "KEY_POWER",
            Self::Home => "KEY_HOME",
            Self::Menu => "KEY_MENU",
            Self::Exit => "KEY_EXIT",
            Self::Return => "KEY_RETURN",
            Self::Source => "KEY_SOURCE",
            Self::Guide => "KEY_GUIDE",
            Self::Info => "KEY_INFO",
            Self::Tools => "KEY_TOOLS",
            Self::Up => "KEY_UP",
            Self::Down => "KEY_DOWN",
            Self::Left => "KEY_LEFT",
            Self::Right => "KEY_RIGHT",
            Self::Enter => "KEY_ENTER",
            Self::VolumeUp => "KEY_VOLUP",
            Self::VolumeDown => "KEY_VOLDOWN",
            Self::Mute => "KEY_MUTE",
            Self::ChannelUp => "KEY_CHUP",
            Self::ChannelDown => "KEY_CHDOWN",
            Self::PreviousChannel => "KEY_PRECH",
            Self::ChannelList => "KEY_CH_LIST",
            Self::Play => "KEY_PLAY",
            Self::Pause => "KEY_PAUSE",
            Self::Stop => "KEY_STOP",
            Self::Rewind => "KEY_REWIND",
            Self::FastForward => "KEY_FF",
            Self::Record => "KEY_REC",
            Self::Red => "KEY_RED",
            Self::Green => "KEY_GREEN",
            Self::Yellow => "KEY_YELLOW",
            Self::Blue => "KEY_CYAN",
            Self::Digit0 => "KEY_0",
            Self::Digit1 => "KEY_1",
            Self::Digit2 => "KEY_2",
            Self::Digit3 => "KEY_3",
            Self::Digit4 => "KEY_4",
            Self::Digit5 => "KEY_5",
            Self::Digit6 => "KEY_6",
            Self::Digit7 => "KEY_7",
            Self::Digit8 => "KEY_8",
            Self::Digit9 => "KEY_9",
        }
    }

    /// Returns the key for a single decimal digit.
    #[must_use]
    pub const fn digit(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Digit0),
            1 => Some(Self::Digit1),
            2 => Some(Self::Digit2),
            3 => Some(Self::Digit3),
            4 => Some(Self::Digit4),
            5 => Some(Self::Digit5),
            6 => Some(Self::Digit6),
            7 => Some(Self::Digit7),
            8 => Some(Self::Digit8),
            9 => Some(Self::Digit9),
            _ => None,
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_keys() {
        assert_eq!(RemoteKey::Menu.code(), "KEY_MENU");
        assert_eq!(RemoteKey::Exit.code(), "KEY_EXIT");
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(RemoteKey::VolumeUp.to_string(), "KEY_VOLUP");
    }

    #[test]
    fn test_digit() {
        assert_eq!(RemoteKey::digit(0), Some(RemoteKey::Digit0));
        assert_eq!(RemoteKey::digit(7).map(RemoteKey::code), Some("KEY_7"));
        assert_eq!(RemoteKey::digit(10), None);
    }

    #[test]
    fn test_codes_are_prefixed() {
        for value in 0..10 {
            let key = RemoteKey::digit(value).expect("digit");
            assert!(key.code().starts_with("KEY_"));
        }
    }
}
