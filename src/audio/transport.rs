//! Transport classification.
//!
//! CoreAudio reports how a device is connected as a four-character code
//! (`kAudioDevicePropertyTransportType`). This module is the single source of
//! truth for turning that code into a [`TransportCategory`] and for deciding
//! whether a device may be adopted as the preferred output.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportCategory {
    BuiltIn,
    WiredOrDockConnected,
    ShortRangeWireless,
    WirelessCast,
    Other,
    Unknown,
}

impl TransportCategory {
    /// Whether a device in this category may become the preferred output.
    pub fn is_eligible(self) -> bool {
        self != TransportCategory::WirelessCast
    }
}

impl fmt::Display for TransportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportCategory::BuiltIn => "built-in",
            TransportCategory::WiredOrDockConnected => "wired",
            TransportCategory::ShortRangeWireless => "short-range wireless",
            TransportCategory::WirelessCast => "wireless cast",
            TransportCategory::Other => "other",
            TransportCategory::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Map a transport code to its category. Total: anything unrecognized is
/// `Unknown`.
pub fn classify(transport_code: &str) -> TransportCategory {
    match transport_code.trim_matches(|c: char| c.is_whitespace() || c == '\0') {
        "bltn" => TransportCategory::BuiltIn,
        "usb" | "fire" | "pci" | "tbol" | "hdmi" | "dprt" => {
            TransportCategory::WiredOrDockConnected
        }
        "blue" | "blea" => TransportCategory::ShortRangeWireless,
        "airp" => TransportCategory::WirelessCast,
        "grup" | "virt" | "avb" | "ccwd" | "ccwl" => TransportCategory::Other,
        _ => TransportCategory::Unknown,
    }
}

/// Render a 32-bit four-char code the way CoreAudio spells it (`'airp'`),
/// trimming trailing padding. A zero code renders as an empty string.
pub fn four_char_code(code: u32) -> String {
    code.to_be_bytes()
        .iter()
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}
