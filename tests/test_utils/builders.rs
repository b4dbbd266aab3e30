//! Test utility builders for creating output endpoints and mock audio systems
//!
//! Individual methods may not be used by all tests, so dead code warnings are suppressed.

#![allow(dead_code)]

use audio_cast_guard::audio::{AudioEndpoint, DeviceId, TransportCategory};
use audio_cast_guard::system::MockAudioSystem;

/// Builder for creating test AudioEndpoint instances
pub struct EndpointBuilder {
    id: DeviceId,
    name: Option<String>,
    transport: TransportCategory,
}

impl EndpointBuilder {
    pub fn new() -> Self {
        Self {
            id: 1,
            name: Some("Test Device".to_string()),
            transport: TransportCategory::BuiltIn,
        }
    }

    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = id;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn built_in(mut self) -> Self {
        self.transport = TransportCategory::BuiltIn;
        self
    }

    pub fn usb(mut self) -> Self {
        self.transport = TransportCategory::WiredOrDockConnected;
        self
    }

    pub fn bluetooth(mut self) -> Self {
        self.transport = TransportCategory::ShortRangeWireless;
        self
    }

    pub fn airplay(mut self) -> Self {
        self.transport = TransportCategory::WirelessCast;
        self
    }

    pub fn transport(mut self, transport: TransportCategory) -> Self {
        self.transport = transport;
        self
    }

    pub fn build(self) -> AudioEndpoint {
        AudioEndpoint::new(self.id, self.name, self.transport)
    }
}

impl Default for EndpointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for creating common test scenarios
pub mod scenarios {
    use super::*;

    pub fn speakers() -> AudioEndpoint {
        EndpointBuilder::new()
            .id(10)
            .name("MacBook Pro Speakers")
            .built_in()
            .build()
    }

    pub fn headset() -> AudioEndpoint {
        EndpointBuilder::new()
            .id(20)
            .name("WH-1000XM5")
            .bluetooth()
            .build()
    }

    pub fn dock() -> AudioEndpoint {
        EndpointBuilder::new()
            .id(30)
            .name("CalDigit TS4")
            .usb()
            .build()
    }

    pub fn living_room_tv() -> AudioEndpoint {
        EndpointBuilder::new()
            .id(40)
            .name("Living Room")
            .airplay()
            .build()
    }

    pub fn kitchen_speaker() -> AudioEndpoint {
        EndpointBuilder::new()
            .id(41)
            .name("Kitchen HomePod")
            .airplay()
            .build()
    }

    /// Speakers, a headset, a dock and two AirPlay targets
    pub fn typical_endpoints() -> Vec<AudioEndpoint> {
        vec![
            speakers(),
            headset(),
            dock(),
            living_room_tv(),
            kitchen_speaker(),
        ]
    }

    /// Typical endpoints with `default` selected as the system output
    pub fn system_with_default(default: AudioEndpoint) -> MockAudioSystem {
        let system = MockAudioSystem::with_devices(typical_endpoints());
        system.set_mock_default_output(Some(default));
        system
    }
}
