use std::fmt;

use super::transport::{TransportCategory, classify};

/// CoreAudio object id. Stable for the life of the process only.
pub type DeviceId = u32;

/// Read-only snapshot of an audio endpoint, re-fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEndpoint {
    pub id: DeviceId,
    pub name: Option<String>,
    pub transport: TransportCategory,
}

impl fmt::Display for AudioEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id {}, {})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.id,
            self.transport
        )
    }
}

impl AudioEndpoint {
    pub fn new(id: DeviceId, name: Option<String>, transport: TransportCategory) -> Self {
        Self {
            id,
            name,
            transport,
        }
    }

    /// Build an endpoint from the raw transport code reported by the platform.
    pub fn from_transport_code(id: DeviceId, name: Option<String>, transport_code: &str) -> Self {
        Self::new(id, name, classify(transport_code))
    }

    pub fn is_eligible(&self) -> bool {
        self.transport.is_eligible()
    }

    /// Identity comparison; names and categories are not part of identity.
    pub fn same_device(&self, other: &AudioEndpoint) -> bool {
        self.id == other.id
    }
}
