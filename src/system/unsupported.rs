use anyhow::Result;
use tracing::warn;

use crate::audio::{AudioEndpoint, DeviceId, Subscription};
use crate::error::{CommandError, QueryError, SubscriptionError};
use crate::system::traits::{ChangeEventSource, DeviceInspector};

/// Stand-in for targets without CoreAudio; every call fails.
pub struct UnsupportedPlatform;

impl UnsupportedPlatform {
    pub fn new() -> Result<Self> {
        warn!("CoreAudio is not available on this platform");
        Ok(Self)
    }
}

impl DeviceInspector for UnsupportedPlatform {
    fn list_output_endpoints(&self) -> Result<Vec<AudioEndpoint>, QueryError> {
        Err(QueryError::Unsupported)
    }

    fn default_output_endpoint(&self) -> Result<AudioEndpoint, QueryError> {
        Err(QueryError::Unsupported)
    }

    fn set_default_output_endpoint(&self, _id: DeviceId) -> Result<(), CommandError> {
        Err(CommandError::Unsupported)
    }

    fn transport_code(&self, _id: DeviceId) -> Result<String, QueryError> {
        Err(QueryError::Unsupported)
    }

    fn name(&self, _id: DeviceId) -> Option<String> {
        None
    }
}

impl ChangeEventSource for UnsupportedPlatform {
    fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
        Err(SubscriptionError::Unsupported)
    }
}
