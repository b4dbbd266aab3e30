use anyhow::Result;
use std::path::Path;

use crate::audio::{AudioEndpoint, DeviceId, Subscription};
use crate::error::{CommandError, QueryError, SubscriptionError};

/// Trait for audio system operations - abstracts the CoreAudio HAL
pub trait DeviceInspector {
    /// Enumerate all endpoints that can play audio
    fn list_output_endpoints(&self) -> Result<Vec<AudioEndpoint>, QueryError>;

    /// Get the current system default output endpoint
    fn default_output_endpoint(&self) -> Result<AudioEndpoint, QueryError>;

    /// Make the given device the system default output
    fn set_default_output_endpoint(&self, id: DeviceId) -> Result<(), CommandError>;

    /// Raw four-char transport code of a device
    fn transport_code(&self, id: DeviceId) -> Result<String, QueryError>;

    /// Human-readable device name, if it has one
    fn name(&self, id: DeviceId) -> Option<String>;
}

impl<T: DeviceInspector + ?Sized> DeviceInspector for &T {
    fn list_output_endpoints(&self) -> Result<Vec<AudioEndpoint>, QueryError> {
        (**self).list_output_endpoints()
    }

    fn default_output_endpoint(&self) -> Result<AudioEndpoint, QueryError> {
        (**self).default_output_endpoint()
    }

    fn set_default_output_endpoint(&self, id: DeviceId) -> Result<(), CommandError> {
        (**self).set_default_output_endpoint(id)
    }

    fn transport_code(&self, id: DeviceId) -> Result<String, QueryError> {
        (**self).transport_code(id)
    }

    fn name(&self, id: DeviceId) -> Option<String> {
        (**self).name(id)
    }
}

/// Source of "default output changed" notifications
pub trait ChangeEventSource {
    /// Start delivering notifications. The returned subscription ends only if
    /// the underlying listener fails; dropping it stops delivery.
    fn subscribe(&self) -> Result<Subscription, SubscriptionError>;
}

/// Trait for file system operations - abstracts std::fs for testability
pub trait FileSystemInterface {
    /// Read the entire contents of a configuration file
    fn read_config_file(&self, path: &Path) -> Result<String>;

    /// Write configuration content to a file
    fn write_config_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a configuration file exists
    fn config_file_exists(&self, path: &Path) -> bool;

    /// Create the directory structure for config files
    fn create_config_dir(&self, path: &Path) -> Result<()>;
}
