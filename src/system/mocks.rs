use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

use crate::audio::{AudioEndpoint, DeviceChanged, DeviceId, Subscription, TransportCategory};
use crate::error::{CommandError, QueryError, SubscriptionError};
use crate::system::traits::{ChangeEventSource, DeviceInspector, FileSystemInterface};

const MOCK_STATUS: i32 = -1;

/// Mock audio system for testing - provides controllable device behavior.
///
/// Acts as both the inspector and the change-event source: changing the
/// default output (directly or through `set_default_output_endpoint`) emits
/// a tick to every live subscription, the way the HAL does.
#[derive(Clone, Default)]
pub struct MockAudioSystem {
    pub devices: Arc<Mutex<Vec<AudioEndpoint>>>,
    pub default_output: Arc<Mutex<Option<AudioEndpoint>>>,
    pub subscribers: Arc<Mutex<Vec<UnboundedSender<DeviceChanged>>>>,
    pub set_device_calls: Arc<Mutex<Vec<DeviceId>>>,
    pub should_fail_enumeration: Arc<Mutex<bool>>,
    pub should_fail_default_query: Arc<Mutex<bool>>,
    pub should_fail_set_device: Arc<Mutex<bool>>,
    pub should_fail_subscribe: Arc<Mutex<bool>>,
}

impl MockAudioSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(devices: Vec<AudioEndpoint>) -> Self {
        let system = Self::new();
        *system.devices.lock().unwrap() = devices;
        system
    }

    /// Add a device to the mock system
    pub fn add_device(&self, device: AudioEndpoint) {
        self.devices.lock().unwrap().push(device);
    }

    /// Remove a device from the mock system
    pub fn remove_device(&self, id: DeviceId) {
        self.devices.lock().unwrap().retain(|d| d.id != id);
    }

    /// Set the default output device and notify subscribers
    pub fn set_mock_default_output(&self, device: Option<AudioEndpoint>) {
        *self.default_output.lock().unwrap() = device;
        self.trigger_device_change();
    }

    /// Current default output as the mock sees it
    pub fn current_default_output(&self) -> Option<AudioEndpoint> {
        self.default_output.lock().unwrap().clone()
    }

    /// Send a tick to every live subscription
    pub fn trigger_device_change(&self) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|sender| sender.send(DeviceChanged).is_ok());
    }

    /// Simulate the platform listener dying: every subscription ends
    pub fn fail_subscriptions(&self) {
        self.subscribers.lock().unwrap().clear();
    }

    /// Get all set device calls that succeeded
    pub fn get_set_device_calls(&self) -> Vec<DeviceId> {
        self.set_device_calls.lock().unwrap().clone()
    }

    /// Clear the history of set device calls
    pub fn clear_set_device_calls(&self) {
        self.set_device_calls.lock().unwrap().clear();
    }

    /// Configure the mock to fail enumeration
    pub fn set_enumeration_failure(&self, should_fail: bool) {
        *self.should_fail_enumeration.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail default output queries
    pub fn set_default_query_failure(&self, should_fail: bool) {
        *self.should_fail_default_query.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail device setting
    pub fn set_device_setting_failure(&self, should_fail: bool) {
        *self.should_fail_set_device.lock().unwrap() = should_fail;
    }

    /// Configure the mock to refuse new subscriptions
    pub fn set_subscribe_failure(&self, should_fail: bool) {
        *self.should_fail_subscribe.lock().unwrap() = should_fail;
    }

    /// Get count of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }

    fn find(&self, id: DeviceId) -> Option<AudioEndpoint> {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }
}

impl DeviceInspector for MockAudioSystem {
    fn list_output_endpoints(&self) -> Result<Vec<AudioEndpoint>, QueryError> {
        if *self.should_fail_enumeration.lock().unwrap() {
            return Err(QueryError::Property {
                property: "device list",
                device: 1,
                status: MOCK_STATUS,
            });
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    fn default_output_endpoint(&self) -> Result<AudioEndpoint, QueryError> {
        if *self.should_fail_default_query.lock().unwrap() {
            return Err(QueryError::Property {
                property: "default output device",
                device: 1,
                status: MOCK_STATUS,
            });
        }
        self.default_output
            .lock()
            .unwrap()
            .clone()
            .ok_or(QueryError::NoDefaultDevice)
    }

    fn set_default_output_endpoint(&self, id: DeviceId) -> Result<(), CommandError> {
        if *self.should_fail_set_device.lock().unwrap() {
            return Err(CommandError::SetDefaultOutput {
                device: id,
                status: MOCK_STATUS,
            });
        }

        let device = self.find(id).ok_or(CommandError::SetDefaultOutput {
            device: id,
            status: MOCK_STATUS,
        })?;

        self.set_device_calls.lock().unwrap().push(id);
        self.set_mock_default_output(Some(device));
        Ok(())
    }

    fn transport_code(&self, id: DeviceId) -> Result<String, QueryError> {
        let device = self.find(id).ok_or(QueryError::Property {
            property: "transport type",
            device: id,
            status: MOCK_STATUS,
        })?;

        let code = match device.transport {
            TransportCategory::BuiltIn => "bltn",
            TransportCategory::WiredOrDockConnected => "usb",
            TransportCategory::ShortRangeWireless => "blue",
            TransportCategory::WirelessCast => "airp",
            TransportCategory::Other => "virt",
            TransportCategory::Unknown => "",
        };
        Ok(code.to_string())
    }

    fn name(&self, id: DeviceId) -> Option<String> {
        self.find(id).and_then(|d| d.name)
    }
}

impl ChangeEventSource for MockAudioSystem {
    fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
        if *self.should_fail_subscribe.lock().unwrap() {
            return Err(SubscriptionError::Register(MOCK_STATUS));
        }

        let (sender, subscription) = Subscription::channel();
        self.subscribers.lock().unwrap().push(sender);
        Ok(subscription)
    }
}

/// Mock file system for testing - provides controllable file operations
#[derive(Clone, Default)]
pub struct MockFileSystem {
    pub files: Arc<Mutex<HashMap<PathBuf, String>>>,
    pub read_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub write_calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub directory_creation_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub should_fail_read: Arc<Mutex<bool>>,
    pub should_fail_write: Arc<Mutex<bool>>,
    pub should_fail_create_dir: Arc<Mutex<bool>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock file system
    pub fn add_file<P: AsRef<Path>>(&self, path: P, content: String) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content);
    }

    /// Get the content of a file, if present
    pub fn file_content<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    /// Get all read calls that were made
    pub fn get_read_calls(&self) -> Vec<PathBuf> {
        self.read_calls.lock().unwrap().clone()
    }

    /// Get all write calls that were made
    pub fn get_write_calls(&self) -> Vec<(PathBuf, String)> {
        self.write_calls.lock().unwrap().clone()
    }

    /// Get all directory creation calls that were made
    pub fn get_directory_creation_calls(&self) -> Vec<PathBuf> {
        self.directory_creation_calls.lock().unwrap().clone()
    }

    /// Configure the mock to fail read operations
    pub fn set_read_failure(&self, should_fail: bool) {
        *self.should_fail_read.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail write operations
    pub fn set_write_failure(&self, should_fail: bool) {
        *self.should_fail_write.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail directory creation
    pub fn set_create_dir_failure(&self, should_fail: bool) {
        *self.should_fail_create_dir.lock().unwrap() = should_fail;
    }
}

impl FileSystemInterface for MockFileSystem {
    fn read_config_file(&self, path: &Path) -> Result<String> {
        self.read_calls.lock().unwrap().push(path.to_path_buf());

        if *self.should_fail_read.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock read failure"));
        }

        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("File not found: {}", path.display()))
    }

    fn write_config_file(&self, path: &Path, content: &str) -> Result<()> {
        self.write_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));

        if *self.should_fail_write.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock write failure"));
        }

        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn config_file_exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_config_dir(&self, path: &Path) -> Result<()> {
        self.directory_creation_calls
            .lock()
            .unwrap()
            .push(path.to_path_buf());

        if *self.should_fail_create_dir.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock create directory failure"));
        }

        Ok(())
    }
}
