#[cfg(target_os = "macos")]
pub mod controller;
pub mod device;
pub mod events;
#[cfg(target_os = "macos")]
pub mod listener;
pub mod transport;

pub use device::{AudioEndpoint, DeviceId};
pub use events::{DeviceChanged, ListenerGuard, Subscription};
pub use transport::{TransportCategory, classify, four_char_code};
