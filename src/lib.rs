pub mod audio;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod system;
pub mod tracker;

pub use audio::{AudioEndpoint, DeviceId, TransportCategory, classify};
pub use config::Config;
pub use error::{CommandError, NoDeviceFoundError, QueryError, SubscriptionError};
pub use service::{GuardService, run_daemon};
pub use tracker::{PolicyDecision, PreferredDeviceTracker};
