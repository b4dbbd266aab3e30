pub mod decision;
pub mod manager;

pub use decision::{PolicyDecision, evaluate};
pub use manager::{PreferredDeviceTracker, resolve_preferred};
