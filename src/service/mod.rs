pub mod daemon;
pub mod signals;
pub mod supervisor;

pub use daemon::{GuardService, ServiceStats, run_daemon};
pub use signals::{SignalHandler, SignalType};
pub use supervisor::{InstanceLock, LaunchAgent, LaunchOutcome, launch_detached};
