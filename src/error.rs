use thiserror::Error;

use crate::audio::{DeviceId, TransportCategory};

/// A platform query failed. Transient: the current evaluation becomes a no-op.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("failed to read {property} of device {device} (status {status})")]
    Property {
        property: &'static str,
        device: DeviceId,
        status: i32,
    },

    #[error("no default output device is set")]
    NoDefaultDevice,

    #[error("audio device queries are not supported on this platform")]
    Unsupported,
}

/// The "set default output" command failed. Logged, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("failed to set default output to device {device} (status {status})")]
    SetDefaultOutput { device: DeviceId, status: i32 },

    #[error("audio device commands are not supported on this platform")]
    Unsupported,
}

/// No eligible output device could be resolved at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no eligible output device found (searched {searched:?})")]
pub struct NoDeviceFoundError {
    pub searched: Vec<TransportCategory>,
}

/// The change-notification stream could not be established or ended.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("failed to register default output listener (status {0})")]
    Register(i32),

    #[error("default output change notifications ended unexpectedly")]
    Ended,

    #[error("change notifications are not supported on this platform")]
    Unsupported,
}
