pub mod adapters;
pub mod traits;

#[cfg(not(target_os = "macos"))]
pub mod unsupported;

// Mock implementations for testing
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// Re-export traits and adapters for easy access
pub use adapters::*;
pub use traits::*;

#[cfg(any(test, feature = "test-mocks"))]
pub use mocks::*;

// Platform collaborators used by the binary
#[cfg(target_os = "macos")]
pub use crate::audio::controller::DeviceController as PlatformInspector;
#[cfg(target_os = "macos")]
pub use crate::audio::listener::CoreAudioListener as PlatformChangeSource;

#[cfg(not(target_os = "macos"))]
pub use unsupported::UnsupportedPlatform as PlatformInspector;
#[cfg(not(target_os = "macos"))]
pub use unsupported::UnsupportedPlatform as PlatformChangeSource;
