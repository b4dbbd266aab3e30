use anyhow::Result;
use coreaudio_sys::*;
use std::os::raw::c_void;
use std::ptr;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use super::events::{DeviceChanged, ListenerGuard, Subscription};
use crate::error::SubscriptionError;
use crate::system::ChangeEventSource;

const NO_ERROR: OSStatus = kAudioHardwareNoError as OSStatus;

const DEFAULT_OUTPUT_ADDRESS: AudioObjectPropertyAddress = AudioObjectPropertyAddress {
    mSelector: kAudioHardwarePropertyDefaultOutputDevice,
    mScope: kAudioObjectPropertyScopeGlobal,
    mElement: kAudioObjectPropertyElementMain,
};

/// Watches `kAudioHardwarePropertyDefaultOutputDevice` on the system object
pub struct CoreAudioListener;

impl CoreAudioListener {
    pub fn new() -> Result<Self> {
        info!("Creating CoreAudio listener");
        detach_notifications_from_run_loop();
        Ok(Self)
    }
}

/// Ask the HAL to deliver property notifications on its own thread instead
/// of the main run loop, which this process never runs.
fn detach_notifications_from_run_loop() {
    let address = AudioObjectPropertyAddress {
        mSelector: kAudioHardwarePropertyRunLoop,
        mScope: kAudioObjectPropertyScopeGlobal,
        mElement: kAudioObjectPropertyElementMain,
    };
    let run_loop: *const c_void = ptr::null();

    let status = unsafe {
        AudioObjectSetPropertyData(
            kAudioObjectSystemObject,
            &address,
            0,
            ptr::null(),
            std::mem::size_of::<*const c_void>() as u32,
            &run_loop as *const _ as *const c_void,
        )
    };
    if status != NO_ERROR {
        warn!("Could not detach HAL notifications from the run loop: {}", status);
    }
}

impl ChangeEventSource for CoreAudioListener {
    fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
        let (sender, subscription) = Subscription::channel();
        let registration = Registration::register(sender)?;
        Ok(subscription.with_guard(Box::new(registration)))
    }
}

/// Keeps the listener registered and removes it on drop.
///
/// The sender is leaked, not freed: the HAL may still be running a callback
/// on its own thread when the listener is removed.
struct Registration {
    client_data: &'static UnboundedSender<DeviceChanged>,
}

impl Registration {
    fn register(sender: UnboundedSender<DeviceChanged>) -> Result<Self, SubscriptionError> {
        let client_data = Box::into_raw(Box::new(sender));

        let result = unsafe {
            AudioObjectAddPropertyListener(
                kAudioObjectSystemObject,
                &DEFAULT_OUTPUT_ADDRESS,
                Some(default_output_listener),
                client_data as *mut c_void,
            )
        };

        if result != NO_ERROR {
            error!("Failed to register default output listener: {}", result);
            // Registration failed, so the HAL holds no reference to the sender.
            drop(unsafe { Box::from_raw(client_data) });
            return Err(SubscriptionError::Register(result));
        }

        info!("Default output listener registered");
        Ok(Self {
            client_data: unsafe { &*client_data },
        })
    }

    fn client_data(&self) -> *mut c_void {
        self.client_data as *const UnboundedSender<DeviceChanged> as *mut c_void
    }
}

impl ListenerGuard for Registration {}

impl Drop for Registration {
    fn drop(&mut self) {
        let status = unsafe {
            AudioObjectRemovePropertyListener(
                kAudioObjectSystemObject,
                &DEFAULT_OUTPUT_ADDRESS,
                Some(default_output_listener),
                self.client_data(),
            )
        };
        if status != NO_ERROR {
            warn!("Failed to remove default output listener: {}", status);
        }
        info!("Default output listener removed");
    }
}

unsafe extern "C" fn default_output_listener(
    _in_object_id: AudioObjectID,
    _in_number_addresses: UInt32,
    _in_addresses: *const AudioObjectPropertyAddress,
    in_client_data: *mut c_void,
) -> OSStatus {
    if !in_client_data.is_null() {
        let sender = unsafe { &*(in_client_data as *const UnboundedSender<DeviceChanged>) };
        if sender.send(DeviceChanged).is_err() {
            debug!("Default output changed but nobody is listening");
        }
    }
    NO_ERROR
}
