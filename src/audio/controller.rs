use anyhow::Result;
use core_foundation::base::TCFType;
use core_foundation::string::{CFString, CFStringRef};
use coreaudio_sys::*;
use std::os::raw::c_void;
use std::ptr;
use tracing::{debug, info, warn};

use super::device::{AudioEndpoint, DeviceId};
use super::transport::four_char_code;
use crate::error::{CommandError, QueryError};
use crate::system::DeviceInspector;

const NO_ERROR: OSStatus = kAudioHardwareNoError as OSStatus;

fn global_address(selector: AudioObjectPropertySelector) -> AudioObjectPropertyAddress {
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: kAudioObjectPropertyScopeGlobal,
        mElement: kAudioObjectPropertyElementMain,
    }
}

/// Number of `AudioBuffer` entries that are both reported and actually
/// present in a stream configuration of `property_size` bytes
fn buffer_count(property_size: u32, reported: u32) -> usize {
    let header = std::mem::offset_of!(AudioBufferList, mBuffers);
    let fits =
        (property_size as usize).saturating_sub(header) / std::mem::size_of::<AudioBuffer>();
    fits.min(reported as usize)
}

/// Total channels of a stream configuration written by the HAL.
///
/// `mBuffers` is declared with one element but holds `mNumberBuffers`, so the
/// list is only ever read through raw pointers.
///
/// # Safety
/// `list` must point to `property_size` readable, pointer-aligned bytes.
unsafe fn sum_channels(list: *const AudioBufferList, property_size: u32) -> u32 {
    unsafe {
        let first = ptr::addr_of!((*list).mBuffers) as *const AudioBuffer;
        let count = buffer_count(property_size, (*list).mNumberBuffers);
        (0..count).map(|i| (*first.add(i)).mNumberChannels).sum()
    }
}

/// Device inspector backed by the CoreAudio hardware abstraction layer
pub struct DeviceController;

impl DeviceController {
    pub fn new() -> Result<Self> {
        info!("Initialized CoreAudio device controller");
        Ok(Self)
    }

    fn all_device_ids(&self) -> Result<Vec<DeviceId>, QueryError> {
        let address = global_address(kAudioHardwarePropertyDevices);

        unsafe {
            let mut property_size: u32 = 0;
            let status = AudioObjectGetPropertyDataSize(
                kAudioObjectSystemObject,
                &address,
                0,
                ptr::null(),
                &mut property_size,
            );
            if status != NO_ERROR {
                return Err(QueryError::Property {
                    property: "device list size",
                    device: kAudioObjectSystemObject,
                    status,
                });
            }

            let device_count = property_size as usize / std::mem::size_of::<AudioDeviceID>();
            let mut devices: Vec<AudioDeviceID> = vec![0; device_count];

            let status = AudioObjectGetPropertyData(
                kAudioObjectSystemObject,
                &address,
                0,
                ptr::null(),
                &mut property_size,
                devices.as_mut_ptr() as *mut c_void,
            );
            if status != NO_ERROR {
                return Err(QueryError::Property {
                    property: "device list",
                    device: kAudioObjectSystemObject,
                    status,
                });
            }

            // The list can shrink between the two calls.
            devices.truncate(property_size as usize / std::mem::size_of::<AudioDeviceID>());
            Ok(devices)
        }
    }

    /// Number of output channels across all output streams of a device
    fn output_channel_count(&self, device_id: DeviceId) -> u32 {
        let address = AudioObjectPropertyAddress {
            mSelector: kAudioDevicePropertyStreamConfiguration,
            mScope: kAudioObjectPropertyScopeOutput,
            mElement: kAudioObjectPropertyElementMain,
        };

        unsafe {
            let mut property_size: u32 = 0;
            let status = AudioObjectGetPropertyDataSize(
                device_id,
                &address,
                0,
                ptr::null(),
                &mut property_size,
            );
            if status != NO_ERROR || property_size == 0 {
                return 0;
            }

            // u64 backing keeps the AudioBufferList pointer-aligned.
            let words = (property_size as usize).div_ceil(std::mem::size_of::<u64>());
            let mut buffer = vec![0u64; words];
            let status = AudioObjectGetPropertyData(
                device_id,
                &address,
                0,
                ptr::null(),
                &mut property_size,
                buffer.as_mut_ptr() as *mut c_void,
            );
            if status != NO_ERROR {
                return 0;
            }

            sum_channels(buffer.as_ptr() as *const AudioBufferList, property_size)
        }
    }

    fn endpoint(&self, device_id: DeviceId) -> Result<AudioEndpoint, QueryError> {
        let code = self.transport_code(device_id)?;
        Ok(AudioEndpoint::from_transport_code(
            device_id,
            self.name(device_id),
            &code,
        ))
    }
}

impl DeviceInspector for DeviceController {
    fn list_output_endpoints(&self) -> Result<Vec<AudioEndpoint>, QueryError> {
        let mut endpoints = Vec::new();

        for device_id in self.all_device_ids()? {
            if self.output_channel_count(device_id) == 0 {
                continue;
            }
            match self.endpoint(device_id) {
                Ok(endpoint) => endpoints.push(endpoint),
                Err(e) => warn!("Skipping device {}: {}", device_id, e),
            }
        }

        debug!("Enumerated {} output endpoints", endpoints.len());
        Ok(endpoints)
    }

    fn default_output_endpoint(&self) -> Result<AudioEndpoint, QueryError> {
        let address = global_address(kAudioHardwarePropertyDefaultOutputDevice);
        let mut device_id: AudioDeviceID = kAudioObjectUnknown;
        let mut property_size = std::mem::size_of::<AudioDeviceID>() as u32;

        let status = unsafe {
            AudioObjectGetPropertyData(
                kAudioObjectSystemObject,
                &address,
                0,
                ptr::null(),
                &mut property_size,
                &mut device_id as *mut _ as *mut c_void,
            )
        };
        if status != NO_ERROR {
            return Err(QueryError::Property {
                property: "default output device",
                device: kAudioObjectSystemObject,
                status,
            });
        }
        if device_id == kAudioObjectUnknown {
            return Err(QueryError::NoDefaultDevice);
        }

        self.endpoint(device_id)
    }

    fn set_default_output_endpoint(&self, id: DeviceId) -> Result<(), CommandError> {
        let address = global_address(kAudioHardwarePropertyDefaultOutputDevice);

        let status = unsafe {
            AudioObjectSetPropertyData(
                kAudioObjectSystemObject,
                &address,
                0,
                ptr::null(),
                std::mem::size_of::<AudioDeviceID>() as u32,
                &id as *const _ as *const c_void,
            )
        };
        if status != NO_ERROR {
            return Err(CommandError::SetDefaultOutput { device: id, status });
        }

        debug!("Set default output device ID: {}", id);
        Ok(())
    }

    fn transport_code(&self, id: DeviceId) -> Result<String, QueryError> {
        let address = global_address(kAudioDevicePropertyTransportType);
        let mut transport: u32 = 0;
        let mut property_size = std::mem::size_of::<u32>() as u32;

        let status = unsafe {
            AudioObjectGetPropertyData(
                id,
                &address,
                0,
                ptr::null(),
                &mut property_size,
                &mut transport as *mut _ as *mut c_void,
            )
        };
        if status != NO_ERROR {
            return Err(QueryError::Property {
                property: "transport type",
                device: id,
                status,
            });
        }

        Ok(four_char_code(transport))
    }

    fn name(&self, id: DeviceId) -> Option<String> {
        let address = global_address(kAudioObjectPropertyName);

        unsafe {
            let mut property_size = std::mem::size_of::<CFStringRef>() as u32;
            let mut cf_string: CFStringRef = ptr::null();

            let status = AudioObjectGetPropertyData(
                id,
                &address,
                0,
                ptr::null(),
                &mut property_size,
                &mut cf_string as *mut _ as *mut c_void,
            );
            if status != NO_ERROR || cf_string.is_null() {
                debug!("Device {} has no name (status {})", id, status);
                return None;
            }

            // The HAL hands back a +1 reference.
            Some(CFString::wrap_under_create_rule(cf_string).to_string())
        }
    }
}
