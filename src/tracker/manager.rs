use tracing::{debug, error, info, warn};

use super::decision::{PolicyDecision, evaluate};
use crate::audio::{AudioEndpoint, TransportCategory};
use crate::config::PolicyConfig;
use crate::error::NoDeviceFoundError;
use crate::system::DeviceInspector;

/// Resolve the starting preferred device.
///
/// The current default wins if it is not a cast device. Otherwise the output
/// endpoints are searched one category at a time in `fallback_order` and the
/// first match is taken. Query failures along the way are logged and treated
/// as "nothing found at this step".
pub fn resolve_preferred<I: DeviceInspector>(
    inspector: &I,
    fallback_order: &[TransportCategory],
) -> Result<AudioEndpoint, NoDeviceFoundError> {
    match inspector.default_output_endpoint() {
        Ok(current) if current.is_eligible() => {
            info!("Using current default output as preferred: {}", current);
            return Ok(current);
        }
        Ok(current) => {
            info!(
                "Current default output {} is a cast device, searching for a fallback",
                current
            );
        }
        Err(e) => warn!("Could not read default output at startup: {}", e),
    }

    let endpoints = inspector.list_output_endpoints().unwrap_or_else(|e| {
        warn!("Could not enumerate output devices at startup: {}", e);
        Vec::new()
    });
    debug!("Searching {} output endpoints for a fallback", endpoints.len());

    for category in fallback_order.iter().filter(|c| c.is_eligible()) {
        if let Some(endpoint) = endpoints.iter().find(|e| e.transport == *category) {
            info!("Using fallback {} device as preferred: {}", category, endpoint);
            return Ok(endpoint.clone());
        }
    }

    Err(NoDeviceFoundError {
        searched: fallback_order.to_vec(),
    })
}

/// Tracks the preferred output device and reverts away from cast devices.
///
/// A tracker only exists once a preferred device has been resolved, and the
/// preferred device is never a wireless-cast endpoint.
pub struct PreferredDeviceTracker<I: DeviceInspector> {
    inspector: I,
    preferred: AudioEndpoint,
    follow_user_selection: bool,
}

impl<I: DeviceInspector> PreferredDeviceTracker<I> {
    pub fn initialize(inspector: I, policy: &PolicyConfig) -> Result<Self, NoDeviceFoundError> {
        let preferred = resolve_preferred(&inspector, &policy.fallback_order)?;

        Ok(Self {
            inspector,
            preferred,
            follow_user_selection: policy.follow_user_selection,
        })
    }

    pub fn preferred(&self) -> &AudioEndpoint {
        &self.preferred
    }

    pub fn inspector(&self) -> &I {
        &self.inspector
    }

    /// Run one evaluation cycle for a change notification and apply its
    /// decision. Returns the decision that was taken.
    pub fn on_device_change_event(&mut self) -> PolicyDecision {
        let current = match self.inspector.default_output_endpoint() {
            Ok(current) => current,
            Err(e) => {
                warn!("Ignoring change notification, default output query failed: {}", e);
                return PolicyDecision::NoAction;
            }
        };
        debug!("Default output is now: {}", current);

        let decision = evaluate(&self.preferred, &current, self.follow_user_selection);
        self.apply(&decision);
        decision
    }

    fn apply(&mut self, decision: &PolicyDecision) {
        match decision {
            PolicyDecision::NoAction => {}
            PolicyDecision::UpdatePreferred(endpoint) => {
                info!(
                    previous = %self.preferred,
                    preferred = %endpoint,
                    "Preferred output updated"
                );
                self.preferred = endpoint.clone();
            }
            PolicyDecision::RevertTo(endpoint) => {
                info!(target_device = %endpoint, "Cast device selected, reverting output");
                match self.inspector.set_default_output_endpoint(endpoint.id) {
                    Ok(()) => info!("Audio output switched back to: {}", endpoint),
                    Err(e) => error!("Failed to revert default output: {}", e),
                }
            }
        }
    }
}
