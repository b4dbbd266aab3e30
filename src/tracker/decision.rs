use crate::audio::{AudioEndpoint, TransportCategory};

/// Outcome of one evaluation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    NoAction,
    /// Adopt a non-cast device the user switched to
    UpdatePreferred(AudioEndpoint),
    /// Force the default output back to the preferred device
    RevertTo(AudioEndpoint),
}

/// Decide what to do given the stored preferred device and the current
/// system default. Pure; applying the decision is the tracker's job.
pub fn evaluate(
    preferred: &AudioEndpoint,
    current: &AudioEndpoint,
    follow_user_selection: bool,
) -> PolicyDecision {
    if current.same_device(preferred) {
        return PolicyDecision::NoAction;
    }

    match current.transport {
        TransportCategory::WirelessCast => PolicyDecision::RevertTo(preferred.clone()),
        _ if follow_user_selection => PolicyDecision::UpdatePreferred(current.clone()),
        _ => PolicyDecision::NoAction,
    }
}
