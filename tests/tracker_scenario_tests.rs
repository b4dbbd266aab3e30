use audio_cast_guard::config::PolicyConfig;
use audio_cast_guard::system::MockAudioSystem;
use audio_cast_guard::{PolicyDecision, PreferredDeviceTracker, TransportCategory};

mod test_utils;
use test_utils::{EndpointBuilder, scenarios};

/// End-to-end tracker behavior against the mock audio system
#[cfg(test)]
mod tracker_scenarios {
    use super::*;

    fn policy() -> PolicyConfig {
        PolicyConfig::default()
    }

    #[test]
    fn test_revert_from_airplay_to_builtin() {
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();
        assert_eq!(tracker.preferred(), &scenarios::speakers());

        system.set_mock_default_output(Some(scenarios::living_room_tv()));
        let decision = tracker.on_device_change_event();

        assert_eq!(decision, PolicyDecision::RevertTo(scenarios::speakers()));
        assert_eq!(tracker.preferred(), &scenarios::speakers());
        assert_eq!(system.get_set_device_calls(), vec![scenarios::speakers().id]);
        assert_eq!(system.current_default_output(), Some(scenarios::speakers()));
    }

    #[test]
    fn test_startup_on_airplay_falls_back_to_builtin() {
        let system = MockAudioSystem::with_devices(vec![
            scenarios::speakers(),
            scenarios::living_room_tv(),
        ]);
        system.set_mock_default_output(Some(scenarios::living_room_tv()));

        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();
        assert_eq!(tracker.preferred(), &scenarios::speakers());
        assert!(system.get_set_device_calls().is_empty());

        let decision = tracker.on_device_change_event();
        assert_eq!(decision, PolicyDecision::RevertTo(scenarios::speakers()));
        assert_eq!(system.current_default_output(), Some(scenarios::speakers()));
    }

    #[test]
    fn test_startup_on_airplay_prefers_bluetooth_fallback() {
        let system = scenarios::system_with_default(scenarios::living_room_tv());

        let tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();
        assert_eq!(tracker.preferred(), &scenarios::headset());
    }

    #[test]
    fn test_user_switch_to_headset_is_adopted_and_then_defended() {
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        system.set_mock_default_output(Some(scenarios::headset()));
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::UpdatePreferred(scenarios::headset())
        );
        assert_eq!(tracker.preferred(), &scenarios::headset());

        system.set_mock_default_output(Some(scenarios::kitchen_speaker()));
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::RevertTo(scenarios::headset())
        );
        assert_eq!(system.get_set_device_calls(), vec![scenarios::headset().id]);
    }

    #[test]
    fn test_no_devices_fails_initialization() {
        let system = MockAudioSystem::new();

        let err = PreferredDeviceTracker::initialize(&system, &policy())
            .err()
            .expect("initialization should fail");
        assert_eq!(err.searched, policy().fallback_order);
        assert_eq!(system.subscriber_count(), 0);
    }

    #[test]
    fn test_only_airplay_devices_fails_initialization() {
        let system = MockAudioSystem::with_devices(vec![
            scenarios::living_room_tv(),
            scenarios::kitchen_speaker(),
        ]);
        system.set_mock_default_output(Some(scenarios::living_room_tv()));

        assert!(PreferredDeviceTracker::initialize(&system, &policy()).is_err());
    }

    #[test]
    fn test_repeated_notifications_are_idempotent() {
        let system = scenarios::system_with_default(scenarios::dock());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        assert_eq!(tracker.on_device_change_event(), PolicyDecision::NoAction);
        assert_eq!(tracker.on_device_change_event(), PolicyDecision::NoAction);
        assert_eq!(tracker.preferred(), &scenarios::dock());
        assert!(system.get_set_device_calls().is_empty());
    }

    #[test]
    fn test_revert_does_not_trigger_another_revert() {
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        system.set_mock_default_output(Some(scenarios::living_room_tv()));
        assert!(matches!(
            tracker.on_device_change_event(),
            PolicyDecision::RevertTo(_)
        ));

        // The revert itself produces a notification
        assert_eq!(tracker.on_device_change_event(), PolicyDecision::NoAction);
        assert_eq!(system.get_set_device_calls().len(), 1);
    }

    #[test]
    fn test_failed_revert_is_retried_on_next_notification() {
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        system.set_device_setting_failure(true);
        system.set_mock_default_output(Some(scenarios::living_room_tv()));
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::RevertTo(scenarios::speakers())
        );
        assert!(system.get_set_device_calls().is_empty());
        assert_eq!(tracker.preferred(), &scenarios::speakers());

        system.set_device_setting_failure(false);
        system.trigger_device_change();
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::RevertTo(scenarios::speakers())
        );
        assert_eq!(system.current_default_output(), Some(scenarios::speakers()));
    }

    #[test]
    fn test_unplugged_preferred_device_keeps_preferred_after_failed_revert() {
        let system = scenarios::system_with_default(scenarios::headset());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        system.set_mock_default_output(Some(scenarios::living_room_tv()));
        tracker.on_device_change_event();
        assert_eq!(system.get_set_device_calls(), vec![scenarios::headset().id]);
        system.clear_set_device_calls();

        system.remove_device(scenarios::headset().id);
        system.set_mock_default_output(Some(scenarios::kitchen_speaker()));
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::RevertTo(scenarios::headset())
        );

        assert!(system.get_set_device_calls().is_empty());
        assert_eq!(tracker.preferred(), &scenarios::headset());
        assert_eq!(
            system.current_default_output(),
            Some(scenarios::kitchen_speaker())
        );
    }

    #[test]
    fn test_startup_on_airplay_when_enumeration_fails() {
        let system = scenarios::system_with_default(scenarios::living_room_tv());
        system.set_enumeration_failure(true);

        assert!(PreferredDeviceTracker::initialize(&system, &policy()).is_err());

        system.set_enumeration_failure(false);
        let tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();
        assert_eq!(tracker.preferred(), &scenarios::headset());
    }

    #[test]
    fn test_query_failure_is_no_action() {
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        system.set_default_query_failure(true);
        assert_eq!(tracker.on_device_change_event(), PolicyDecision::NoAction);
        assert_eq!(tracker.preferred(), &scenarios::speakers());
    }

    #[test]
    fn test_unknown_transport_is_adopted() {
        let mystery = EndpointBuilder::new()
            .id(99)
            .unnamed()
            .transport(TransportCategory::Unknown)
            .build();
        let system = scenarios::system_with_default(scenarios::speakers());
        system.add_device(mystery.clone());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        system.set_mock_default_output(Some(mystery.clone()));
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::UpdatePreferred(mystery)
        );
    }

    #[test]
    fn test_pinned_preferred_ignores_user_switches() {
        let pinned = PolicyConfig {
            follow_user_selection: false,
            ..PolicyConfig::default()
        };
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &pinned).unwrap();

        system.set_mock_default_output(Some(scenarios::headset()));
        assert_eq!(tracker.on_device_change_event(), PolicyDecision::NoAction);

        system.set_mock_default_output(Some(scenarios::living_room_tv()));
        assert_eq!(
            tracker.on_device_change_event(),
            PolicyDecision::RevertTo(scenarios::speakers())
        );
    }

    #[test]
    fn test_preferred_never_becomes_airplay() {
        let endpoints = scenarios::typical_endpoints();
        let system = scenarios::system_with_default(scenarios::speakers());
        let mut tracker = PreferredDeviceTracker::initialize(&system, &policy()).unwrap();

        // xorshift keeps the walk deterministic
        let mut state: u32 = 0x9E37_79B9;
        for _ in 0..500 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;

            let next = endpoints[state as usize % endpoints.len()].clone();
            system.set_mock_default_output(Some(next));

            let decision = tracker.on_device_change_event();
            assert_ne!(tracker.preferred().transport, TransportCategory::WirelessCast);

            if let PolicyDecision::RevertTo(target) = decision {
                assert_eq!(&target, tracker.preferred());
                assert_eq!(system.current_default_output().as_ref(), Some(&target));
            }
        }
    }
}
