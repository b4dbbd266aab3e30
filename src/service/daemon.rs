use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::signals::SignalType;
use crate::audio::Subscription;
use crate::config::Config;
use crate::error::{NoDeviceFoundError, SubscriptionError};
use crate::system::{ChangeEventSource, DeviceInspector};
use crate::tracker::{PolicyDecision, PreferredDeviceTracker};

/// Counters reported when the service stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub evaluations: u64,
    pub preferred_updates: u64,
    pub reverts: u64,
}

/// The single consumer of change notifications. Each tick is evaluated to
/// completion, revert included, before the next one is read.
pub struct GuardService<I: DeviceInspector> {
    tracker: PreferredDeviceTracker<I>,
    slow_evaluation: Duration,
    stats: ServiceStats,
}

impl<I: DeviceInspector> GuardService<I> {
    /// Resolve the preferred device. Fails before any event is watched.
    pub fn start(inspector: I, config: &Config) -> Result<Self, NoDeviceFoundError> {
        let tracker = PreferredDeviceTracker::initialize(inspector, &config.policy)?;
        info!("Preferred output resolved: {}", tracker.preferred());

        Ok(Self {
            tracker,
            slow_evaluation: Duration::from_millis(config.service.slow_evaluation_warn_ms),
            stats: ServiceStats::default(),
        })
    }

    pub fn tracker(&self) -> &PreferredDeviceTracker<I> {
        &self.tracker
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }

    /// Evaluate one notification
    pub fn handle_tick(&mut self) -> PolicyDecision {
        let started = Instant::now();
        let decision = self.tracker.on_device_change_event();
        let elapsed = started.elapsed();

        self.stats.evaluations += 1;
        match &decision {
            PolicyDecision::NoAction => debug!("No action needed"),
            PolicyDecision::UpdatePreferred(_) => self.stats.preferred_updates += 1,
            PolicyDecision::RevertTo(_) => self.stats.reverts += 1,
        }

        if elapsed > self.slow_evaluation {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Device change evaluation was slow"
            );
        }

        decision
    }

    /// Consume notifications until shutdown is requested (`Ok`) or the
    /// subscription ends (`Err`).
    pub async fn run(
        &mut self,
        mut subscription: Subscription,
        mut control: mpsc::UnboundedReceiver<SignalType>,
    ) -> Result<ServiceStats, SubscriptionError> {
        info!("Monitoring default output changes");
        let mut control_open = true;

        loop {
            tokio::select! {
                biased;

                signal = control.recv(), if control_open => match signal {
                    Some(SignalType::Shutdown) => {
                        info!(
                            evaluations = self.stats.evaluations,
                            reverts = self.stats.reverts,
                            "Shutdown requested, stopping monitor"
                        );
                        return Ok(self.stats);
                    }
                    Some(SignalType::Recheck) => {
                        info!("Re-evaluating default output on request");
                        self.handle_tick();
                    }
                    None => control_open = false,
                },

                tick = subscription.next() => match tick {
                    Some(_) => {
                        self.handle_tick();
                    }
                    None => {
                        error!("Default output notifications stopped");
                        return Err(SubscriptionError::Ended);
                    }
                },
            }
        }
    }
}

/// Resolve, subscribe and run until shutdown.
pub async fn run_daemon<I, E>(
    inspector: I,
    events: &E,
    config: &Config,
    control: mpsc::UnboundedReceiver<SignalType>,
) -> Result<ServiceStats>
where
    I: DeviceInspector,
    E: ChangeEventSource,
{
    let mut service = GuardService::start(inspector, config)
        .context("Cannot start without a preferred output device")?;

    let subscription = events
        .subscribe()
        .context("Failed to watch default output changes")?;

    let stats = service.run(subscription, control).await?;
    info!(
        "Service stopped after {} evaluations ({} preferred updates, {} reverts)",
        stats.evaluations, stats.preferred_updates, stats.reverts
    );
    Ok(stats)
}
