use anyhow::Result;
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// Signal types that can be received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// SIGTERM / SIGINT
    Shutdown,
    /// SIGHUP: evaluate the current default output now
    Recheck,
}

impl SignalType {
    pub fn from_raw(signal: i32) -> Option<Self> {
        match signal {
            SIGTERM | SIGINT => Some(SignalType::Shutdown),
            SIGHUP => Some(SignalType::Recheck),
            _ => None,
        }
    }
}

/// Forwards process signals to the service loop
pub struct SignalHandler {
    signal_sender: mpsc::UnboundedSender<SignalType>,
}

impl SignalHandler {
    pub fn new(signal_sender: mpsc::UnboundedSender<SignalType>) -> Self {
        Self { signal_sender }
    }

    /// Register handlers and spawn a task that forwards signals until
    /// shutdown is requested or the receiver goes away.
    pub fn spawn(self) -> Result<tokio::task::JoinHandle<()>> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGHUP])?;
        info!("Signal handler initialized, listening for SIGTERM, SIGINT, SIGHUP");

        Ok(tokio::spawn(async move {
            self.forward(signals).await;
        }))
    }

    async fn forward(self, mut signals: Signals) {
        while let Some(signal) = signals.next().await {
            let Some(kind) = SignalType::from_raw(signal) else {
                warn!("Received unexpected signal: {}", signal);
                continue;
            };

            info!("Received signal {} ({:?})", signal, kind);
            if self.signal_sender.send(kind).is_err() || kind == SignalType::Shutdown {
                break;
            }
        }
    }
}
