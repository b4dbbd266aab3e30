//! Default-output change notifications as a signal-only async sequence.

use tokio::sync::mpsc;

/// "The default output device changed." Carries no payload; consumers
/// re-query the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceChanged;

/// Held by a [`Subscription`] for as long as notifications should flow.
/// Dropping it unregisters the platform listener.
pub trait ListenerGuard: Send {}

/// A live subscription to default-output changes.
///
/// `next` yields one tick per notification and returns `None` only when the
/// underlying listener has failed.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<DeviceChanged>,
    _guard: Option<Box<dyn ListenerGuard>>,
}

impl Subscription {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<DeviceChanged>,
        guard: Option<Box<dyn ListenerGuard>>,
    ) -> Self {
        Self {
            receiver,
            _guard: guard,
        }
    }

    /// Create a subscription together with the sender that feeds it.
    pub fn channel() -> (mpsc::UnboundedSender<DeviceChanged>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, None))
    }

    pub fn with_guard(mut self, guard: Box<dyn ListenerGuard>) -> Self {
        self._guard = Some(guard);
        self
    }

    pub async fn next(&mut self) -> Option<DeviceChanged> {
        self.receiver.recv().await
    }
}
