//! Notification dispatch contract
//!
//! Fired once per real status transition, never on duplicate deliveries.
//! Fire-and-forget: a dispatcher failure must not roll back the settlement,
//! so the contract is infallible from the caller's point of view.

use shared::models::AttendeeStatus;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives `(payment_token, from, to)` on every real transition
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, payment_token: &str, from: AttendeeStatus, to: AttendeeStatus);
}

/// Default dispatcher: structured log line per transition
///
/// Mail/webhook delivery lives outside this crate; operators tail the
/// `settlement` target or swap in their own dispatcher.
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn notify(&self, payment_token: &str, from: AttendeeStatus, to: AttendeeStatus) {
        tracing::info!(
            target: "settlement",
            payment_token = %payment_token,
            from = from.as_str(),
            to = to.as_str(),
            "Status changed, notification dispatched"
        );
    }
}

/// Counting dispatcher for tests and local runs
#[derive(Default)]
pub struct CountingDispatcher {
    fired: AtomicUsize,
}

impl CountingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications fired so far
    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl NotificationDispatcher for CountingDispatcher {
    fn notify(&self, payment_token: &str, from: AttendeeStatus, to: AttendeeStatus) {
        self.fired.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            payment_token = %payment_token,
            from = from.as_str(),
            to = to.as_str(),
            "CountingDispatcher notified"
        );
    }
}
