//! The run-scoped stop signal.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// Stop signal shared by everything that works on one pipeline run.
///
/// Tripping it is one-way: later calls to [`CancellationToken::cancel`] are
/// ignored and the first reason sticks, so the failure reported for the
/// stage in flight names what actually stopped the run.
#[derive(Default)]
pub struct CancellationToken {
    tripped: AtomicBool,
    reason: RwLock<Option<String>>,
    waiters: Notify,
}

impl CancellationToken {
    /// A token that has not been tripped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token and wakes every task awaiting [`Self::cancelled`].
    pub fn cancel(&self, reason: impl Into<String>) {
        {
            // The reason is stored before the flag flips, so anyone who sees
            // the token tripped also sees why.
            let mut slot = self.reason.write();
            if slot.is_some() {
                return;
            }
            let reason = reason.into();
            debug!(%reason, "Run cancelled");
            *slot = Some(reason);
            self.tripped.store(true, Ordering::SeqCst);
        }
        self.waiters.notify_waiters();
    }

    /// Whether the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// Why the token was tripped.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Completes once the token is tripped.
    pub async fn cancelled(&self) {
        loop {
            // Create the waiter before reading the flag; a cancel landing in
            // between still wakes it.
            let woken = self.waiters.notified();
            if self.is_cancelled() {
                return;
            }
            woken.await;
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("tripped", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish_non_exhaustive()
    }
}
