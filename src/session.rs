//! Session lifetime and cancellation.
//!
//! Every controller owns a [`SessionScope`]. Cancelling it marks the session
//! discarded: pending fetches stop waiting and late results are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cloneable cancellation flag with async wake-up.
#[derive(Clone, Default)]
pub struct SessionScope {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl SessionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// End the session. Idempotent.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session scope cancelled");
            self.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        // Register before checking the flag, otherwise a cancel between the
        // check and the await is lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl std::fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScope")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
