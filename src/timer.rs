// SPDX-License-Identifier: MPL-2.0
//! Per-notification expiry timers.
//!
//! A `LifecycleTimer` counts down once and then runs its callback. It cannot
//! fail; it fires or it does not. Cancellation takes effect at the sleep
//! point, so a callback that has already slipped past it must be tolerated
//! by the caller.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Fire-once countdown tied to a single notification.
///
/// Dropping the timer cancels it, which ties timer lifetime to the queue
/// entry that owns it.
#[derive(Debug)]
pub struct LifecycleTimer {
    abort: Option<AbortHandle>,
}

impl LifecycleTimer {
    /// Returns a timer that never fires.
    ///
    /// Used for persistent notifications; nothing is scheduled at all.
    #[must_use]
    pub fn disarmed() -> Self {
        Self { abort: None }
    }

    /// Arms the countdown on the given runtime. `on_fire` runs exactly once
    /// after `duration` unless the timer is cancelled or dropped first.
    pub fn arm<F>(runtime: &Handle, duration: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            on_fire();
        });
        Self {
            abort: Some(task.abort_handle()),
        }
    }

    /// Cancels the countdown.
    ///
    /// Idempotent: cancelling an already-fired or already-cancelled timer is
    /// a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
    }

    /// Returns whether a countdown was armed and not yet cancelled.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.abort.is_some()
    }
}

impl Drop for LifecycleTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
