// SPDX-License-Identifier: MPL-2.0
//! Change events and subscriber plumbing.
//!
//! Every queue mutation is reported to subscribers as a [`DeliveryEvent`]
//! together with the post-mutation display order. Listeners are invoked
//! after the engine lock is released, so they may call back into the engine.

use crate::notification::{Notification, NotificationId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// A change to the active notification set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEvent {
    /// The notification entered the queue.
    Admitted(NotificationId),
    /// Removed by the admission policy to respect capacity. Also reported
    /// for a newcomer that sorted below the capacity cutoff on arrival.
    Evicted(NotificationId),
    /// Removed by user or programmatic dismissal.
    Dismissed(NotificationId),
    /// Removed because its lifecycle timer fired.
    Expired(NotificationId),
    /// Removed by a clear of the whole queue.
    Cleared(NotificationId),
}

impl DeliveryEvent {
    /// Returns the id the event refers to.
    #[must_use]
    pub fn id(&self) -> NotificationId {
        match *self {
            DeliveryEvent::Admitted(id)
            | DeliveryEvent::Evicted(id)
            | DeliveryEvent::Dismissed(id)
            | DeliveryEvent::Expired(id)
            | DeliveryEvent::Cleared(id) => id,
        }
    }
}

/// Callback invoked with the new display order and the event that produced
/// it.
pub type ChangeListener = dyn Fn(&[Notification], &DeliveryEvent) + Send + Sync;

/// Registered listeners, keyed by token for targeted removal.
pub(crate) struct ListenerRegistry {
    entries: Mutex<Vec<(u64, Arc<ChangeListener>)>>,
    next_token: AtomicU64,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(0),
        }
    }

    /// Adds a listener and returns its removal token.
    pub(crate) fn register(&self, listener: Arc<ChangeListener>) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((token, listener));
        }
        token
    }

    /// Removes the listener registered under `token`, if still present.
    pub(crate) fn remove(&self, token: u64) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|(t, _)| *t != token);
        }
    }

    /// Returns the current listeners for invocation outside the lock.
    pub(crate) fn snapshot(&self) -> Vec<Arc<ChangeListener>> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

/// Handle to a registered listener.
///
/// The listener stays registered until this handle is dropped or
/// [`unsubscribe`](Subscription::unsubscribe) is called;
/// [`detach`](Subscription::detach) keeps it registered for the engine's
/// lifetime.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    token: u64,
    attached: bool,
}

impl Subscription {
    pub(crate) fn new(registry: Weak<ListenerRegistry>, token: u64) -> Self {
        Self {
            registry,
            token,
            attached: true,
        }
    }

    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Consumes the handle, leaving the listener registered until the engine
    /// is dropped.
    pub fn detach(mut self) {
        self.attached = false;
    }

    fn remove(&mut self) {
        if self.attached {
            self.attached = false;
            if let Some(registry) = self.registry.upgrade() {
                registry.remove(self.token);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
