// SPDX-License-Identifier: MPL-2.0
//! Bounded, severity-ordered notification storage.
//!
//! The queue keeps active notifications sorted by descending severity and,
//! within equal severity, by arrival order. One ordering serves display and
//! eviction selection, so what is shown and what is protected from eviction
//! can never disagree.

use crate::config::{DEFAULT_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};
use crate::notification::{Notification, NotificationId, Severity};
use crate::timer::LifecycleTimer;
use std::cmp::Reverse;

// =============================================================================
// QueueCapacity
// =============================================================================

/// Active notification capacity.
///
/// This newtype enforces validity at the type level, ensuring the value is
/// always within the valid range (1–32 notifications).
///
/// # Example
///
/// ```
/// use toast_cue::queue::QueueCapacity;
///
/// let capacity = QueueCapacity::new(5);
/// assert_eq!(capacity.value(), 5);
///
/// // Values outside range are clamped
/// let too_high = QueueCapacity::new(1000);
/// assert_eq!(too_high.value(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueCapacity(usize);

impl QueueCapacity {
    /// Creates a new capacity, clamping to the valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY))
    }

    /// Returns the value as usize.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for QueueCapacity {
    fn default() -> Self {
        Self(DEFAULT_QUEUE_CAPACITY)
    }
}

// =============================================================================
// Admission
// =============================================================================

/// Result of admitting a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// Inserted without displacing anything.
    Admitted,
    /// Inserted; the listed notifications were evicted to restore capacity.
    AdmittedWithEvictions(Vec<NotificationId>),
    /// The newcomer sorted below the capacity cutoff and was never
    /// inserted. Its timer is not created and no cue plays.
    EvictedOnArrival,
}

/// One active notification together with its expiry timer.
///
/// Dropping the entry drops the timer, which cancels it.
struct Entry {
    seq: u64,
    notification: Notification,
    timer: LifecycleTimer,
}

impl Entry {
    fn sort_key(&self) -> (Reverse<Severity>, u64) {
        (Reverse(self.notification.severity()), self.seq)
    }
}

// =============================================================================
// NotificationQueue
// =============================================================================

/// The bounded, priority-ordered collection owning all active notifications.
pub struct NotificationQueue {
    /// Sorted by `(severity desc, seq asc)`.
    entries: Vec<Entry>,
    capacity: QueueCapacity,
    next_seq: u64,
}

impl NotificationQueue {
    /// Creates an empty queue with the given capacity.
    #[must_use]
    pub fn new(capacity: QueueCapacity) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.value()),
            capacity,
            next_seq: 0,
        }
    }

    /// Inserts `notification` at its ordering position, evicting from the
    /// tail of the ordering until the count is back at capacity.
    ///
    /// `make_timer` is called only when the notification is actually
    /// inserted, so an instant eviction never arms a timer.
    pub fn admit<F>(&mut self, notification: Notification, make_timer: F) -> AdmitOutcome
    where
        F: FnOnce(&Notification) -> LifecycleTimer,
    {
        // A newcomer ranked strictly below every resident while the queue is
        // full would be the eviction victim itself; skip the insert entirely.
        if self.entries.len() >= self.capacity.value() {
            let lowest = self
                .entries
                .iter()
                .map(|e| e.notification.severity())
                .min();
            if let Some(lowest) = lowest {
                if notification.severity() < lowest {
                    return AdmitOutcome::EvictedOnArrival;
                }
            }
        }

        let timer = make_timer(&notification);
        let entry = Entry {
            seq: self.next_seq,
            notification,
            timer,
        };
        self.next_seq += 1;

        let key = entry.sort_key();
        let pos = self.entries.partition_point(|e| e.sort_key() <= key);
        self.entries.insert(pos, entry);

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity.value() {
            // Victim: lowest severity, oldest arrival within it.
            let victim = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| (e.notification.severity(), e.seq))
                .map(|(i, _)| i);
            let Some(victim) = victim else { break };
            let mut entry = self.entries.remove(victim);
            entry.timer.cancel();
            evicted.push(entry.notification.id());
        }

        if evicted.is_empty() {
            AdmitOutcome::Admitted
        } else {
            AdmitOutcome::AdmittedWithEvictions(evicted)
        }
    }

    /// Removes the entry with `id` if present, cancelling its timer.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        if let Some(pos) = self.entries.iter().position(|e| e.notification.id() == id) {
            let mut entry = self.entries.remove(pos);
            entry.timer.cancel();
            return true;
        }
        false
    }

    /// Removes all entries, cancelling all timers.
    ///
    /// Returns the removed ids in former display order.
    pub fn clear(&mut self) -> Vec<NotificationId> {
        self.entries
            .drain(..)
            .map(|mut e| {
                e.timer.cancel();
                e.notification.id()
            })
            .collect()
    }

    /// Returns the notifications in current display order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().map(|e| &e.notification)
    }

    /// Returns a cloned snapshot in current display order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.iter().cloned().collect()
    }

    /// Returns whether `id` is currently active.
    #[must_use]
    pub fn contains(&self, id: NotificationId) -> bool {
        self.entries.iter().any(|e| e.notification.id() == id)
    }

    /// Returns the number of active notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> QueueCapacity {
        self.capacity
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(QueueCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationRequest;
    use std::time::Duration;

    fn admit_plain(queue: &mut NotificationQueue, severity: Severity) -> NotificationId {
        let request = NotificationRequest::new("test").with_severity(severity);
        let notification = Notification::admit(request, Duration::from_secs(5));
        let id = notification.id();
        queue.admit(notification, |_| LifecycleTimer::disarmed());
        id
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = NotificationQueue::default();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.capacity().value(), DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn display_order_is_severity_desc_then_arrival() {
        let mut queue = NotificationQueue::default();
        let normal = admit_plain(&mut queue, Severity::Normal);
        let critical = admit_plain(&mut queue, Severity::Critical);
        let low = admit_plain(&mut queue, Severity::Low);
        let high = admit_plain(&mut queue, Severity::High);

        let order: Vec<NotificationId> = queue.iter().map(Notification::id).collect();
        assert_eq!(order, vec![critical, high, normal, low]);
    }

    #[test]
    fn equal_severity_preserves_arrival_order() {
        let mut queue = NotificationQueue::default();
        let first = admit_plain(&mut queue, Severity::Normal);
        let second = admit_plain(&mut queue, Severity::Normal);
        let third = admit_plain(&mut queue, Severity::Normal);

        let order: Vec<NotificationId> = queue.iter().map(Notification::id).collect();
        assert_eq!(order, vec![first, second, third]);
    }

    #[test]
    fn admission_over_capacity_evicts_oldest_of_lowest_severity() {
        let mut queue = NotificationQueue::new(QueueCapacity::new(5));
        let mut normals = Vec::new();
        for _ in 0..5 {
            normals.push(admit_plain(&mut queue, Severity::Normal));
        }

        let request = NotificationRequest::new("critical").with_severity(Severity::Critical);
        let notification = Notification::admit(request, Duration::from_secs(10));
        let critical_id = notification.id();
        let outcome = queue.admit(notification, |_| LifecycleTimer::disarmed());

        assert_eq!(
            outcome,
            AdmitOutcome::AdmittedWithEvictions(vec![normals[0]])
        );
        assert_eq!(queue.len(), 5);

        let order: Vec<NotificationId> = queue.iter().map(Notification::id).collect();
        assert_eq!(
            order,
            vec![critical_id, normals[1], normals[2], normals[3], normals[4]]
        );
    }

    #[test]
    fn low_arrival_into_full_higher_severity_queue_is_evicted_on_arrival() {
        let mut queue = NotificationQueue::new(QueueCapacity::new(2));
        admit_plain(&mut queue, Severity::High);
        admit_plain(&mut queue, Severity::High);

        let request = NotificationRequest::new("low").with_severity(Severity::Low);
        let notification = Notification::admit(request, Duration::from_secs(5));
        let mut factory_called = false;
        let outcome = queue.admit(notification, |_| {
            factory_called = true;
            LifecycleTimer::disarmed()
        });

        assert_eq!(outcome, AdmitOutcome::EvictedOnArrival);
        assert!(!factory_called, "instant eviction must not create a timer");
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn equal_severity_arrival_into_full_queue_evicts_the_oldest_resident() {
        let mut queue = NotificationQueue::new(QueueCapacity::new(2));
        let oldest = admit_plain(&mut queue, Severity::Normal);
        let middle = admit_plain(&mut queue, Severity::Normal);
        let newest = admit_plain(&mut queue, Severity::Normal);

        let order: Vec<NotificationId> = queue.iter().map(Notification::id).collect();
        assert_eq!(order, vec![middle, newest]);
        assert!(!queue.contains(oldest));
    }

    #[test]
    fn remove_existing_returns_true() {
        let mut queue = NotificationQueue::default();
        let id = admit_plain(&mut queue, Severity::Normal);

        assert!(queue.remove(id));
        assert!(queue.is_empty());
        assert!(!queue.contains(id));
    }

    #[test]
    fn remove_unknown_returns_false() {
        let mut queue = NotificationQueue::default();
        admit_plain(&mut queue, Severity::Normal);

        let foreign = Notification::admit(NotificationRequest::new("x"), Duration::from_secs(5));
        assert!(!queue.remove(foreign.id()));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn clear_returns_ids_in_display_order_and_empties() {
        let mut queue = NotificationQueue::default();
        let normal = admit_plain(&mut queue, Severity::Normal);
        let critical = admit_plain(&mut queue, Severity::Critical);

        let cleared = queue.clear();
        assert_eq!(cleared, vec![critical, normal]);
        assert!(queue.is_empty());
    }

    #[test]
    fn snapshot_clones_current_order() {
        let mut queue = NotificationQueue::default();
        let low = admit_plain(&mut queue, Severity::Low);
        let high = admit_plain(&mut queue, Severity::High);

        let snapshot = queue.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id(), high);
        assert_eq!(snapshot[1].id(), low);
    }

    #[test]
    fn queue_capacity_clamps() {
        assert_eq!(QueueCapacity::new(0).value(), MIN_QUEUE_CAPACITY);
        assert_eq!(QueueCapacity::new(1000).value(), MAX_QUEUE_CAPACITY);
        assert_eq!(QueueCapacity::new(7).value(), 7);
    }

    #[test]
    fn queue_capacity_default() {
        assert_eq!(QueueCapacity::default().value(), DEFAULT_QUEUE_CAPACITY);
    }
}
