// SPDX-License-Identifier: MPL-2.0
//! Central notification delivery engine.
//!
//! [`DeliveryEngine`] serializes every mutation of the active set through a
//! single lock, so admission, eviction, expiry, and dismissal cannot
//! interleave. Listeners are invoked after the lock is released with the
//! snapshot taken at mutation time; a listener may call back into the
//! engine without deadlocking.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::audio::CuePlayer;
use crate::config::{Config, DEFAULT_QUEUE_CAPACITY};
use crate::events::{DeliveryEvent, ListenerRegistry, Subscription};
use crate::notification::{Notification, NotificationId, NotificationRequest, Severity};
use crate::queue::{AdmitOutcome, NotificationQueue, QueueCapacity};
use crate::timer::LifecycleTimer;

/// Why a notification left the queue outside the admission path.
enum RetireReason {
    Dismissed,
    Expired,
}

struct EngineInner {
    /// All mutations of the active set go through this lock.
    queue: Mutex<NotificationQueue>,
    registry: Arc<ListenerRegistry>,
    cues: CuePlayer,
    /// Runtime that timer tasks are spawned onto.
    runtime: Handle,
    /// Timing overrides; `None` falls back to the severity default.
    default_duration: Option<Duration>,
    critical_duration: Option<Duration>,
}

impl EngineInner {
    /// Removes `id` with the given reason and reports the change.
    ///
    /// Idempotent: an id that is no longer active is a no-op, which makes
    /// the expiry-versus-dismissal race harmless and absorbs unknown ids.
    fn retire(&self, id: NotificationId, reason: RetireReason) {
        let snapshot = {
            let Ok(mut queue) = self.queue.lock() else {
                return;
            };
            if !queue.remove(id) {
                return;
            }
            queue.snapshot()
        };

        let event = match reason {
            RetireReason::Dismissed => DeliveryEvent::Dismissed(id),
            RetireReason::Expired => {
                log::debug!("notification {id} expired");
                DeliveryEvent::Expired(id)
            }
        };
        self.notify(&snapshot, &event);
    }

    /// Invokes all listeners. Callers must not hold the queue lock.
    fn notify(&self, snapshot: &[Notification], event: &DeliveryEvent) {
        for listener in self.registry.snapshot() {
            listener(snapshot, event);
        }
    }
}

/// Thread-safe handle to the delivery engine.
///
/// Cloning is cheap; all clones drive the same notification set. The
/// engine stops cleanly when the last clone is dropped: pending timer
/// tasks are aborted and the audio thread shuts down.
#[derive(Clone)]
pub struct DeliveryEngine {
    inner: Arc<EngineInner>,
}

impl DeliveryEngine {
    /// Creates an engine from the given configuration.
    ///
    /// Opens the audio device eagerly unless `[sound] enabled` is off; if
    /// the device cannot be opened the engine runs silently and logs a
    /// single warning.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, which is needed to
    /// schedule expiry timers.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let capacity =
            QueueCapacity::new(config.queue.capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY));
        let sound_enabled = config.sound.enabled.unwrap_or(true);
        let muted = config.sound.muted.unwrap_or(false);

        Self {
            inner: Arc::new(EngineInner {
                queue: Mutex::new(NotificationQueue::new(capacity)),
                registry: Arc::new(ListenerRegistry::new()),
                cues: CuePlayer::new(sound_enabled, muted),
                runtime: Handle::current(),
                default_duration: config.timing.default_duration_ms.map(Duration::from_millis),
                critical_duration: config
                    .timing
                    .critical_duration_ms
                    .map(Duration::from_millis),
            }),
        }
    }

    /// Admits a notification and returns its id.
    ///
    /// The id is returned even when the notification is evicted on
    /// arrival, so callers can correlate it with the `Evicted` event.
    /// Non-persistent notifications get an expiry timer; admitted audible
    /// ones trigger their cue.
    pub fn enqueue(&self, request: NotificationRequest) -> NotificationId {
        let duration = self.resolve_duration(&request);
        let notification = Notification::admit(request, duration);
        let id = notification.id();
        let severity = notification.severity();
        let variant = notification.variant();
        let cue_wanted = notification.sound_enabled();

        match severity {
            Severity::Critical => {
                log::error!("notification {id} ({severity:?}): {}", notification.text());
            }
            Severity::High => {
                log::warn!("notification {id} ({severity:?}): {}", notification.text());
            }
            _ => {
                log::debug!("notification {id} ({severity:?}): {}", notification.text());
            }
        }

        let (outcome, snapshot) = {
            let Ok(mut queue) = self.inner.queue.lock() else {
                return id;
            };
            let weak = Arc::downgrade(&self.inner);
            let runtime = &self.inner.runtime;
            let outcome = queue.admit(notification, |admitted| {
                if admitted.is_persistent() {
                    LifecycleTimer::disarmed()
                } else {
                    let id = admitted.id();
                    LifecycleTimer::arm(runtime, admitted.duration(), move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.retire(id, RetireReason::Expired);
                        }
                    })
                }
            });
            (outcome, queue.snapshot())
        };

        match outcome {
            AdmitOutcome::Admitted => {
                self.inner.notify(&snapshot, &DeliveryEvent::Admitted(id));
                if cue_wanted {
                    self.inner.cues.play(variant);
                }
            }
            AdmitOutcome::AdmittedWithEvictions(evicted) => {
                self.inner.notify(&snapshot, &DeliveryEvent::Admitted(id));
                for victim in evicted {
                    log::debug!("notification {victim} evicted");
                    self.inner.notify(&snapshot, &DeliveryEvent::Evicted(victim));
                }
                if cue_wanted {
                    self.inner.cues.play(variant);
                }
            }
            AdmitOutcome::EvictedOnArrival => {
                log::debug!("notification {id} evicted on arrival");
                self.inner.notify(&snapshot, &DeliveryEvent::Evicted(id));
            }
        }

        id
    }

    /// Dismisses a notification.
    ///
    /// Unknown or already-departed ids are a no-op; dismissing the same id
    /// twice reports one `Dismissed` event.
    pub fn dismiss(&self, id: NotificationId) {
        self.inner.retire(id, RetireReason::Dismissed);
    }

    /// Removes every active notification, reporting one `Cleared` event
    /// per removed notification.
    pub fn clear_all(&self) {
        let (cleared, snapshot) = {
            let Ok(mut queue) = self.inner.queue.lock() else {
                return;
            };
            (queue.clear(), queue.snapshot())
        };

        for id in cleared {
            self.inner.notify(&snapshot, &DeliveryEvent::Cleared(id));
        }
    }

    /// Registers a listener for delivery events.
    ///
    /// Dropping the returned [`Subscription`] unregisters the listener;
    /// call [`Subscription::detach`] to keep it for the engine's lifetime.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Notification], &DeliveryEvent) + Send + Sync + 'static,
    {
        let token = self.inner.registry.register(Arc::new(listener));
        Subscription::new(Arc::downgrade(&self.inner.registry), token)
    }

    /// Returns the active notifications in display order.
    #[must_use]
    pub fn list(&self) -> Vec<Notification> {
        self.inner
            .queue
            .lock()
            .map(|queue| queue.snapshot())
            .unwrap_or_default()
    }

    /// Returns whether `id` is currently active.
    #[must_use]
    pub fn is_active(&self, id: NotificationId) -> bool {
        self.inner
            .queue
            .lock()
            .map(|queue| queue.contains(id))
            .unwrap_or(false)
    }

    /// Returns the number of active notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    /// Returns whether no notifications are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner
            .queue
            .lock()
            .map(|queue| queue.capacity().value())
            .unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    /// Mutes or unmutes audio cues.
    pub fn set_muted(&self, muted: bool) {
        self.inner.cues.set_muted(muted);
    }

    /// Returns whether audio cues are muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.inner.cues.is_muted()
    }

    /// Resolves the display duration for a request.
    ///
    /// An explicit non-zero duration wins; otherwise the engine timing
    /// configuration applies, falling back to the severity default. A zero
    /// duration is treated as unset.
    fn resolve_duration(&self, request: &NotificationRequest) -> Duration {
        match request.duration {
            Some(duration) if !duration.is_zero() => duration,
            _ => {
                let configured = match request.severity {
                    Severity::Critical => self.inner.critical_duration,
                    _ => self.inner.default_duration,
                };
                configured.unwrap_or_else(|| request.severity.default_duration())
            }
        }
    }
}

impl fmt::Debug for DeliveryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryEngine")
            .field("active", &self.len())
            .field("capacity", &self.capacity())
            .field("muted", &self.is_muted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_DURATION_MS, SoundConfig};

    fn silent_config() -> Config {
        Config {
            sound: SoundConfig {
                enabled: Some(false),
                muted: Some(false),
            },
            ..Config::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_makes_notification_active() {
        let engine = DeliveryEngine::new(&silent_config());

        let id = engine.enqueue(NotificationRequest::new("saved"));

        assert!(engine.is_active(id));
        assert_eq!(engine.len(), 1);
        assert!(!engine.is_empty());
        assert_eq!(engine.list()[0].text(), "saved");
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_removes_and_is_idempotent() {
        let engine = DeliveryEngine::new(&silent_config());
        let id = engine.enqueue(NotificationRequest::new("saved"));

        engine.dismiss(id);
        assert!(!engine.is_active(id));
        assert!(engine.is_empty());

        // Second dismissal and unknown ids are absorbed silently.
        engine.dismiss(id);
        assert!(engine.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_falls_back_to_severity_default() {
        let engine = DeliveryEngine::new(&silent_config());

        engine.enqueue(NotificationRequest::new("zero").with_duration(Duration::ZERO));

        let listed = engine.list();
        assert_eq!(
            listed[0].duration(),
            Duration::from_millis(DEFAULT_DURATION_MS)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn critical_requests_get_the_longer_default() {
        let engine = DeliveryEngine::new(&silent_config());

        engine.enqueue(NotificationRequest::critical("overheating"));

        let listed = engine.list();
        assert_eq!(listed[0].duration(), Severity::Critical.default_duration());
    }

    #[tokio::test(start_paused = true)]
    async fn configured_timing_overrides_the_default() {
        let mut config = silent_config();
        config.timing.default_duration_ms = Some(1234);

        let engine = DeliveryEngine::new(&config);
        engine.enqueue(NotificationRequest::new("timed"));

        assert_eq!(engine.list()[0].duration(), Duration::from_millis(1234));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_duration_wins_over_configuration() {
        let mut config = silent_config();
        config.timing.default_duration_ms = Some(1234);

        let engine = DeliveryEngine::new(&config);
        engine.enqueue(NotificationRequest::new("timed").with_duration(Duration::from_secs(2)));

        assert_eq!(engine.list()[0].duration(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_comes_from_configuration_clamped() {
        let mut config = silent_config();
        config.queue.capacity = Some(3);
        assert_eq!(DeliveryEngine::new(&config).capacity(), 3);

        config.queue.capacity = Some(0);
        assert_eq!(DeliveryEngine::new(&config).capacity(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_removes_after_the_duration() {
        let engine = DeliveryEngine::new(&silent_config());
        let id = engine.enqueue(
            NotificationRequest::new("short-lived").with_duration(Duration::from_secs(3)),
        );

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(engine.is_active(id));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!engine.is_active(id));
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_notifications_never_expire() {
        let engine = DeliveryEngine::new(&silent_config());
        let id = engine.enqueue(NotificationRequest::new("sticky").persistent());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(engine.is_active(id));
    }

    #[tokio::test(start_paused = true)]
    async fn mute_round_trips_without_a_device() {
        let engine = DeliveryEngine::new(&silent_config());
        assert!(!engine.is_muted());

        engine.set_muted(true);
        assert!(engine.is_muted());
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_the_same_state() {
        let engine = DeliveryEngine::new(&silent_config());
        let clone = engine.clone();

        let id = engine.enqueue(NotificationRequest::new("shared"));
        assert!(clone.is_active(id));

        clone.dismiss(id);
        assert!(engine.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn debug_formats_without_locking_up() {
        let engine = DeliveryEngine::new(&silent_config());
        engine.enqueue(NotificationRequest::new("one"));

        let rendered = format!("{engine:?}");
        assert!(rendered.contains("active: 1"));
    }
}
