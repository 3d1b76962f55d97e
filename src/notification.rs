// SPDX-License-Identifier: MPL-2.0
//! Core notification data structures.
//!
//! This module defines the `Notification` record, the `NotificationRequest`
//! builder callers hand to the engine, and the classification enums
//! (`Severity`, `Category`, `Variant`).

use crate::config::{CRITICAL_DURATION_MS, DEFAULT_DURATION_MS};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Unique identifier for a notification.
///
/// Ids are never recycled while the original notification is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    /// Creates a new unique notification ID.
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity rank determines queue ordering, the default display duration,
/// and how admissions are logged.
///
/// The derived ordering is ascending: `Low < Normal < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Background information, first to be evicted under pressure.
    Low,
    /// Routine messages.
    #[default]
    Normal,
    /// Needs attention soon.
    High,
    /// Highest rank; longer default display and protected from eviction
    /// ahead of everything else.
    Critical,
}

impl Severity {
    /// Returns the built-in display duration for this severity.
    ///
    /// Critical notifications stay twice as long as everything else. An
    /// engine-level timing configuration may override these values.
    #[must_use]
    pub fn default_duration(&self) -> Duration {
        match self {
            Severity::Critical => Duration::from_millis(CRITICAL_DURATION_MS),
            _ => Duration::from_millis(DEFAULT_DURATION_MS),
        }
    }
}

/// Informational grouping of a notification. Does not affect ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    System,
    Emergency,
    Security,
    Communication,
    Maintenance,
}

/// Presentation class of a notification.
///
/// Used for the audio-tone lookup and by external rendering. Orthogonal to
/// `Severity`; the convenience constructors on [`NotificationRequest`] set
/// both consistently for the common cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Default,
    Destructive,
    Success,
    Warning,
    Info,
    Emergency,
    Critical,
}

impl Variant {
    /// Returns the cue tone frequency for this variant, or `None` when the
    /// variant is silent.
    #[must_use]
    pub fn cue_frequency(&self) -> Option<f32> {
        match self {
            Variant::Default => Some(440.0),
            Variant::Destructive => Some(220.0),
            Variant::Success => Some(523.0),
            Variant::Warning => Some(349.0),
            Variant::Info => None,
            Variant::Emergency => Some(880.0),
            Variant::Critical => Some(1760.0),
        }
    }
}

/// Geo-reference attached to emergency-category alerts. Opaque to the
/// engine; carried through for external rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Location {
    /// Creates a new location from latitude/longitude in degrees.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An active notification, immutable once admitted.
///
/// Constructed by the engine from a [`NotificationRequest`]; callers receive
/// clones through snapshots and subscriber callbacks.
#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    text: String,
    detail: Option<String>,
    category: Category,
    severity: Severity,
    variant: Variant,
    persistent: bool,
    duration: Duration,
    sound_enabled: bool,
    created_at: DateTime<Utc>,
    location: Option<Location>,
}

impl Notification {
    /// Builds the admitted record from a request, assigning the id and
    /// admission timestamp. The duration has already been resolved by the
    /// engine's timing policy.
    pub(crate) fn admit(request: NotificationRequest, duration: Duration) -> Self {
        Self {
            id: NotificationId::new(),
            text: request.text,
            detail: request.detail,
            category: request.category,
            severity: request.severity,
            variant: request.variant,
            persistent: request.persistent,
            duration,
            sound_enabled: request.sound_enabled,
            created_at: Utc::now(),
            location: request.location,
        }
    }

    /// Returns the notification's unique ID.
    #[must_use]
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the optional detail text.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the informational category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the severity rank.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the presentation variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns whether this notification is exempt from timer expiry.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Returns the resolved display duration.
    ///
    /// Meaningless for persistent notifications, which never arm a timer.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns whether an audio cue was requested for this notification.
    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Returns when this notification was admitted.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the attached geo-reference, if any.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

/// Builder for a notification handed to [`DeliveryEngine::enqueue`].
///
/// [`DeliveryEngine::enqueue`]: crate::engine::DeliveryEngine::enqueue
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub(crate) text: String,
    pub(crate) detail: Option<String>,
    pub(crate) category: Category,
    pub(crate) severity: Severity,
    pub(crate) variant: Variant,
    pub(crate) persistent: bool,
    pub(crate) duration: Option<Duration>,
    pub(crate) sound_enabled: bool,
    pub(crate) location: Option<Location>,
}

impl NotificationRequest {
    /// Creates a request with default classification (`Normal` severity,
    /// `Default` variant, `System` category) and sound enabled.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detail: None,
            category: Category::default(),
            severity: Severity::default(),
            variant: Variant::default(),
            persistent: false,
            duration: None,
            sound_enabled: true,
            location: None,
        }
    }

    /// Creates a low-severity informational request (no audio cue).
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text)
            .with_severity(Severity::Low)
            .with_variant(Variant::Info)
    }

    /// Creates a success request.
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text).with_variant(Variant::Success)
    }

    /// Creates a high-severity warning request.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text)
            .with_severity(Severity::High)
            .with_variant(Variant::Warning)
    }

    /// Creates a high-severity destructive-action request.
    pub fn destructive(text: impl Into<String>) -> Self {
        Self::new(text)
            .with_severity(Severity::High)
            .with_variant(Variant::Destructive)
    }

    /// Creates a critical emergency request in the emergency category.
    pub fn emergency(text: impl Into<String>) -> Self {
        Self::new(text)
            .with_severity(Severity::Critical)
            .with_variant(Variant::Emergency)
            .with_category(Category::Emergency)
    }

    /// Creates a critical request with the two-pulse cue.
    pub fn critical(text: impl Into<String>) -> Self {
        Self::new(text)
            .with_severity(Severity::Critical)
            .with_variant(Variant::Critical)
    }

    /// Adds detail text shown under the message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the informational category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the severity rank.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the presentation variant.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Marks the notification persistent: no expiry timer is armed and only
    /// an explicit dismissal or clear removes it.
    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Overrides the display duration.
    ///
    /// A zero duration is treated as "no override" and falls back to the
    /// severity default.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Disables the audio cue for this notification.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.sound_enabled = false;
        self
    }

    /// Attaches a geo-reference.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}
