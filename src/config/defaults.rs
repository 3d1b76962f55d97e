// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for engine constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Queue**: active notification capacity bounds
//! - **Timing**: default display durations per severity class
//! - **Cue**: audio cue envelope and pulse timing

// ==========================================================================
// Queue Defaults
// ==========================================================================

/// Default number of notifications the queue holds at once.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// Minimum allowed queue capacity.
pub const MIN_QUEUE_CAPACITY: usize = 1;

/// Maximum allowed queue capacity.
pub const MAX_QUEUE_CAPACITY: usize = 32;

// ==========================================================================
// Timing Defaults
// ==========================================================================

/// Default display duration for non-critical notifications (milliseconds).
pub const DEFAULT_DURATION_MS: u64 = 5000;

/// Default display duration for critical-severity notifications (milliseconds).
pub const CRITICAL_DURATION_MS: u64 = 10_000;

// ==========================================================================
// Cue Defaults
// ==========================================================================

/// Gain at the start of a cue tone.
pub const CUE_GAIN_START: f32 = 0.1;

/// Gain the envelope decays to by the end of the tone.
pub const CUE_GAIN_END: f32 = 0.01;

/// Duration of a single cue tone (milliseconds).
pub const CUE_TONE_MS: u64 = 300;

/// Offset of the second pulse for critical cues, measured from the
/// start of the first pulse (milliseconds).
pub const CUE_REPEAT_OFFSET_MS: u64 = 400;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Queue capacity validation
    assert!(MIN_QUEUE_CAPACITY > 0);
    assert!(MAX_QUEUE_CAPACITY >= MIN_QUEUE_CAPACITY);
    assert!(DEFAULT_QUEUE_CAPACITY >= MIN_QUEUE_CAPACITY);
    assert!(DEFAULT_QUEUE_CAPACITY <= MAX_QUEUE_CAPACITY);

    // Timing validation
    assert!(DEFAULT_DURATION_MS > 0);
    assert!(CRITICAL_DURATION_MS >= DEFAULT_DURATION_MS);

    // Cue validation
    assert!(CUE_GAIN_END > 0.0);
    assert!(CUE_GAIN_START > CUE_GAIN_END);
    assert!(CUE_GAIN_START <= 1.0);
    assert!(CUE_TONE_MS > 0);
    // The second pulse must not overlap the first
    assert!(CUE_REPEAT_OFFSET_MS >= CUE_TONE_MS);
};
