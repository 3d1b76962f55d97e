// SPDX-License-Identifier: MPL-2.0
//! Severity-aware audio cues.
//!
//! [`CuePlayer`] ties waveform synthesis to the output device. Audio is
//! strictly best-effort: when no device can be opened the player logs one
//! warning and stays silent from then on, and a cue that cannot be queued
//! is dropped rather than delaying delivery.

pub mod output;
pub mod synth;

pub use output::AudioOutput;
pub use synth::render_cue;

use crate::notification::Variant;
use std::sync::atomic::{AtomicBool, Ordering};

/// Plays the audio cue matching a notification's variant.
#[derive(Debug)]
pub struct CuePlayer {
    output: Option<AudioOutput>,
    muted: AtomicBool,
}

impl CuePlayer {
    /// Creates a player backed by the default output device.
    ///
    /// With `enabled` false no device is opened and every cue is a no-op.
    /// A device initialization failure is not an error for the caller; the
    /// player logs a warning and behaves as if sound were disabled.
    #[must_use]
    pub fn new(enabled: bool, muted: bool) -> Self {
        let output = if enabled {
            match AudioOutput::new() {
                Ok(output) => Some(output),
                Err(err) => {
                    log::warn!("audio unavailable, cues are disabled: {err}");
                    None
                }
            }
        } else {
            None
        };

        let player = Self {
            output,
            muted: AtomicBool::new(false),
        };
        player.set_muted(muted);
        player
    }

    /// Renders and queues the cue for `variant`.
    ///
    /// Silent variants, a muted or deviceless player, and playback errors
    /// all reduce to a no-op.
    pub fn play(&self, variant: Variant) {
        let Some(output) = &self.output else { return };
        if self.is_muted() {
            return;
        }
        let Some(samples) = synth::render_cue(variant, output.sample_rate()) else {
            return;
        };
        if let Err(err) = output.play(samples) {
            log::debug!("cue for {variant:?} dropped: {err}");
        }
    }

    /// Sets the mute state.
    ///
    /// Takes effect immediately, silencing even a cue already buffered.
    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
        if let Some(output) = &self.output {
            output.set_muted(muted);
        }
    }

    /// Returns whether cues are muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }
}
