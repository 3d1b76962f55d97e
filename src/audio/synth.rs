// SPDX-License-Identifier: MPL-2.0
//! Cue waveform synthesis.
//!
//! Cues are short mono sine tones with an exponentially decaying envelope.
//! Rendering is pure; nothing here touches an audio device.

use crate::config::{CUE_GAIN_END, CUE_GAIN_START, CUE_REPEAT_OFFSET_MS, CUE_TONE_MS};
use crate::notification::Variant;
use std::f32::consts::TAU;

/// Renders the cue waveform for `variant` at the given output sample rate.
///
/// Returns mono samples normalized to [-1.0, 1.0], or `None` for variants
/// that are silent. Critical cues carry a second pulse after a short gap;
/// all other audible variants are a single tone.
#[must_use]
pub fn render_cue(variant: Variant, sample_rate: u32) -> Option<Vec<f32>> {
    let frequency = variant.cue_frequency()?;
    let tone = render_tone(frequency, sample_rate);

    if variant == Variant::Critical {
        let offset = samples_for(CUE_REPEAT_OFFSET_MS, sample_rate);
        let mut buffer = vec![0.0; offset + tone.len()];
        buffer[..tone.len()].copy_from_slice(&tone);
        buffer[offset..].copy_from_slice(&tone);
        Some(buffer)
    } else {
        Some(tone)
    }
}

/// Renders a single tone pulse with the standard envelope.
fn render_tone(frequency: f32, sample_rate: u32) -> Vec<f32> {
    let length = samples_for(CUE_TONE_MS, sample_rate);
    let tone_secs = CUE_TONE_MS as f32 / 1000.0;
    let decay = CUE_GAIN_END / CUE_GAIN_START;

    (0..length)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let gain = CUE_GAIN_START * decay.powf(t / tone_secs);
            gain * (TAU * frequency * t).sin()
        })
        .collect()
}

fn samples_for(millis: u64, sample_rate: u32) -> usize {
    (u64::from(sample_rate) * millis / 1000) as usize
}
