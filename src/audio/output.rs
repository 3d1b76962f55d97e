// SPDX-License-Identifier: MPL-2.0
//! Audio output using cpal for low-latency cue playback.
//!
//! The cpal stream is not `Send`, so a dedicated thread owns the device and
//! the stream. Cue samples reach it through a bounded channel; the handle
//! returned to callers is freely shareable across threads.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Pending interleaved samples awaiting the device callback.
type PendingSamples = Arc<Mutex<Vec<f32>>>;

/// Cues queued beyond this are dropped rather than buffered.
const CUE_CHANNEL_CAPACITY: usize = 16;

/// Shared state between the audio thread and the handle.
#[derive(Debug)]
struct SharedState {
    muted: AtomicBool,
}

impl SharedState {
    fn new() -> Self {
        Self {
            muted: AtomicBool::new(false),
        }
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }
}

/// Handle to the audio output thread.
///
/// Dropping the handle disconnects the sample channel, which stops the
/// thread and closes the stream.
#[derive(Debug)]
pub struct AudioOutput {
    /// Channel for sending mono cue samples to the audio thread.
    sample_tx: Sender<Vec<f32>>,

    /// Shared state for mute control.
    shared_state: Arc<SharedState>,

    /// Sample rate of the output device.
    sample_rate: u32,

    /// Number of channels of the output device.
    channels: u16,
}

impl AudioOutput {
    /// Opens the default output device on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns an error if no audio output device is found, if the device
    /// configuration cannot be retrieved, or if the audio stream fails to
    /// start.
    pub fn new() -> Result<Self> {
        let shared_state = Arc::new(SharedState::new());
        let (sample_tx, sample_rx) = bounded(CUE_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = bounded(1);

        let thread_state = Arc::clone(&shared_state);
        std::thread::Builder::new()
            .name("cue-audio".to_string())
            .spawn(move || Self::run(&sample_rx, &ready_tx, thread_state))?;

        // The thread reports the negotiated device format, or the reason it
        // could not start.
        let (sample_rate, channels) = ready_rx
            .recv()
            .map_err(|_| Error::Audio("audio thread exited during startup".to_string()))??;

        Ok(Self {
            sample_tx,
            shared_state,
            sample_rate,
            channels,
        })
    }

    /// Queues mono cue samples for playback.
    ///
    /// Non-blocking. The samples are interleaved to the device channel
    /// count on the audio thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the cue channel is full or the audio thread has
    /// stopped.
    pub fn play(&self, samples: Vec<f32>) -> Result<()> {
        self.sample_tx.try_send(samples).map_err(|err| match err {
            TrySendError::Full(_) => Error::Audio("cue channel full".to_string()),
            TrySendError::Disconnected(_) => Error::Audio("audio thread stopped".to_string()),
        })
    }

    /// Sets the mute state.
    ///
    /// Muting silences the device callback immediately, including any cue
    /// already buffered.
    pub fn set_muted(&self, muted: bool) {
        self.shared_state.set_muted(muted);
    }

    /// Returns whether output is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.shared_state.is_muted()
    }

    /// Returns the output sample rate.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of output channels.
    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Body of the audio thread: open the device, report readiness, then
    /// feed the pending buffer until the handle is dropped.
    fn run(
        sample_rx: &Receiver<Vec<f32>>,
        ready_tx: &Sender<Result<(u32, u16)>>,
        shared_state: Arc<SharedState>,
    ) {
        let (stream, sample_rate, channels, buffer) = match Self::init_stream(shared_state) {
            Ok(parts) => parts,
            Err(err) => {
                let _ = ready_tx.send(Err(err));
                return;
            }
        };

        if let Err(err) = stream.play() {
            let _ = ready_tx.send(Err(Error::Audio(format!(
                "failed to start audio stream: {err}"
            ))));
            return;
        }

        let _ = ready_tx.send(Ok((sample_rate, channels)));

        // Holds about one second of audio; cues arriving while it is full
        // are dropped rather than growing the buffer.
        let max_buffer_len = (sample_rate as usize) * (channels as usize);

        while let Ok(mono) = sample_rx.recv() {
            let interleaved = interleave(&mono, channels);
            if let Ok(mut buf) = buffer.lock() {
                append_capped(&mut buf, &interleaved, max_buffer_len, channels);
            }
        }

        // Handle dropped: stop playback by dropping the stream.
        drop(stream);
    }

    /// Opens the default device and builds the output stream.
    fn init_stream(
        shared_state: Arc<SharedState>,
    ) -> Result<(cpal::Stream, u32, u16, PendingSamples)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no audio output device found".to_string()))?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("failed to get audio config: {e}")))?;

        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels();

        let buffer: PendingSamples = Arc::new(Mutex::new(Vec::new()));
        let buffer_clone = Arc::clone(&buffer);

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &supported_config.into(),
                buffer_clone,
                shared_state,
            )?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &supported_config.into(),
                buffer_clone,
                shared_state,
            )?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &supported_config.into(),
                buffer_clone,
                shared_state,
            )?,
            _ => return Err(Error::Audio("unsupported audio sample format".to_string())),
        };

        Ok((stream, sample_rate, channels, buffer))
    }

    /// Builds an audio output stream for a specific sample format.
    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        buffer: PendingSamples,
        shared_state: Arc<SharedState>,
    ) -> Result<cpal::Stream> {
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if shared_state.is_muted() {
                        // Output silence; the pending buffer is kept.
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    let Ok(mut buf) = buffer.lock() else {
                        // Mutex poisoned, output silence
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    };

                    for (i, sample) in data.iter_mut().enumerate() {
                        if i < buf.len() {
                            // Clamping slightly below 1.0 prevents i16
                            // overflow in from_sample.
                            *sample = T::from_sample(buf[i].clamp(-1.0, 0.999_999_9));
                        } else {
                            *sample = T::from_sample(0.0f32);
                        }
                    }

                    let consumed = data.len().min(buf.len());
                    buf.drain(..consumed);
                },
                |err| {
                    log::warn!("audio output error: {err}");
                },
                None,
            )
            .map_err(|e| Error::Audio(format!("failed to build audio stream: {e}")))?;

        Ok(stream)
    }
}

/// Duplicates mono samples across the device channel count.
fn interleave(mono: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels);
    let mut out = Vec::with_capacity(mono.len() * channels);
    for &sample in mono {
        for _ in 0..channels {
            out.push(sample);
        }
    }
    out
}

/// Appends to the pending buffer up to `max_len` samples, truncating on
/// whole-frame boundaries so channels stay aligned.
fn append_capped(buffer: &mut Vec<f32>, interleaved: &[f32], max_len: usize, channels: u16) {
    let frame = usize::from(channels).max(1);
    let available = max_len.saturating_sub(buffer.len());
    let aligned = available - available % frame;
    let take = interleaved.len().min(aligned);
    buffer.extend_from_slice(&interleaved[..take]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_state_mute_operations() {
        let state = SharedState::new();
        assert!(!state.is_muted());

        state.set_muted(true);
        assert!(state.is_muted());

        state.set_muted(false);
        assert!(!state.is_muted());
    }

    #[test]
    fn interleave_duplicates_across_channels() {
        let mono = [0.5, -0.25];
        assert_eq!(interleave(&mono, 2), vec![0.5, 0.5, -0.25, -0.25]);
        assert_eq!(interleave(&mono, 1), vec![0.5, -0.25]);
    }

    #[test]
    fn append_capped_respects_the_limit() {
        let mut buffer = vec![0.0; 6];
        append_capped(&mut buffer, &[1.0, 1.0, 1.0, 1.0], 8, 2);
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn append_capped_truncates_on_frame_boundaries() {
        let mut buffer = vec![0.0; 5];
        append_capped(&mut buffer, &[1.0, 1.0, 1.0, 1.0], 8, 2);
        // Only one whole stereo frame fits below the limit.
        assert_eq!(buffer.len(), 7);
    }

    #[test]
    fn append_capped_drops_everything_when_full() {
        let mut buffer = vec![0.0; 8];
        append_capped(&mut buffer, &[1.0, 1.0], 8, 2);
        assert_eq!(buffer.len(), 8);
    }

    // Tests that create AudioOutput require actual audio hardware and are
    // ignored by default.
    #[test]
    #[ignore = "requires audio hardware"]
    fn audio_output_can_be_created() {
        if let Ok(output) = AudioOutput::new() {
            assert!(output.sample_rate() > 0);
            assert!(output.channels() > 0);
            assert!(!output.is_muted());
            assert!(output.play(vec![0.0; 64]).is_ok());
        }
    }
}
