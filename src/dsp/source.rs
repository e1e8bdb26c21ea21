//! Buffer playback source
//!
//! Plays a decoded buffer at a fixed playback rate. Pitch and tempo change
//! together, the way a tape or turntable speed change does.

use crate::engine::AudioBuffer;

/// Number of output frames produced by playing `input_frames` at `rate`
///
/// `ceil(L / r)` evaluated in `f64`. A non-positive or non-finite rate
/// plays nothing.
pub fn output_frame_count(input_frames: usize, rate: f64) -> usize {
    if !(rate.is_finite() && rate > 0.0) {
        return 0;
    }
    (input_frames as f64 / rate).ceil() as usize
}

/// Reads a buffer at `frame * rate` with linear interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSource {
    rate: f64,
}

impl PlaybackSource {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Write the source frame for output frame `frame` into `output`
    ///
    /// Positions past the end of the buffer read as silence.
    #[inline]
    pub fn read_frame(&self, audio: &AudioBuffer, frame: usize, output: &mut [f32]) {
        let position = frame as f64 * self.rate;
        let index = position.floor() as usize;
        let frac = (position - index as f64) as f32;
        let len = audio.num_frames();

        for (out, channel) in output.iter_mut().zip(audio.channels()) {
            *out = if index >= len {
                0.0
            } else {
                let a = channel[index];
                let b = if index + 1 < len { channel[index + 1] } else { 0.0 };
                a + (b - a) * frac
            };
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
