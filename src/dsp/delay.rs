//! Delay line stage
//!
//! Fixed-time multi-channel delay. Unlike the other stages it is driven in
//! two phases per frame: [`DelayLine::read`] emits the sample written
//! `delay_samples` frames ago, and [`DelayLine::write`] accepts the summed
//! input once every other stage has run. Splitting the two is what lets a
//! graph route the delay's own output back into its input.

use serde::{Deserialize, Serialize};

/// Echo parameters: delay time, loop gain and damping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoParams {
    /// Delay time in seconds
    pub delay_seconds: f64,
    /// Gain applied to each pass through the feedback loop (|g| < 1)
    pub feedback_gain: f32,
    /// Low-pass cutoff inside the feedback loop in Hz
    pub damping_hz: f64,
}

/// Multi-channel circular delay buffer
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Circular buffer per channel
    buffers: Vec<Vec<f32>>,
    /// Current write position in the circular buffers
    write_pos: usize,
    delay_samples: usize,
}

impl DelayLine {
    /// Create a delay line
    ///
    /// # Arguments
    /// * `delay_seconds` - Delay time; at least one sample is always used
    /// * `sample_rate` - Sample rate in Hz
    /// * `channels` - Number of channels
    pub fn new(delay_seconds: f64, sample_rate: u32, channels: usize) -> Self {
        let delay_samples = ((delay_seconds * sample_rate as f64).round() as usize).max(1);
        Self {
            buffers: vec![vec![0.0; delay_samples]; channels],
            write_pos: 0,
            delay_samples,
        }
    }

    /// Delay in samples
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Emit the delayed frame
    ///
    /// The buffer length equals the delay, so the slot about to be
    /// overwritten holds the sample from exactly `delay_samples` ago.
    #[inline]
    pub fn read(&self, output: &mut [f32]) {
        for (out, buffer) in output.iter_mut().zip(&self.buffers) {
            *out = buffer[self.write_pos];
        }
    }

    /// Accept this frame's input and advance
    #[inline]
    pub fn write(&mut self, input: &[f32]) {
        for (buffer, &sample) in self.buffers.iter_mut().zip(input) {
            buffer[self.write_pos] = sample;
        }
        self.write_pos = (self.write_pos + 1) % self.delay_samples;
    }

    /// Clear all buffered audio
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.write_pos = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_samples_from_seconds() {
        assert_eq!(DelayLine::new(0.3, 44100, 1).delay_samples(), 13230);
        assert_eq!(DelayLine::new(0.0, 44100, 1).delay_samples(), 1);
    }

    #[test]
    fn test_impulse_comes_out_after_delay() {
        let mut line = DelayLine::new(4.0 / 1000.0, 1000, 2);
        assert_eq!(line.delay_samples(), 4);

        let mut out = [0.0; 2];
        let mut seen = Vec::new();
        for i in 0..10 {
            line.read(&mut out);
            seen.push(out);
            let input = if i == 0 { [1.0, -1.0] } else { [0.0, 0.0] };
            line.write(&input);
        }

        assert_eq!(seen[4], [1.0, -1.0]);
        assert!(seen
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 4)
            .all(|(_, frame)| *frame == [0.0, 0.0]));
    }

    #[test]
    fn test_reset_clears_buffer() {
        let mut line = DelayLine::new(0.002, 1000, 1);
        line.write(&[1.0]);
        line.reset();

        let mut out = [0.0];
        for _ in 0..4 {
            line.read(&mut out);
            assert_eq!(out[0], 0.0);
            line.write(&[0.0]);
        }
    }
}
