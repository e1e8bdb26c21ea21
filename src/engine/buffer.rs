//! Audio Buffer
//!
//! Non-interleaved multi-channel float buffer shared by every stage of the
//! pipeline: the decoder produces one, the renderer reads it as its source
//! and produces another, and the WAV encoder consumes the result.

use crate::error::{RemixError, Result};

// ============================================================================
// Audio Buffer
// ============================================================================

/// Multi-channel audio held entirely in memory
///
/// Each channel is a separate `Vec<f32>`. The constructors guarantee at
/// least one channel, equal channel lengths and a positive sample rate, and
/// the fields are private so those hold for the buffer's lifetime.
///
/// # Example
/// ```
/// use remixer::engine::AudioBuffer;
///
/// // One second of stereo silence at 44.1 kHz
/// let buffer = AudioBuffer::new(2, 44100, 44100);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_frames(), 44100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is frames
    samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer
    ///
    /// # Arguments
    /// * `num_channels` - Number of channels (at least 1)
    /// * `num_frames` - Number of frames per channel
    /// * `sample_rate` - Sample rate in Hz (at least 1)
    pub fn new(num_channels: usize, num_frames: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_frames]; num_channels.max(1)],
            sample_rate: sample_rate.max(1),
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// * `InvalidAudio` - no channels, a zero sample rate, or channels of
    ///   unequal length
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(RemixError::InvalidAudio {
                reason: "buffer has no channels".to_string(),
            });
        }

        if sample_rate == 0 {
            return Err(RemixError::InvalidAudio {
                reason: "sample rate must be positive".to_string(),
            });
        }

        let frames = samples[0].len();
        if let Some((ch, data)) = samples
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != frames)
        {
            return Err(RemixError::InvalidAudio {
                reason: format!(
                    "channel {} has {} frames, expected {}",
                    ch,
                    data.len(),
                    frames
                ),
            });
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a buffer from interleaved data ([L, R, L, R, ...] for stereo)
    ///
    /// # Errors
    /// * `InvalidAudio` - zero channels or a length not divisible by the
    ///   channel count
    pub fn from_interleaved(
        interleaved: &[f32],
        num_channels: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if num_channels == 0 || interleaved.len() % num_channels != 0 {
            return Err(RemixError::InvalidAudio {
                reason: format!(
                    "sample count {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (channel, &sample) in samples.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::from_channels(samples, sample_rate)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// All channels, in channel order
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.samples
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    /// True when the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Get a reference to one channel's samples
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.samples[channel]
    }

    /// Get a mutable reference to one channel's samples
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.samples[channel]
    }

    /// Reverse the sample order of every channel in place
    pub fn reverse(&mut self) {
        for channel in &mut self.samples {
            channel.reverse();
        }
    }

    /// Flatten to frame-major, channel-minor order
    pub fn interleaved(&self) -> Vec<f32> {
        let channels = self.num_channels();
        let frames = self.num_frames();
        let mut result = Vec::with_capacity(frames * channels);

        for frame in 0..frames {
            for channel in &self.samples {
                result.push(channel[frame]);
            }
        }

        result
    }

    /// Peak absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max)
    }
}

// ============================================================================
// Tests
// ============================================================================
