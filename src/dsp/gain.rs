//! Gain stage
//!
//! Fixed linear gain. In the echo graph it sets how much of each repeat
//! survives the next trip around the feedback loop.

use super::FrameProcessor;

/// Constant linear gain applied to every channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    gain: f32,
}

impl Gain {
    /// Create a gain stage
    ///
    /// # Arguments
    /// * `gain` - Linear multiplier (1.0 = unity)
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }
}

impl FrameProcessor for Gain {
    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32], _time: f64) {
        for (out, &inp) in output.iter_mut().zip(input) {
            *out = inp * self.gain;
        }
    }

    fn reset(&mut self) {}

    fn stage_type(&self) -> &'static str {
        "gain"
    }
}
