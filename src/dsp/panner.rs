//! Stereo panner stage
//!
//! Equal-power panning with an automated `pan` parameter in [-1, 1]
//! (-1 full left, +1 full right). Output is always stereo.
//!
//! Mono input is spread with `L = cos(θ)`, `R = sin(θ)`, `θ = (pan + 1)·π/4`.
//! Stereo input keeps both channels and crossfeeds the side being panned
//! away from into the other side.

use std::f32::consts::FRAC_PI_2;

use super::automation::Automation;
use super::FrameProcessor;

/// Compute the stereo output frame for one input frame at a pan position
#[inline]
pub fn pan_frame(input: &[f32], pan: f32) -> [f32; 2] {
    let pan = pan.clamp(-1.0, 1.0);

    match input {
        [mono] => {
            let x = (pan + 1.0) * 0.5;
            let (gain_l, gain_r) = ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin());
            [mono * gain_l, mono * gain_r]
        }
        [left, right, ..] => {
            if pan <= 0.0 {
                let x = pan + 1.0;
                let (gain_l, gain_r) = ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin());
                [left + right * gain_l, right * gain_r]
            } else {
                let x = pan;
                let (gain_l, gain_r) = ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin());
                [left * gain_l, right + left * gain_r]
            }
        }
        [] => [0.0, 0.0],
    }
}

/// Runtime stereo panner driven by an automation timeline
#[derive(Debug, Clone)]
pub struct StereoPanner {
    pan: Automation,
}

impl StereoPanner {
    pub fn new(pan: Automation) -> Self {
        Self { pan }
    }

    pub fn pan(&self) -> &Automation {
        &self.pan
    }
}

impl FrameProcessor for StereoPanner {
    fn process_frame(&mut self, input: &[f32], output: &mut [f32], time: f64) {
        let frame = pan_frame(input, self.pan.value_at(time));
        for (out, value) in output.iter_mut().zip(frame) {
            *out = value;
        }
    }

    fn reset(&mut self) {}

    fn stage_type(&self) -> &'static str {
        "stereo_panner"
    }
}

// ============================================================================
// Tests
// ============================================================================
