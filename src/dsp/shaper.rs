//! Waveshaper (distortion) stage
//!
//! A fixed lookup curve maps input amplitude to output amplitude. The curve
//! is generated once per graph and shared between channels.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

use super::FrameProcessor;

/// Number of points in a generated distortion curve
pub const CURVE_LEN: usize = 44100;

/// Oversampling applied around the curve lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Oversample {
    #[default]
    None,
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "4x")]
    X4,
}

impl Oversample {
    /// Sub-samples evaluated per input sample
    pub fn factor(&self) -> usize {
        match self {
            Oversample::None => 1,
            Oversample::X2 => 2,
            Oversample::X4 => 4,
        }
    }
}

/// Declarative description of a waveshaper stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShaperSpec {
    /// Drive amount `k` of the distortion curve
    pub drive: f64,
    pub oversample: Oversample,
}

impl ShaperSpec {
    pub fn new(drive: f64, oversample: Oversample) -> Self {
        Self { drive, oversample }
    }
}

/// Generate the distortion transfer curve for drive `k`
///
/// `curve[i] = ((3 + k) * x * 20°) / (π + k|x|)` with `x` mapped linearly
/// from the index onto [-1, 1).
pub fn make_distortion_curve(drive: f64) -> Vec<f32> {
    let deg = PI / 180.0;
    (0..CURVE_LEN)
        .map(|i| {
            let x = (i as f64 * 2.0) / CURVE_LEN as f64 - 1.0;
            (((3.0 + drive) * x * 20.0 * deg) / (PI + drive * x.abs())) as f32
        })
        .collect()
}

/// Look up `x` on a curve spanning [-1, 1], interpolating linearly
///
/// Inputs outside the range hold the end values.
#[inline]
pub fn apply_curve(curve: &[f32], x: f32) -> f32 {
    let n = curve.len();
    match n {
        0 => return x,
        1 => return curve[0],
        _ => {}
    }

    let v = (n - 1) as f32 * 0.5 * (x + 1.0);
    if v <= 0.0 || v.is_nan() {
        curve[0]
    } else if v >= (n - 1) as f32 {
        curve[n - 1]
    } else {
        let k = v.floor() as usize;
        let f = v - k as f32;
        (1.0 - f) * curve[k] + f * curve[k + 1]
    }
}

/// Runtime waveshaper stage
#[derive(Debug, Clone)]
pub struct WaveShaper {
    curve: Arc<[f32]>,
    oversample: Oversample,
    /// Previous input per channel, used to interpolate sub-samples
    previous: Vec<f32>,
}

impl WaveShaper {
    pub fn new(curve: Arc<[f32]>, oversample: Oversample, channels: usize) -> Self {
        Self {
            curve,
            oversample,
            previous: vec![0.0; channels],
        }
    }

    pub fn curve(&self) -> &[f32] {
        &self.curve
    }

    #[inline]
    fn shape(&mut self, x: f32, channel: usize) -> f32 {
        let factor = self.oversample.factor();
        if factor == 1 {
            return apply_curve(&self.curve, x);
        }

        // Linear upsample between the previous and current input, shape each
        // sub-sample, then decimate with a box filter
        let prev = self.previous[channel];
        self.previous[channel] = x;
        let step = (x - prev) / factor as f32;
        let sum: f32 = (1..=factor)
            .map(|j| apply_curve(&self.curve, prev + step * j as f32))
            .sum();
        sum / factor as f32
    }
}

impl FrameProcessor for WaveShaper {
    fn process_frame(&mut self, input: &[f32], output: &mut [f32], _time: f64) {
        for (ch, (out, &inp)) in output.iter_mut().zip(input).enumerate() {
            *out = self.shape(inp, ch);
        }
    }

    fn reset(&mut self) {
        self.previous.fill(0.0);
    }

    fn stage_type(&self) -> &'static str {
        "waveshaper"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_curve_shape() {
        let curve = make_distortion_curve(400.0);
        assert_eq!(curve.len(), CURVE_LEN);

        // x = -1 at index 0
        let expected = ((403.0 * -1.0 * 20.0 * PI / 180.0) / (PI + 400.0)) as f32;
        assert_abs_diff_eq!(curve[0], expected, epsilon = 1e-6);

        // x = 0 at the midpoint
        assert_abs_diff_eq!(curve[CURVE_LEN / 2], 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_curve_is_monotonic_and_odd() {
        let curve = make_distortion_curve(5.0);
        assert!(curve.windows(2).all(|w| w[1] >= w[0]));

        // curve[i] and curve[n - i] sit at x and -x
        for i in [1usize, 100, 10000, 22000] {
            assert_abs_diff_eq!(curve[i], -curve[CURVE_LEN - i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_apply_curve_clamps_out_of_range() {
        let curve = vec![-0.5, 0.0, 0.5];
        assert_eq!(apply_curve(&curve, -3.0), -0.5);
        assert_eq!(apply_curve(&curve, 3.0), 0.5);
        assert_abs_diff_eq!(apply_curve(&curve, 0.5), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_heavy_drive_compresses_peaks() {
        let curve: Arc<[f32]> = make_distortion_curve(400.0).into();
        let mut shaper = WaveShaper::new(curve, Oversample::None, 1);

        let mut quiet = [0.0];
        let mut loud = [0.0];
        shaper.process_frame(&[0.05], &mut quiet, 0.0);
        shaper.process_frame(&[0.9], &mut loud, 0.0);

        // 18x the input but far less than 18x the output
        assert!(loud[0] / quiet[0] < 3.0);
    }

    #[test]
    fn test_oversampling_converges_on_constant_input() {
        let curve: Arc<[f32]> = make_distortion_curve(5.0).into();
        let mut plain = WaveShaper::new(curve.clone(), Oversample::None, 1);
        let mut over = WaveShaper::new(curve, Oversample::X4, 1);

        let mut a = [0.0];
        let mut b = [0.0];
        for _ in 0..4 {
            plain.process_frame(&[0.3], &mut a, 0.0);
            over.process_frame(&[0.3], &mut b, 0.0);
        }
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-6);
    }
}
