//! Biquad filter stage
//!
//! Single-purpose two-pole filter (low-pass, high-pass, low-shelf,
//! high-shelf, peaking) using the Audio EQ Cookbook formulas.
//!
//! Q follows the conventions of the browser biquad node the effect table was
//! tuned against: for low/high-pass it is a resonance in dB, for peaking it
//! is the linear quality factor, and shelves use a fixed slope of 1.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::FrameProcessor;

/// Default Q when none is given (0 dB resonance for pass filters)
pub const DEFAULT_Q: f64 = 1.0;

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Remove above frequency
    LowPass,
    /// Remove below frequency
    HighPass,
    /// Boost/cut below frequency
    LowShelf,
    /// Boost/cut above frequency
    HighShelf,
    /// Bell curve boost/cut around frequency
    Peaking,
}

impl FilterKind {
    /// Short identifier used in graph labels
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::LowPass => "lowpass",
            FilterKind::HighPass => "highpass",
            FilterKind::LowShelf => "lowshelf",
            FilterKind::HighShelf => "highshelf",
            FilterKind::Peaking => "peaking",
        }
    }
}

/// Declarative description of one filter stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadSpec {
    pub kind: FilterKind,
    /// Cutoff or center frequency in Hz
    pub frequency: f64,
    /// Quality factor (see module docs for its meaning per kind)
    pub q: f64,
    /// Gain in dB (shelf and peaking only)
    pub gain_db: f64,
}

impl BiquadSpec {
    pub fn low_pass(frequency: f64) -> Self {
        Self::new(FilterKind::LowPass, frequency, DEFAULT_Q, 0.0)
    }

    pub fn high_pass(frequency: f64) -> Self {
        Self::new(FilterKind::HighPass, frequency, DEFAULT_Q, 0.0)
    }

    pub fn low_shelf(frequency: f64, gain_db: f64) -> Self {
        Self::new(FilterKind::LowShelf, frequency, DEFAULT_Q, gain_db)
    }

    pub fn high_shelf(frequency: f64, gain_db: f64) -> Self {
        Self::new(FilterKind::HighShelf, frequency, DEFAULT_Q, gain_db)
    }

    pub fn peaking(frequency: f64, q: f64, gain_db: f64) -> Self {
        Self::new(FilterKind::Peaking, frequency, q, gain_db)
    }

    pub fn new(kind: FilterKind, frequency: f64, q: f64, gain_db: f64) -> Self {
        Self {
            kind,
            frequency,
            q,
            gain_db,
        }
    }

    /// Override Q
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }
}

/// Biquad filter coefficients, normalized by a0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Calculate coefficients for the given spec at a sample rate
    pub fn calculate(spec: &BiquadSpec, sample_rate: f64) -> Self {
        let nyquist = sample_rate / 2.0;
        let freq = spec.frequency.clamp(1.0, nyquist * 0.999);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let a = 10.0_f64.powf(spec.gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match spec.kind {
            FilterKind::LowPass => {
                let alpha = sin_w0 / (2.0 * 10.0_f64.powf(spec.q / 20.0));
                (
                    (1.0 - cos_w0) / 2.0,
                    1.0 - cos_w0,
                    (1.0 - cos_w0) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_w0,
                    1.0 - alpha,
                )
            }
            FilterKind::HighPass => {
                let alpha = sin_w0 / (2.0 * 10.0_f64.powf(spec.q / 20.0));
                (
                    (1.0 + cos_w0) / 2.0,
                    -(1.0 + cos_w0),
                    (1.0 + cos_w0) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_w0,
                    1.0 - alpha,
                )
            }
            FilterKind::LowShelf => {
                // Slope S = 1
                let alpha = sin_w0 / 2.0 * 2.0_f64.sqrt();
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
            FilterKind::HighShelf => {
                let alpha = sin_w0 / 2.0 * 2.0_f64.sqrt();
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
            FilterKind::Peaking => {
                let alpha = sin_w0 / (2.0 * spec.q.max(1e-4));
                (
                    1.0 + alpha * a,
                    -2.0 * cos_w0,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_w0,
                    1.0 - alpha / a,
                )
            }
        };

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Filter history for one channel
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    /// Direct Form I
    #[inline]
    fn process(&mut self, input: f64, c: &BiquadCoeffs) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

/// Runtime biquad stage with independent state per channel
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    spec: BiquadSpec,
    coeffs: BiquadCoeffs,
    states: Vec<BiquadState>,
}

impl BiquadFilter {
    pub fn new(spec: BiquadSpec, sample_rate: u32, channels: usize) -> Self {
        Self {
            spec,
            coeffs: BiquadCoeffs::calculate(&spec, sample_rate as f64),
            states: vec![BiquadState::default(); channels],
        }
    }

    pub fn spec(&self) -> &BiquadSpec {
        &self.spec
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Filter a single sample on one channel
    #[inline]
    pub fn process_sample(&mut self, sample: f32, channel: usize) -> f32 {
        self.states[channel].process(sample as f64, &self.coeffs) as f32
    }
}

impl FrameProcessor for BiquadFilter {
    fn process_frame(&mut self, input: &[f32], output: &mut [f32], _time: f64) {
        for (ch, (out, &inp)) in output.iter_mut().zip(input).enumerate() {
            *out = self.process_sample(inp, ch);
        }
    }

    fn reset(&mut self) {
        self.states.fill(BiquadState::default());
    }

    fn stage_type(&self) -> &'static str {
        self.spec.kind.as_str()
    }
}

// ============================================================================
// Tests
// ============================================================================
