//! DSP stages
//!
//! The building blocks a processing graph is rendered with. Every stage
//! except the delay line implements [`FrameProcessor`] and is driven one
//! frame at a time by the renderer.

pub mod automation;
pub mod biquad;
pub mod delay;
pub mod gain;
pub mod panner;
pub mod shaper;
pub mod source;

pub use automation::{pan_automation, Automation, AutomationEvent, RotateParams};
pub use biquad::{BiquadCoeffs, BiquadFilter, BiquadSpec, FilterKind};
pub use delay::{DelayLine, EchoParams};
pub use gain::Gain;
pub use panner::StereoPanner;
pub use shaper::{make_distortion_curve, Oversample, ShaperSpec, WaveShaper};
pub use source::{output_frame_count, PlaybackSource};

/// A stage that maps one input frame to one output frame
///
/// `input` and `output` hold one sample per channel. Their lengths are the
/// stage's input and output channel counts, which differ only for the
/// stereo panner.
pub trait FrameProcessor: Send {
    /// Process a single frame
    ///
    /// # Arguments
    /// * `input` - Mixed input frame
    /// * `output` - Output frame to fill
    /// * `time` - Render time of the frame in seconds
    fn process_frame(&mut self, input: &[f32], output: &mut [f32], time: f64);

    /// Clear internal state (filter history, oversampling memory)
    fn reset(&mut self);

    /// Short identifier used in logs
    fn stage_type(&self) -> &'static str;
}
