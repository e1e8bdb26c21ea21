//! Offline rendering
//!
//! Executes a [`ProcessingGraph`] over its whole source buffer and returns
//! the complete output. There is no realtime constraint: the renderer runs
//! as fast as it can and either returns every frame or fails.

use log::{debug, info};

use super::buffer::AudioBuffer;
use super::cancel::CancellationToken;
use super::wav::MAX_DATA_BYTES;
use crate::dsp::{
    BiquadFilter, DelayLine, FrameProcessor, Gain, PlaybackSource, StereoPanner, WaveShaper,
};
use crate::error::{RemixError, RenderFailure, Result};
use crate::graph::{NodeId, NodeKind, ProcessingGraph};

/// Frames rendered between cancellation checks
pub const CANCEL_POLL_FRAMES: usize = 4096;

/// Largest output (in samples) the WAV encoder can describe
pub const DEFAULT_MAX_SAMPLES: u64 = MAX_DATA_BYTES / 2;

/// Something that can render a processing graph to completion
pub trait OfflineRenderer: Send + Sync {
    /// Render the whole graph
    ///
    /// Returns exactly `output_frames × output_channels` samples.
    ///
    /// # Errors
    /// * `Render(ResourceExhausted)` - the output cannot be allocated
    /// * `Render(UnsupportedGraph)` - the graph is malformed
    /// * `Cancelled` - the token was cancelled mid-render
    fn render(&self, graph: &ProcessingGraph, cancel: &CancellationToken) -> Result<AudioBuffer>;
}

/// Deterministic per-sample graph evaluator
#[derive(Debug, Clone, Copy)]
pub struct GraphRenderer {
    max_samples: u64,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the output size in samples (frames × channels)
    pub fn with_max_samples(mut self, max_samples: u64) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn max_samples(&self) -> u64 {
        self.max_samples
    }

    /// Allocate the output channels up front
    fn allocate_output(&self, frames: usize, channels: usize) -> Result<Vec<Vec<f32>>> {
        let total = (frames as u64).saturating_mul(channels as u64);
        if total > self.max_samples {
            return Err(RemixError::render(
                RenderFailure::ResourceExhausted,
                format!(
                    "output of {} samples exceeds the limit of {}",
                    total, self.max_samples
                ),
            ));
        }

        let mut samples = Vec::new();
        samples.try_reserve_exact(channels).map_err(exhausted)?;
        for _ in 0..channels {
            let mut channel = Vec::new();
            channel.try_reserve_exact(frames).map_err(exhausted)?;
            samples.push(channel);
        }
        Ok(samples)
    }
}

fn exhausted(err: std::collections::TryReserveError) -> RemixError {
    RemixError::render(RenderFailure::ResourceExhausted, err.to_string())
}

// ============================================================================
// Runtime stages
// ============================================================================

enum Stage {
    Source(PlaybackSource),
    Processor(Box<dyn FrameProcessor>),
    Delay(DelayLine),
    Destination,
}

impl Stage {
    fn instantiate(kind: &NodeKind, channels: usize, sample_rate: u32) -> Self {
        match kind {
            NodeKind::Source { playback_rate } => Stage::Source(PlaybackSource::new(*playback_rate)),
            NodeKind::Biquad(spec) => {
                Stage::Processor(Box::new(BiquadFilter::new(*spec, sample_rate, channels)))
            }
            NodeKind::WaveShaper { spec, curve } => Stage::Processor(Box::new(WaveShaper::new(
                curve.clone(),
                spec.oversample,
                channels,
            ))),
            NodeKind::StereoPanner { pan } => Stage::Processor(Box::new(StereoPanner::new(pan.clone()))),
            NodeKind::Gain { gain } => Stage::Processor(Box::new(Gain::new(*gain))),
            NodeKind::Delay { delay_seconds } => {
                Stage::Delay(DelayLine::new(*delay_seconds, sample_rate, channels))
            }
            NodeKind::Destination => Stage::Destination,
        }
    }
}

/// Sum one node's output frame into a mixing frame
///
/// Equal widths add directly, mono feeds both channels of a wider input,
/// stereo into mono averages, anything else maps channel `i` to `i`.
#[inline]
pub fn mix_into(dst: &mut [f32], src: &[f32]) {
    match (src.len(), dst.len()) {
        (s, d) if s == d => {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
        (1, d) if d >= 2 => {
            dst[0] += src[0];
            dst[1] += src[0];
        }
        (2, 1) => dst[0] += (src[0] + src[1]) * 0.5,
        _ => {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
    }
}

/// Input width a node mixes its inputs down to
fn input_width(graph: &ProcessingGraph, id: NodeId, inputs: &[NodeId]) -> usize {
    let node = &graph.nodes()[id];
    match node.kind {
        NodeKind::Source { .. } => 0,
        NodeKind::Destination => graph.output_channels(),
        NodeKind::StereoPanner { .. } => inputs
            .iter()
            .map(|&i| graph.nodes()[i].channels)
            .max()
            .unwrap_or(1)
            .clamp(1, 2),
        _ => node.channels,
    }
}

impl OfflineRenderer for GraphRenderer {
    fn render(&self, graph: &ProcessingGraph, cancel: &CancellationToken) -> Result<AudioBuffer> {
        graph.validate()?;
        let order = graph.evaluation_order()?;

        let sample_rate = graph.sample_rate();
        if sample_rate == 0 {
            return Err(RemixError::render(
                RenderFailure::Other,
                "source sample rate is zero",
            ));
        }

        let frames = graph.output_frames();
        let channels = graph.output_channels();
        let mut output = self.allocate_output(frames, channels)?;

        info!(
            "Rendering {} frames x {} channels at {} Hz",
            frames, channels, sample_rate
        );

        let nodes = graph.nodes();
        let inputs: Vec<Vec<NodeId>> = nodes.iter().map(|n| graph.inputs_of(n.id)).collect();
        let mut stages: Vec<Stage> = nodes
            .iter()
            .map(|n| Stage::instantiate(&n.kind, n.channels, sample_rate))
            .collect();
        let mut mix: Vec<Vec<f32>> = nodes
            .iter()
            .map(|n| vec![0.0; input_width(graph, n.id, &inputs[n.id])])
            .collect();
        let mut frame_out: Vec<Vec<f32>> = nodes.iter().map(|n| vec![0.0; n.channels]).collect();
        let delays: Vec<NodeId> = nodes
            .iter()
            .filter(|n| n.kind.is_delay())
            .map(|n| n.id)
            .collect();

        debug!(
            "Evaluation order: {:?}",
            order
                .iter()
                .map(|&id| nodes[id].kind.name())
                .collect::<Vec<_>>()
        );

        let source = graph.source_audio();

        for frame in 0..frames {
            if frame % CANCEL_POLL_FRAMES == 0 {
                cancel.check()?;
            }
            let time = frame as f64 / sample_rate as f64;

            // Delays emit history before anything reads them
            for &id in &delays {
                if let Stage::Delay(line) = &stages[id] {
                    line.read(&mut frame_out[id]);
                }
            }

            for &id in &order {
                let buf = &mut mix[id];
                buf.fill(0.0);
                for &input in &inputs[id] {
                    mix_into(buf, &frame_out[input]);
                }

                match &mut stages[id] {
                    Stage::Source(player) => player.read_frame(source, frame, &mut frame_out[id]),
                    Stage::Processor(processor) => {
                        processor.process_frame(&mix[id], &mut frame_out[id], time)
                    }
                    Stage::Delay(_) => {}
                    Stage::Destination => {
                        for (channel, &sample) in output.iter_mut().zip(&mix[id]) {
                            channel.push(sample);
                        }
                    }
                }
            }

            // Delays take their input once every other node has run
            for &id in &delays {
                let buf = &mut mix[id];
                buf.fill(0.0);
                for &input in &inputs[id] {
                    mix_into(buf, &frame_out[input]);
                }
                if let Stage::Delay(line) = &mut stages[id] {
                    line.write(&mix[id]);
                }
            }
        }

        AudioBuffer::from_channels(output, sample_rate)
    }
}

// ============================================================================
// Tests
// ============================================================================
