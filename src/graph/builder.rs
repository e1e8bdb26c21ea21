//! Graph construction from effect parameters

use log::debug;
use std::sync::Arc;

use super::{NodeId, NodeKind, ProcessingGraph};
use crate::dsp::{make_distortion_curve, output_frame_count, pan_automation, BiquadSpec};
use crate::effects::{EffectParameters, StageSpec};
use crate::engine::AudioBuffer;

/// Build the processing graph for one effect over one buffer
///
/// Deterministic: the same buffer and parameters always give an equal
/// graph. Reversal is not represented here; the caller reverses the buffer
/// before building when [`EffectParameters::reverses_input`] is set.
///
/// # Arguments
/// * `audio` - Decoded input, owned by the graph from here on
/// * `params` - Resolved effect parameters
pub fn build_graph(audio: AudioBuffer, params: &EffectParameters) -> ProcessingGraph {
    let playback_rate = params.playback_rate();
    let input_channels = audio.num_channels();
    let output_frames = output_frame_count(audio.num_frames(), playback_rate);
    let output_channels = if params.forces_stereo() {
        2
    } else {
        input_channels
    };
    let sample_rate = audio.sample_rate();

    let mut graph = ProcessingGraph::new(audio, output_frames, output_channels);
    let source = graph.add_node("source", NodeKind::Source { playback_rate }, input_channels);

    // Node feeding the destination as the dry path
    let mut tail: NodeId = source;
    let mut wet_tap: Option<NodeId> = None;

    match params {
        EffectParameters::Identity | EffectParameters::Tempo { .. } | EffectParameters::Reverse => {}

        EffectParameters::Chain(stages) => {
            for stage in stages {
                let node = match stage {
                    StageSpec::Filter(spec) => {
                        graph.add_node(spec.kind.as_str(), NodeKind::Biquad(*spec), input_channels)
                    }
                    StageSpec::Shaper(spec) => {
                        let curve: Arc<[f32]> = make_distortion_curve(spec.drive).into();
                        graph.add_node(
                            "distortion",
                            NodeKind::WaveShaper { spec: *spec, curve },
                            input_channels,
                        )
                    }
                };
                graph.connect(tail, node);
                tail = node;
            }
        }

        EffectParameters::Echo(echo) => {
            let delay = graph.add_node(
                "delay",
                NodeKind::Delay {
                    delay_seconds: echo.delay_seconds,
                },
                input_channels,
            );
            let feedback = graph.add_node(
                "feedback",
                NodeKind::Gain {
                    gain: echo.feedback_gain,
                },
                input_channels,
            );
            let damping = graph.add_node(
                "damping",
                NodeKind::Biquad(BiquadSpec::low_pass(echo.damping_hz)),
                input_channels,
            );

            graph.connect(source, delay);
            graph.connect(delay, feedback);
            graph.connect(feedback, damping);
            graph.connect(damping, delay);
            wet_tap = Some(delay);
        }

        EffectParameters::Rotate(rotate) => {
            let duration = output_frames as f64 / sample_rate as f64;
            let pan = pan_automation(rotate, duration);
            debug!(
                "8D pan automation: {} points over {:.2}s",
                pan.events().len(),
                duration
            );
            let panner = graph.add_node("panner", NodeKind::StereoPanner { pan }, 2);
            graph.connect(tail, panner);
            tail = panner;
        }
    }

    let destination = graph.add_node("destination", NodeKind::Destination, output_channels);
    if let Some(wet) = wet_tap {
        graph.connect(wet, destination);
    }
    graph.connect(tail, destination);

    debug!(
        "Built graph: {} nodes, {} edges, {} -> {} frames, {} channels",
        graph.nodes().len(),
        graph.edges().len(),
        graph.source_audio().num_frames(),
        output_frames,
        output_channels
    );

    graph
}

// ============================================================================
// Tests
// ============================================================================
