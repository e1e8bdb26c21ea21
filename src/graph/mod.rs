//! Processing graph
//!
//! An explicit description of how one effect is rendered: typed nodes,
//! directed edges and the source buffer they read. The graph is pure data.
//! It is built by [`build_graph`] and executed by an
//! [`OfflineRenderer`](crate::engine::OfflineRenderer).
//!
//! # Structure
//! - Exactly one `Source` and one `Destination`
//! - Every other node feeds at least one node
//! - Every node lies on a path from the source to the destination
//! - Cycles are allowed only through a `Delay` node

mod builder;

pub use builder::build_graph;

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::dsp::{Automation, BiquadSpec, ShaperSpec};
use crate::engine::AudioBuffer;
use crate::error::{RemixError, RenderFailure, Result};

/// Index of a node within its graph
pub type NodeId = usize;

/// What a node does
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Plays the graph's source buffer
    Source { playback_rate: f64 },
    /// Biquad filter
    Biquad(BiquadSpec),
    /// Waveshaper with a precomputed transfer curve
    WaveShaper {
        spec: ShaperSpec,
        #[serde(skip)]
        curve: Arc<[f32]>,
    },
    /// Equal-power stereo panner with automated position
    StereoPanner { pan: Automation },
    /// Fixed delay, the only node allowed to close a cycle
    Delay { delay_seconds: f64 },
    /// Linear gain
    Gain { gain: f32 },
    /// Sums its inputs into the rendered output
    Destination,
}

impl NodeKind {
    /// Stage identifier
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Source { .. } => "source",
            NodeKind::Biquad(spec) => spec.kind.as_str(),
            NodeKind::WaveShaper { .. } => "waveshaper",
            NodeKind::StereoPanner { .. } => "stereo_panner",
            NodeKind::Delay { .. } => "delay",
            NodeKind::Gain { .. } => "gain",
            NodeKind::Destination => "destination",
        }
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, NodeKind::Delay { .. })
    }
}

/// A node in a processing graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    /// Human-readable role ("feedback", "damping", ...)
    pub label: String,
    pub kind: NodeKind,
    /// Output channel count
    pub channels: usize,
}

/// Directed connection `from → to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// A complete, renderable description of one effect applied to one buffer
#[derive(Debug, Clone)]
pub struct ProcessingGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    source: AudioBuffer,
    output_frames: usize,
    output_channels: usize,
}

impl ProcessingGraph {
    /// Create an empty graph over a source buffer
    ///
    /// # Arguments
    /// * `source` - Audio the `Source` node plays
    /// * `output_frames` - Length of the rendered output
    /// * `output_channels` - Channel count of the rendered output
    pub fn new(source: AudioBuffer, output_frames: usize, output_channels: usize) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            source,
            output_frames,
            output_channels,
        }
    }

    /// Add a node and return its id
    pub fn add_node(&mut self, label: impl Into<String>, kind: NodeKind, channels: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(GraphNode {
            id,
            label: label.into(),
            kind,
            channels,
        });
        id
    }

    /// Connect two existing nodes
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.edges.push(Edge { from, to });
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn source_audio(&self) -> &AudioBuffer {
        &self.source
    }

    pub fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    pub fn output_frames(&self) -> usize {
        self.output_frames
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Ids of the nodes feeding `id`, in edge order
    pub fn inputs_of(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|e| e.to == id)
            .map(|e| e.from)
            .collect()
    }

    /// Ids of the nodes fed by `id`, in edge order
    pub fn outputs_of(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|e| e.from == id)
            .map(|e| e.to)
            .collect()
    }

    /// Stage identifiers in node order
    pub fn stage_kinds(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.kind.name()).collect()
    }

    /// True when the graph has an edge `from → to`
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// The single node matching `pred`, or an error naming `what`
    fn unique_node(&self, what: &str, pred: impl Fn(&NodeKind) -> bool) -> Result<NodeId> {
        let mut found = self.nodes.iter().filter(|n| pred(&n.kind));
        match (found.next(), found.next()) {
            (Some(node), None) => Ok(node.id),
            (None, _) => Err(unsupported(format!("graph has no {} node", what))),
            (Some(_), Some(_)) => Err(unsupported(format!("graph has more than one {} node", what))),
        }
    }

    pub fn source_id(&self) -> Result<NodeId> {
        self.unique_node("source", |k| matches!(k, NodeKind::Source { .. }))
    }

    pub fn destination_id(&self) -> Result<NodeId> {
        self.unique_node("destination", |k| matches!(k, NodeKind::Destination))
    }

    /// Build the petgraph view; edges into delay nodes are dropped when
    /// `break_delays` is set
    fn to_digraph(&self, break_delays: bool) -> Result<(DiGraph<NodeId, ()>, Vec<NodeIndex>)> {
        let mut graph = DiGraph::new();
        let indices: Vec<NodeIndex> = self.nodes.iter().map(|n| graph.add_node(n.id)).collect();

        for edge in &self.edges {
            let (Some(&from), Some(to_node)) = (indices.get(edge.from), self.nodes.get(edge.to))
            else {
                return Err(unsupported(format!(
                    "edge {} -> {} references a missing node",
                    edge.from, edge.to
                )));
            };
            if break_delays && to_node.kind.is_delay() {
                continue;
            }
            graph.add_edge(from, indices[edge.to], ());
        }

        Ok((graph, indices))
    }

    /// Check the structural invariants
    ///
    /// # Errors
    /// * `Render(UnsupportedGraph)` - the graph breaks one of the rules in
    ///   the module docs
    pub fn validate(&self) -> Result<()> {
        let source = self.source_id()?;
        let destination = self.destination_id()?;
        let (graph, indices) = self.to_digraph(false)?;

        for node in &self.nodes {
            if node.id != destination && self.outputs_of(node.id).is_empty() {
                return Err(unsupported(format!(
                    "node {} ({}) has no outgoing edge",
                    node.id, node.label
                )));
            }
            let idx = indices[node.id];
            if !has_path_connecting(&graph, indices[source], idx, None) {
                return Err(unsupported(format!(
                    "node {} ({}) is not reachable from the source",
                    node.id, node.label
                )));
            }
            if !has_path_connecting(&graph, idx, indices[destination], None) {
                return Err(unsupported(format!(
                    "node {} ({}) does not reach the destination",
                    node.id, node.label
                )));
            }
        }

        self.evaluation_order().map(|_| ())
    }

    /// Per-frame evaluation order
    ///
    /// A topological order of the graph with every edge into a delay node
    /// removed. Delay nodes emit last frame's history before anything runs
    /// and take their input after everything has run, so those edges never
    /// constrain the order within a frame.
    ///
    /// # Errors
    /// * `Render(UnsupportedGraph)` - a cycle that does not pass through a
    ///   delay node
    pub fn evaluation_order(&self) -> Result<Vec<NodeId>> {
        let (graph, _) = self.to_digraph(true)?;
        toposort(&graph, None)
            .map(|order| order.into_iter().map(|idx| graph[idx]).collect())
            .map_err(|cycle| {
                unsupported(format!(
                    "cycle through node {} without a delay",
                    graph[cycle.node_id()]
                ))
            })
    }

    /// JSON summary of the topology (no sample data)
    pub fn describe(&self) -> Value {
        json!({
            "sample_rate": self.sample_rate(),
            "input_frames": self.source.num_frames(),
            "output_frames": self.output_frames,
            "output_channels": self.output_channels,
            "nodes": self.nodes,
            "edges": self.edges,
        })
    }
}

fn unsupported(reason: String) -> RemixError {
    RemixError::render(RenderFailure::UnsupportedGraph, reason)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::BiquadSpec;

    fn graph() -> ProcessingGraph {
        ProcessingGraph::new(AudioBuffer::new(1, 16, 8000), 16, 1)
    }

    #[test]
    fn test_minimal_graph_is_valid() {
        let mut g = graph();
        let src = g.add_node("source", NodeKind::Source { playback_rate: 1.0 }, 1);
        let dst = g.add_node("destination", NodeKind::Destination, 1);
        g.connect(src, dst);

        assert!(g.validate().is_ok());
        assert_eq!(g.evaluation_order().unwrap(), vec![src, dst]);
    }

    #[test]
    fn test_missing_destination() {
        let mut g = graph();
        g.add_node("source", NodeKind::Source { playback_rate: 1.0 }, 1);
        let err = g.validate().unwrap_err();
        assert!(err.to_string().contains("no destination"));
    }

    #[test]
    fn test_dangling_node_rejected() {
        let mut g = graph();
        let src = g.add_node("source", NodeKind::Source { playback_rate: 1.0 }, 1);
        let dst = g.add_node("destination", NodeKind::Destination, 1);
        let lp = g.add_node("lowpass", NodeKind::Biquad(BiquadSpec::low_pass(500.0)), 1);
        g.connect(src, dst);
        g.connect(src, lp);

        let err = g.validate().unwrap_err();
        assert_eq!(err.error_code(), "RENDER_ERROR");
        assert!(err.to_string().contains("no outgoing edge"));
    }

    #[test]
    fn test_cycle_without_delay_rejected() {
        let mut g = graph();
        let src = g.add_node("source", NodeKind::Source { playback_rate: 1.0 }, 1);
        let gain = g.add_node("loop", NodeKind::Gain { gain: 0.5 }, 1);
        let lp = g.add_node("lowpass", NodeKind::Biquad(BiquadSpec::low_pass(500.0)), 1);
        let dst = g.add_node("destination", NodeKind::Destination, 1);
        g.connect(src, gain);
        g.connect(gain, lp);
        g.connect(lp, gain);
        g.connect(lp, dst);

        let err = g.validate().unwrap_err();
        assert!(matches!(
            err,
            RemixError::Render {
                kind: RenderFailure::UnsupportedGraph,
                ..
            }
        ));
    }

    #[test]
    fn test_cycle_through_delay_accepted() {
        let mut g = graph();
        let src = g.add_node("source", NodeKind::Source { playback_rate: 1.0 }, 1);
        let delay = g.add_node("delay", NodeKind::Delay { delay_seconds: 0.001 }, 1);
        let gain = g.add_node("feedback", NodeKind::Gain { gain: 0.5 }, 1);
        let dst = g.add_node("destination", NodeKind::Destination, 1);
        g.connect(src, delay);
        g.connect(delay, gain);
        g.connect(gain, delay);
        g.connect(delay, dst);

        assert!(g.validate().is_ok());
        let order = g.evaluation_order().unwrap();
        let pos = |id| order.iter().position(|&n| n == id).unwrap();
        assert!(pos(delay) < pos(gain));
        assert!(pos(delay) < pos(dst));
    }

    #[test]
    fn test_describe_omits_samples() {
        let mut g = graph();
        let src = g.add_node("source", NodeKind::Source { playback_rate: 2.0 }, 1);
        let dst = g.add_node("destination", NodeKind::Destination, 1);
        g.connect(src, dst);

        let json = g.describe();
        assert_eq!(json["nodes"][0]["kind"]["type"], "source");
        assert_eq!(json["edges"][0]["to"], 1);
        assert!(json.get("samples").is_none());
    }
}
