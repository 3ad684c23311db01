//! The layered-layout provider seam.
//!
//! The engine only ever hands the provider hierarchy (Parent) edges and
//! fixed-size boxes; everything family-specific happens in the correction
//! passes afterwards. [`DagreProvider`] is the production implementation,
//! tests substitute their own.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use super::LayoutError;
use crate::config::Direction;
use crate::ir::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredEdge {
    pub id: String,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredSpacing {
    /// Between neighbours in one rank.
    pub node: f32,
    /// Between ranks.
    pub rank: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredLayoutRequest {
    pub nodes: Vec<LayeredNode>,
    pub edges: Vec<LayeredEdge>,
    pub direction: Direction,
    pub spacing: LayeredSpacing,
}

/// Top-left corner per node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayeredLayoutResponse {
    pub positions: HashMap<String, Position>,
}

pub trait LayeredLayoutProvider {
    fn layout(
        &self,
        request: &LayeredLayoutRequest,
    ) -> impl Future<Output = Result<LayeredLayoutResponse, LayoutError>>;
}

/// Sugiyama-style layout through `dagre_rust`. Panics inside dagre surface
/// through the engine as [`LayoutError::ProviderPanicked`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DagreProvider {
    pub margin: f32,
}

impl Default for DagreProvider {
    fn default() -> Self {
        Self { margin: 8.0 }
    }
}

impl LayeredLayoutProvider for DagreProvider {
    async fn layout(
        &self,
        request: &LayeredLayoutRequest,
    ) -> Result<LayeredLayoutResponse, LayoutError> {
        run_dagre(request, self.margin)
    }
}

fn run_dagre(
    request: &LayeredLayoutRequest,
    margin: f32,
) -> Result<LayeredLayoutResponse, LayoutError> {
    if request.nodes.is_empty() {
        return Ok(LayeredLayoutResponse::default());
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(request.direction.as_rankdir().to_string());
    graph_config.nodesep = Some(request.spacing.node);
    graph_config.ranksep = Some(request.spacing.rank);
    graph_config.marginx = Some(margin);
    graph_config.marginy = Some(margin);
    dagre_graph.set_graph(graph_config);

    let mut node_set: HashSet<&str> = HashSet::new();
    for layered in &request.nodes {
        if !node_set.insert(layered.id.as_str()) {
            continue;
        }
        let mut node = DagreNode::default();
        node.width = layered.width;
        node.height = layered.height;
        dagre_graph.set_node(layered.id.clone(), Some(node));
    }

    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in &request.edges {
        for from in &edge.sources {
            for to in &edge.targets {
                if from == to || !node_set.contains(from.as_str()) || !node_set.contains(to.as_str())
                {
                    continue;
                }
                if !edge_set.insert((from.clone(), to.clone())) {
                    continue;
                }
                let edge_label = DagreEdge::default();
                let _ = dagre_graph.set_edge(from, to, Some(edge_label), None);
            }
        }
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut positions = HashMap::with_capacity(request.nodes.len());
    for layered in &request.nodes {
        let Some(dagre_node) = dagre_graph.node(&layered.id) else {
            return Err(LayoutError::MissingPosition(layered.id.clone()));
        };
        positions.insert(
            layered.id.clone(),
            Position::new(
                dagre_node.x - layered.width / 2.0,
                dagre_node.y - layered.height / 2.0,
            ),
        );
    }
    Ok(LayeredLayoutResponse { positions })
}
