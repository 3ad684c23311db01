//! Auto-layout for family diagrams.
//!
//! A layered-layout provider places the nodes from Parent edges alone, then
//! the correction passes in [`passes::PIPELINE`] enforce the family rules:
//! couples side by side, sibling rows, one row per generation and no overlap.

mod depth;
mod error;
mod passes;
pub mod provider;

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::config::LayoutConfig;
use crate::ir::{PersonNode, RelationshipEdge};

pub use error::LayoutError;
pub use provider::{
    DagreProvider, LayeredEdge, LayeredLayoutProvider, LayeredLayoutRequest,
    LayeredLayoutResponse, LayeredNode, LayeredSpacing,
};

pub(crate) use depth::depth_map;

#[derive(Debug, Clone)]
pub struct LayoutEngine<P = DagreProvider> {
    provider: P,
    config: LayoutConfig,
}

impl LayoutEngine<DagreProvider> {
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_provider(DagreProvider::default(), config)
    }
}

impl Default for LayoutEngine<DagreProvider> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl<P: LayeredLayoutProvider> LayoutEngine<P> {
    pub fn with_provider(provider: P, config: LayoutConfig) -> Self {
        Self {
            provider,
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out the graph, returning `nodes` unchanged if anything fails.
    ///
    /// Callers should read "no position changed" as the failure signal.
    pub async fn layout(&self, nodes: &[PersonNode], edges: &[RelationshipEdge]) -> Vec<PersonNode> {
        match self.try_layout(nodes, edges).await {
            Ok(laid_out) => laid_out,
            Err(err) => {
                tracing::warn!(error = %err, "auto layout failed, keeping original positions");
                nodes.to_vec()
            }
        }
    }

    pub async fn try_layout(
        &self,
        nodes: &[PersonNode],
        edges: &[RelationshipEdge],
    ) -> Result<Vec<PersonNode>, LayoutError> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let request = self.build_request(nodes, edges);
        tracing::debug!(
            nodes = request.nodes.len(),
            edges = request.edges.len(),
            "requesting base layout"
        );
        let response = AssertUnwindSafe(self.provider.layout(&request))
            .catch_unwind()
            .await
            .map_err(|_| LayoutError::ProviderPanicked)??;

        let mut laid_out = nodes.to_vec();
        apply_base_positions(&mut laid_out, &response)?;

        let depths = depth_map(nodes, edges);
        let index = passes::node_index(&laid_out);
        let ctx = passes::PassContext {
            config: &self.config,
            edges,
            depths: &depths,
            index: &index,
        };
        for (name, pass) in passes::PIPELINE {
            pass(&mut laid_out, &ctx);
            tracing::debug!(pass = name, "applied layout pass");
        }
        Ok(laid_out)
    }

    fn build_request(&self, nodes: &[PersonNode], edges: &[RelationshipEdge]) -> LayeredLayoutRequest {
        let mut known: HashSet<&str> = HashSet::new();
        let layered_nodes = nodes
            .iter()
            .filter(|node| known.insert(node.id.as_str()))
            .map(|node| LayeredNode {
                id: node.id.clone(),
                width: self.config.node_width,
                height: self.config.node_height,
            })
            .collect();

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let layered_edges = edges
            .iter()
            .filter(|edge| edge.is_parent() && edge.source != edge.target)
            .filter(|edge| {
                known.contains(edge.source.as_str()) && known.contains(edge.target.as_str())
            })
            .filter(|edge| seen.insert((edge.source.as_str(), edge.target.as_str())))
            .map(|edge| LayeredEdge {
                id: edge.id.clone(),
                sources: vec![edge.source.clone()],
                targets: vec![edge.target.clone()],
            })
            .collect();

        LayeredLayoutRequest {
            nodes: layered_nodes,
            edges: layered_edges,
            direction: self.config.direction,
            spacing: LayeredSpacing {
                node: self.config.node_spacing,
                rank: self.config.rank_spacing,
            },
        }
    }
}

fn apply_base_positions(
    nodes: &mut [PersonNode],
    response: &LayeredLayoutResponse,
) -> Result<(), LayoutError> {
    for node in nodes.iter_mut() {
        let Some(position) = response.positions.get(&node.id) else {
            return Err(LayoutError::MissingPosition(node.id.clone()));
        };
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(LayoutError::NonFinitePosition(node.id.clone()));
        }
        node.position = *position;
    }
    Ok(())
}

/// Lays out with the dagre provider, falling back to the input on failure.
pub async fn auto_layout(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    config: &LayoutConfig,
) -> Vec<PersonNode> {
    LayoutEngine::new(config.clone()).layout(nodes, edges).await
}
