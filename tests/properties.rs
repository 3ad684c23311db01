//! Property tests over random (often malformed) family graphs.
//!
//! Covers: synchronization idempotence, partner symmetry, classification
//! termination on cycles, and the no-overlap guarantee of the layout passes.

use std::collections::HashMap;

use famlay::layout::{LayeredLayoutRequest, LayeredLayoutResponse};
use famlay::{
    LayeredLayoutProvider, LayoutConfig, LayoutEngine, LayoutError, PersonNode, Position,
    Relationship, RelationshipEdge, classify_generations_extended, sync_relationships,
};
use futures::executor::block_on;
use proptest::prelude::*;

const KINDS: [Relationship; 4] = [
    Relationship::Parent,
    Relationship::Partner,
    Relationship::Divorced,
    Relationship::Sibling,
];

fn graph_strategy() -> impl Strategy<Value = (Vec<PersonNode>, Vec<RelationshipEdge>)> {
    (
        1usize..12,
        prop::collection::vec((0usize..12, 0usize..12, 0usize..4), 0..30),
    )
        .prop_map(|(count, raw_edges)| {
            let nodes: Vec<PersonNode> = (0..count)
                .map(|i| PersonNode::new(&format!("p{i}")))
                .collect();
            let edges = raw_edges
                .into_iter()
                .enumerate()
                .map(|(i, (a, b, kind))| {
                    let mut edge = RelationshipEdge::new(
                        &format!("p{}", a % count),
                        &format!("p{}", b % count),
                        KINDS[kind],
                    );
                    edge.id = format!("e{i}");
                    edge
                })
                .collect();
            (nodes, edges)
        })
}

/// Hands back caller-chosen positions, cycling through them.
struct ScatterProvider {
    points: Vec<(f32, f32)>,
}

impl LayeredLayoutProvider for ScatterProvider {
    async fn layout(
        &self,
        request: &LayeredLayoutRequest,
    ) -> Result<LayeredLayoutResponse, LayoutError> {
        let positions: HashMap<String, Position> = request
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let (x, y) = self.points[i % self.points.len()];
                (node.id.clone(), Position::new(x, y))
            })
            .collect();
        Ok(LayeredLayoutResponse { positions })
    }
}

proptest! {
    #[test]
    fn sync_is_idempotent((nodes, edges) in graph_strategy()) {
        let once = sync_relationships(&nodes, &edges);
        let twice = sync_relationships(&once, &edges);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn partnerships_are_symmetric((nodes, edges) in graph_strategy()) {
        let synced = sync_relationships(&nodes, &edges);
        let index: HashMap<&str, &PersonNode> =
            synced.iter().map(|node| (node.id.as_str(), node)).collect();
        for edge in edges.iter().filter(|edge| edge.is_partnership()) {
            let source = index[edge.source.as_str()];
            let target = index[edge.target.as_str()];
            prop_assert!(source.data.partners().contains(&edge.target));
            prop_assert!(target.data.partners().contains(&edge.source));
        }
    }

    #[test]
    fn classification_terminates_and_anchors_reference((nodes, edges) in graph_strategy()) {
        let generations = classify_generations_extended(&nodes, &edges, "p0");
        prop_assert_eq!(generations["p0"].generation, 0);
        prop_assert!(generations.len() <= nodes.len());
    }

    #[test]
    fn layout_never_overlaps(
        (nodes, edges) in graph_strategy(),
        points in prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0), 1..12),
    ) {
        let config = LayoutConfig::default();
        let engine = LayoutEngine::with_provider(ScatterProvider { points }, config.clone());
        let placed = block_on(engine.try_layout(&nodes, &edges)).unwrap();
        prop_assert_eq!(placed.len(), nodes.len());
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let same_row = (a.position.y / config.row_tolerance).round()
                    == (b.position.y / config.row_tolerance).round();
                if !same_row {
                    continue;
                }
                let apart = (a.position.x - b.position.x).abs() + 1e-2 >= config.node_width;
                prop_assert!(apart, "{} and {} overlap", a.id, b.id);
            }
        }
    }
}
