use crate::config::LayoutConfig;
use crate::ir::{PersonNode, RelationshipEdge};
use crate::layout::depth_map;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relationship: Option<String>,
    pub source_handle: Option<String>,
}

impl LayoutDump {
    pub fn from_graph(
        nodes: &[PersonNode],
        edges: &[RelationshipEdge],
        config: &LayoutConfig,
    ) -> Self {
        let depths = depth_map(nodes, edges);
        let node_dumps: Vec<NodeDump> = nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
                width: config.node_width,
                height: config.node_height,
                depth: depths.get(&node.id).copied().unwrap_or_default(),
            })
            .collect();

        let edge_dumps = edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                relationship: edge.relationship().map(|kind| format!("{kind:?}")),
                source_handle: edge.source_handle.clone(),
            })
            .collect();

        let (width, height) = extent(&node_dumps);
        LayoutDump {
            width,
            height,
            nodes: node_dumps,
            edges: edge_dumps,
        }
    }
}

/// Size of the bounding box around every node, zero when empty.
fn extent(nodes: &[NodeDump]) -> (f32, f32) {
    if nodes.is_empty() {
        return (0.0, 0.0);
    }
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for node in nodes {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    (max_x - min_x, max_y - min_y)
}

pub fn write_layout_dump(
    path: &Path,
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    config: &LayoutConfig,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_graph(nodes, edges, config);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
