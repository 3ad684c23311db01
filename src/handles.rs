//! Child connector ports.
//!
//! A parent gets one outgoing port per co-parent so that siblings sharing the
//! same second parent merge onto one connector instead of one line per child.

use std::collections::HashMap;

use crate::ir::{PersonNode, RelationshipEdge};

pub const CHILD_HANDLE_PREFIX: &str = "child-";
/// Port used when no group matches, which is also where a first child lands.
pub const DEFAULT_CHILD_HANDLE: &str = "child-0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleGroup {
    pub handle_id: String,
    pub children: Vec<String>,
    /// The children's other parent; `None` for children with one parent.
    pub other_parent: Option<String>,
}

/// Groups `parent_id`'s children by their other parent, in first-seen edge order.
///
/// The other parent is read from each child's recorded `parents`, so the node
/// list should be synchronized first.
pub fn resolve_handle_groups(
    parent_id: &str,
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
) -> Vec<HandleGroup> {
    let by_id: HashMap<&str, &PersonNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();

    let mut groups: Vec<HandleGroup> = Vec::new();
    let mut group_index: HashMap<Option<&str>, usize> = HashMap::new();

    for edge in edges {
        if !edge.is_parent() || edge.source != parent_id {
            continue;
        }
        let child = edge.target.as_str();
        let other_parent = by_id.get(child).and_then(|node| {
            node.data
                .parents()
                .iter()
                .map(String::as_str)
                .find(|id| *id != parent_id)
        });
        let idx = *group_index.entry(other_parent).or_insert_with(|| {
            groups.push(HandleGroup {
                handle_id: format!("{CHILD_HANDLE_PREFIX}{}", groups.len()),
                children: Vec::new(),
                other_parent: other_parent.map(str::to_string),
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];
        if !group.children.iter().any(|existing| existing == child) {
            group.children.push(child.to_string());
        }
    }

    groups
}

/// Port id for the edge from `parent_id` to `child_id`.
pub fn child_handle_id(
    parent_id: &str,
    child_id: &str,
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
) -> String {
    resolve_handle_groups(parent_id, nodes, edges)
        .into_iter()
        .find(|group| group.children.iter().any(|child| child == child_id))
        .map(|group| group.handle_id)
        .unwrap_or_else(|| DEFAULT_CHILD_HANDLE.to_string())
}

/// Returns the edges with every Parent edge's `source_handle` set to its port.
pub fn assign_edge_handles(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
) -> Vec<RelationshipEdge> {
    let mut resolved: HashMap<&str, HashMap<String, String>> = HashMap::new();
    for edge in edges.iter().filter(|edge| edge.is_parent()) {
        let parent = edge.source.as_str();
        if resolved.contains_key(parent) {
            continue;
        }
        let mut ports: HashMap<String, String> = HashMap::new();
        for group in resolve_handle_groups(parent, nodes, edges) {
            for child in group.children {
                ports.insert(child, group.handle_id.clone());
            }
        }
        resolved.insert(parent, ports);
    }

    edges
        .iter()
        .map(|edge| {
            let mut out = edge.clone();
            if edge.is_parent() {
                let port = resolved
                    .get(edge.source.as_str())
                    .and_then(|ports| ports.get(edge.target.as_str()))
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_CHILD_HANDLE.to_string());
                out.source_handle = Some(port);
            }
            out
        })
        .collect()
}
