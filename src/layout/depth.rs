use std::collections::{HashMap, HashSet};

use crate::ir::{PersonNode, RelationshipEdge};

/// Absolute hierarchy depth per node: 0 for people without recorded parents,
/// otherwise one below their deepest parent. Partners are then pushed to the
/// deeper of the two so a couple never straddles generations, and anyone
/// below a raised partner moves down with them.
///
/// Parents on the current DFS path are skipped, so cycles terminate.
pub(crate) fn depth_map(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
) -> HashMap<String, usize> {
    let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut couples: Vec<(&str, &str)> = Vec::new();
    for edge in edges {
        let (source, target) = (edge.source.as_str(), edge.target.as_str());
        if source == target || !known.contains(source) || !known.contains(target) {
            continue;
        }
        if edge.is_parent() {
            let list = parents.entry(target).or_default();
            if !list.contains(&source) {
                list.push(source);
            }
        } else if edge.is_partnership() {
            couples.push((source, target));
        }
    }

    let mut depth: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    let mut on_path: HashSet<&str> = HashSet::new();
    for node in nodes {
        let mut stack: Vec<(&str, bool)> = vec![(node.id.as_str(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if depth.contains_key(id) {
                continue;
            }
            let recorded = parents.get(id).map(Vec::as_slice).unwrap_or_default();
            if expanded {
                on_path.remove(id);
                let value = recorded
                    .iter()
                    .filter_map(|parent| depth.get(parent))
                    .max()
                    .map_or(0, |deepest| deepest + 1);
                depth.insert(id, value);
                continue;
            }
            if !on_path.insert(id) {
                continue;
            }
            stack.push((id, true));
            for parent in recorded {
                if !depth.contains_key(parent) && !on_path.contains(parent) {
                    stack.push((*parent, false));
                }
            }
        }
    }

    // Raising a partner can leave their children level with them, so partner
    // and child constraints are swept together until both hold. Sweeps only
    // raise depths; the cap stops cyclic parent chains from climbing forever.
    for _ in 0..=nodes.len() {
        let mut changed = false;
        for (a, b) in &couples {
            let da = depth.get(a).copied().unwrap_or_default();
            let db = depth.get(b).copied().unwrap_or_default();
            if da != db {
                let deeper = da.max(db);
                depth.insert(*a, deeper);
                depth.insert(*b, deeper);
                changed = true;
            }
        }
        for (child, recorded) in &parents {
            let Some(below) = recorded
                .iter()
                .filter_map(|parent| depth.get(parent))
                .max()
                .map(|deepest| deepest + 1)
            else {
                continue;
            };
            let current = depth.entry(*child).or_default();
            if *current < below {
                *current = below;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    depth
        .into_iter()
        .map(|(id, value)| (id.to_string(), value))
        .collect()
}
