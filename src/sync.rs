use std::collections::{BTreeSet, HashMap, HashSet};

use crate::ir::{PersonNode, Relationship, RelationshipEdge};

/// Rebuilds every node's `parents` / `children` / `partners` from the edge list.
///
/// The edge list is the source of truth: each field is replaced by the sorted
/// ids recorded for that node, or cleared when there are none. Edges whose
/// endpoints are not in `nodes` are skipped. Running this on its own output is
/// a no-op.
pub fn sync_relationships(nodes: &[PersonNode], edges: &[RelationshipEdge]) -> Vec<PersonNode> {
    let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();

    let mut parents: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    let mut children: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    let mut partners: HashMap<&str, BTreeSet<&str>> = HashMap::new();

    for edge in edges {
        let Some(relationship) = edge.relationship() else {
            continue;
        };
        let (source, target) = (edge.source.as_str(), edge.target.as_str());
        if !known.contains(source) || !known.contains(target) {
            continue;
        }
        match relationship {
            Relationship::Parent => {
                parents.entry(target).or_default().insert(source);
                children.entry(source).or_default().insert(target);
            }
            Relationship::Partner | Relationship::Divorced => {
                partners.entry(source).or_default().insert(target);
                partners.entry(target).or_default().insert(source);
            }
            Relationship::Sibling => {}
        }
    }

    nodes
        .iter()
        .map(|node| {
            let mut synced = node.clone();
            let id = node.id.as_str();
            synced.data.parents = to_sorted_ids(parents.get(id));
            synced.data.children = to_sorted_ids(children.get(id));
            synced.data.partners = to_sorted_ids(partners.get(id));
            synced
        })
        .collect()
}

fn to_sorted_ids(set: Option<&BTreeSet<&str>>) -> Option<Vec<String>> {
    let set = set?;
    if set.is_empty() {
        return None;
    }
    Some(set.iter().map(|id| id.to_string()).collect())
}
