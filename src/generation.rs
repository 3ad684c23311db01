//! Generation classification relative to a reference person.
//!
//! Generation 0 is the reference, positive numbers are ancestors and negative
//! numbers descendants. Partners always share a generation. The extended form
//! also reaches collateral relatives (siblings of every ancestor and
//! descendant) and flags them so filtered views can tell a grandparent from a
//! great-aunt at the same depth.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ir::{FamilyGraph, PersonNode, Relationship, RelationshipEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationInfo {
    pub generation: i32,
    /// Reached through a sibling hop rather than direct lineage.
    pub via_sibling: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub ancestor_depth: u32,
    pub descendant_depth: u32,
    /// `None` keeps every sibling-reached node within the depth range.
    #[serde(default)]
    pub sibling_hop_depth: Option<u32>,
}

impl FilterOptions {
    pub fn new(ancestor_depth: u32, descendant_depth: u32) -> Self {
        Self {
            ancestor_depth,
            descendant_depth,
            sibling_hop_depth: None,
        }
    }

    pub fn with_sibling_hops(mut self, hops: u32) -> Self {
        self.sibling_hop_depth = Some(hops);
        self
    }

    fn keeps(&self, info: GenerationInfo) -> bool {
        let generation = i64::from(info.generation);
        if generation > i64::from(self.ancestor_depth)
            || generation < -i64::from(self.descendant_depth)
        {
            return false;
        }
        if !info.via_sibling {
            return true;
        }
        match self.sibling_hop_depth {
            Some(hops) => i64::from(hops) > generation.abs(),
            None => true,
        }
    }
}

/// Generation of every person reachable from `reference` through direct
/// lineage, partners and the reference's own siblings.
///
/// Returns an empty map when `reference` is not in `nodes`.
pub fn classify_generations(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    reference: &str,
) -> HashMap<String, i32> {
    classify(nodes, edges, reference, false)
        .into_iter()
        .map(|(id, info)| (id, info.generation))
        .collect()
}

/// Like [`classify_generations`], additionally reaching siblings of every
/// ancestor and descendant and flagging sibling-reached people.
pub fn classify_generations_extended(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    reference: &str,
) -> HashMap<String, GenerationInfo> {
    classify(nodes, edges, reference, true)
}

/// The part of the graph visible from `reference` under `options`.
///
/// Node order follows the input; edges survive only when both ends do.
pub fn filter_visible(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    reference: &str,
    options: &FilterOptions,
) -> FamilyGraph {
    let generations = classify_generations_extended(nodes, edges, reference);
    let kept_nodes: Vec<PersonNode> = nodes
        .iter()
        .filter(|node| {
            generations
                .get(&node.id)
                .is_some_and(|info| options.keeps(*info))
        })
        .cloned()
        .collect();
    let kept_ids: HashSet<&str> = kept_nodes.iter().map(|node| node.id.as_str()).collect();
    let kept_edges = edges
        .iter()
        .filter(|edge| {
            kept_ids.contains(edge.source.as_str()) && kept_ids.contains(edge.target.as_str())
        })
        .cloned()
        .collect();
    FamilyGraph {
        nodes: kept_nodes,
        edges: kept_edges,
    }
}

fn classify(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    reference: &str,
    collateral: bool,
) -> HashMap<String, GenerationInfo> {
    if !nodes.iter().any(|node| node.id == reference) {
        return HashMap::new();
    }
    let kin = Kinship::from_edges(nodes, edges);
    let mut walk = Walk {
        kin: &kin,
        found: HashMap::new(),
        collateral,
    };

    walk.assign(reference, 0, false);
    for partner in kin.partners(reference) {
        walk.assign(partner, 0, false);
    }
    walk.traverse(reference, Direction::Up);
    walk.traverse(reference, Direction::Down);
    for sibling in kin.siblings(reference) {
        if walk.assign(sibling, 0, true) {
            for partner in kin.partners(sibling) {
                walk.assign(partner, 0, true);
            }
        }
    }

    tracing::trace!(reference, classified = walk.found.len(), "classified generations");
    walk.found
        .into_iter()
        .map(|(id, info)| (id.to_string(), info))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    fn step(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Adjacency built once per classification, restricted to known nodes.
struct Kinship<'a> {
    parents: HashMap<&'a str, Vec<&'a str>>,
    children: HashMap<&'a str, Vec<&'a str>>,
    partners: HashMap<&'a str, Vec<&'a str>>,
    siblings: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Kinship<'a> {
    fn from_edges(nodes: &'a [PersonNode], edges: &'a [RelationshipEdge]) -> Self {
        let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let mut kin = Self {
            parents: HashMap::new(),
            children: HashMap::new(),
            partners: HashMap::new(),
            siblings: HashMap::new(),
        };
        for edge in edges {
            let Some(relationship) = edge.relationship() else {
                continue;
            };
            let (source, target) = (edge.source.as_str(), edge.target.as_str());
            if source == target || !known.contains(source) || !known.contains(target) {
                continue;
            }
            match relationship {
                Relationship::Parent => {
                    push_unique(kin.children.entry(source).or_default(), target);
                    push_unique(kin.parents.entry(target).or_default(), source);
                }
                Relationship::Partner | Relationship::Divorced => {
                    push_unique(kin.partners.entry(source).or_default(), target);
                    push_unique(kin.partners.entry(target).or_default(), source);
                }
                Relationship::Sibling => {
                    push_unique(kin.siblings.entry(source).or_default(), target);
                    push_unique(kin.siblings.entry(target).or_default(), source);
                }
            }
        }
        kin
    }

    fn lineage(&self, id: &str, direction: Direction) -> &[&'a str] {
        let map = match direction {
            Direction::Up => &self.parents,
            Direction::Down => &self.children,
        };
        map.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    fn partners(&self, id: &str) -> Vec<&'a str> {
        self.partners.get(id).cloned().unwrap_or_default()
    }

    /// Explicit sibling edges plus everyone sharing a recorded parent.
    fn siblings(&self, id: &str) -> Vec<&'a str> {
        let mut out = self.siblings.get(id).cloned().unwrap_or_default();
        for parent in self.lineage(id, Direction::Up) {
            for &child in self.lineage(parent, Direction::Down) {
                if child != id {
                    push_unique(&mut out, child);
                }
            }
        }
        out
    }
}

struct Walk<'k, 'a> {
    kin: &'k Kinship<'a>,
    found: HashMap<&'a str, GenerationInfo>,
    collateral: bool,
}

impl<'a> Walk<'_, 'a> {
    /// First discovery wins; returns false if `id` already had a generation.
    fn assign(&mut self, id: &'a str, generation: i32, via_sibling: bool) -> bool {
        if self.found.contains_key(id) {
            return false;
        }
        self.found.insert(
            id,
            GenerationInfo {
                generation,
                via_sibling,
            },
        );
        true
    }

    fn traverse(&mut self, reference: &'a str, direction: Direction) {
        let kin = self.kin;
        let mut visited: HashSet<&'a str> = HashSet::from([reference]);
        let mut frontier: Vec<&'a str> = vec![reference];
        let mut level = 0;

        while !frontier.is_empty() {
            level += direction.step();
            let mut next: Vec<&'a str> = Vec::new();
            for id in &frontier {
                for &relative in kin.lineage(id, direction) {
                    if visited.insert(relative) {
                        self.assign(relative, level, false);
                        next.push(relative);
                    }
                }
            }
            for id in &next {
                for partner in kin.partners(id) {
                    self.assign(partner, level, false);
                }
            }
            if self.collateral {
                for id in &next {
                    for sibling in kin.siblings(id) {
                        if self.assign(sibling, level, true) {
                            for partner in kin.partners(sibling) {
                                self.assign(partner, level, true);
                            }
                        }
                    }
                }
            }
            frontier = next;
        }
    }
}

fn push_unique<'a>(list: &mut Vec<&'a str>, id: &'a str) {
    if !list.contains(&id) {
        list.push(id);
    }
}
