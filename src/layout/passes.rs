//! Geometric correction passes run after the base layout.
//!
//! Order matters: generation alignment has the final word on Y and collision
//! resolution the final word on X. Each pass only rewrites `position`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::{PersonNode, RelationshipEdge};

pub(crate) struct PassContext<'a> {
    pub config: &'a LayoutConfig,
    pub edges: &'a [RelationshipEdge],
    pub depths: &'a HashMap<String, usize>,
    pub index: &'a HashMap<String, usize>,
}

impl PassContext<'_> {
    fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Index pairs of every Partner/Divorced edge between distinct known nodes.
    fn couples(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges
            .iter()
            .filter(|edge| edge.is_partnership())
            .filter_map(|edge| Some((self.lookup(&edge.source)?, self.lookup(&edge.target)?)))
            .filter(|(a, b)| a != b)
    }
}

pub(crate) type Pass = fn(&mut [PersonNode], &PassContext<'_>);

pub(crate) const PIPELINE: [(&str, Pass); 4] = [
    ("partner adjacency", align_partners),
    ("sibling alignment", align_siblings),
    ("generation alignment", align_generations),
    ("collision resolution", resolve_collisions),
];

pub(crate) fn node_index(nodes: &[PersonNode]) -> HashMap<String, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.clone(), idx))
        .collect()
}

/// Puts each couple side by side: shared Y, right partner exactly
/// `partner_spacing` from the left one.
pub(crate) fn align_partners(nodes: &mut [PersonNode], ctx: &PassContext<'_>) {
    let couples: Vec<(usize, usize)> = ctx.couples().collect();
    for (a, b) in couples {
        let (left, right) = if nodes[a].position.x <= nodes[b].position.x {
            (a, b)
        } else {
            (b, a)
        };
        let y = (nodes[left].position.y + nodes[right].position.y) / 2.0;
        nodes[left].position.y = y;
        nodes[right].position.y = y;
        nodes[right].position.x = nodes[left].position.x + ctx.config.partner_spacing;
    }
}

/// Aligns children of the same parent set on one row. Partnered members
/// already hold a Y chosen by the partner pass, so they lead when present.
pub(crate) fn align_siblings(nodes: &mut [PersonNode], ctx: &PassContext<'_>) {
    let mut parent_sets: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();
    for edge in ctx.edges.iter().filter(|edge| edge.is_parent()) {
        if edge.source == edge.target || ctx.lookup(&edge.source).is_none() {
            continue;
        }
        if let Some(child) = ctx.lookup(&edge.target) {
            parent_sets
                .entry(child)
                .or_default()
                .insert(edge.source.as_str());
        }
    }

    let mut groups: BTreeMap<Vec<&str>, Vec<usize>> = BTreeMap::new();
    for (child, parents) in parent_sets {
        groups
            .entry(parents.into_iter().collect())
            .or_default()
            .push(child);
    }

    let partnered: HashSet<usize> = ctx.couples().flat_map(|(a, b)| [a, b]).collect();

    for members in groups.values() {
        if members.len() < 2 {
            continue;
        }
        let anchors: Vec<usize> = members
            .iter()
            .copied()
            .filter(|idx| partnered.contains(idx))
            .collect();
        let basis = if anchors.is_empty() { members } else { &anchors };
        let y = average_y(nodes, basis);
        for &idx in members {
            nodes[idx].position.y = y;
        }
    }
}

/// Every node at one hierarchy depth takes that depth's average Y, kept at
/// least a box height plus `min_node_gap` below the row above it.
pub(crate) fn align_generations(nodes: &mut [PersonNode], ctx: &PassContext<'_>) {
    let mut generations: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        if ctx.lookup(&node.id) != Some(idx) {
            continue;
        }
        let depth = ctx.depths.get(&node.id).copied().unwrap_or_default();
        generations.entry(depth).or_default().push(idx);
    }
    let step = ctx.config.node_height + ctx.config.min_node_gap;
    let mut previous: Option<f32> = None;
    for members in generations.values() {
        let mut y = average_y(nodes, members);
        if let Some(above) = previous {
            y = y.max(above + step);
        }
        for &idx in members {
            nodes[idx].position.y = y;
        }
        previous = Some(y);
    }
}

/// Pushes nodes right, row by row, until neighbours are at least
/// `min_node_gap` apart.
pub(crate) fn resolve_collisions(nodes: &mut [PersonNode], ctx: &PassContext<'_>) {
    let config = ctx.config;
    let mut rows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        let key = (node.position.y / config.row_tolerance).round() as i64;
        rows.entry(key).or_default().push(idx);
    }

    for row in rows.values_mut() {
        row.sort_by(|a, b| {
            match nodes[*a].position.x.total_cmp(&nodes[*b].position.x) {
                Ordering::Equal => nodes[*a].id.cmp(&nodes[*b].id),
                other => other,
            }
        });
        for i in 1..row.len() {
            let prev = &nodes[row[i - 1]];
            let gap = nodes[row[i]].position.x - (prev.position.x + config.node_width);
            if gap >= config.min_node_gap {
                continue;
            }
            let deficit = config.min_node_gap - gap;
            for &idx in &row[i..] {
                nodes[idx].position.x += deficit;
            }
        }
    }
}

fn average_y(nodes: &[PersonNode], members: &[usize]) -> f32 {
    if members.is_empty() {
        return 0.0;
    }
    let sum: f32 = members.iter().map(|idx| nodes[*idx].position.y).sum();
    sum / members.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        nodes: Vec<PersonNode>,
        edges: Vec<RelationshipEdge>,
        config: LayoutConfig,
        depths: HashMap<String, usize>,
        index: HashMap<String, usize>,
    }

    impl Fixture {
        fn new(nodes: Vec<PersonNode>, edges: Vec<RelationshipEdge>) -> Self {
            let depths = crate::layout::depth::depth_map(&nodes, &edges);
            let index = node_index(&nodes);
            Self {
                nodes,
                edges,
                config: LayoutConfig::default(),
                depths,
                index,
            }
        }

        fn run(&mut self, pass: Pass) {
            let ctx = PassContext {
                config: &self.config,
                edges: &self.edges,
                depths: &self.depths,
                index: &self.index,
            };
            pass(&mut self.nodes, &ctx);
        }

        fn pos(&self, id: &str) -> (f32, f32) {
            let node = &self.nodes[self.index[id]];
            (node.position.x, node.position.y)
        }
    }

    #[test]
    fn partners_become_adjacent_from_the_left_member() {
        let mut fx = Fixture::new(
            vec![PersonNode::at("a", 500.0, 10.0), PersonNode::at("b", 100.0, 30.0)],
            vec![RelationshipEdge::partner("a", "b")],
        );
        fx.run(align_partners);
        assert_eq!(fx.pos("b"), (100.0, 20.0));
        assert_eq!(fx.pos("a"), (350.0, 20.0));
    }

    #[test]
    fn siblings_follow_partnered_members() {
        let mut fx = Fixture::new(
            vec![
                PersonNode::at("mom", 0.0, 0.0),
                PersonNode::at("x", 0.0, 100.0),
                PersonNode::at("y", 300.0, 200.0),
                PersonNode::at("z", 600.0, 260.0),
                PersonNode::at("y-spouse", 900.0, 200.0),
            ],
            vec![
                RelationshipEdge::parent("mom", "x"),
                RelationshipEdge::parent("mom", "y"),
                RelationshipEdge::parent("mom", "z"),
                RelationshipEdge::partner("y", "y-spouse"),
            ],
        );
        fx.run(align_siblings);
        assert_eq!(fx.pos("x").1, 200.0);
        assert_eq!(fx.pos("z").1, 200.0);
        assert_eq!(fx.pos("mom").1, 0.0);
    }

    #[test]
    fn siblings_without_partners_use_group_average() {
        let mut fx = Fixture::new(
            vec![
                PersonNode::at("mom", 0.0, 0.0),
                PersonNode::at("dad", 300.0, 0.0),
                PersonNode::at("x", 0.0, 100.0),
                PersonNode::at("y", 300.0, 200.0),
                PersonNode::at("half", 600.0, 400.0),
            ],
            vec![
                RelationshipEdge::parent("mom", "x"),
                RelationshipEdge::parent("dad", "x"),
                RelationshipEdge::parent("dad", "y"),
                RelationshipEdge::parent("mom", "y"),
                RelationshipEdge::parent("mom", "half"),
            ],
        );
        fx.run(align_siblings);
        assert_eq!(fx.pos("x").1, 150.0);
        assert_eq!(fx.pos("y").1, 150.0);
        // Different parent set, own group of one.
        assert_eq!(fx.pos("half").1, 400.0);
    }

    #[test]
    fn generations_share_average_y() {
        let mut fx = Fixture::new(
            vec![
                PersonNode::at("a", 0.0, 0.0),
                PersonNode::at("b", 300.0, 20.0),
                PersonNode::at("c", 0.0, 200.0),
            ],
            vec![RelationshipEdge::parent("a", "c")],
        );
        fx.run(align_generations);
        assert_eq!(fx.pos("a").1, 10.0);
        assert_eq!(fx.pos("b").1, 10.0);
        assert_eq!(fx.pos("c").1, 200.0);
    }

    #[test]
    fn deeper_generations_never_rise_above_shallower_ones() {
        // The in-law sat on the top rank, dragging its generation's average up
        // towards the row of its own child.
        let mut fx = Fixture::new(
            vec![
                PersonNode::at("gp", 0.0, 8.0),
                PersonNode::at("p", 0.0, 208.0),
                PersonNode::at("in-law", 250.0, 8.0),
                PersonNode::at("step", 400.0, 208.0),
            ],
            vec![
                RelationshipEdge::parent("gp", "p"),
                RelationshipEdge::partner("p", "in-law"),
                RelationshipEdge::parent("in-law", "step"),
            ],
        );
        fx.run(align_generations);
        assert_eq!(fx.pos("gp").1, 8.0);
        assert_eq!(fx.pos("p").1, 128.0);
        assert_eq!(fx.pos("in-law").1, 128.0);
        assert_eq!(fx.pos("step").1, 248.0);
    }

    #[test]
    fn collisions_push_the_rest_of_the_row() {
        let mut fx = Fixture::new(
            vec![
                PersonNode::at("a", 0.0, 0.0),
                PersonNode::at("b", 50.0, 2.0),
                PersonNode::at("c", 400.0, 0.0),
                PersonNode::at("other-row", 10.0, 300.0),
            ],
            vec![],
        );
        fx.run(resolve_collisions);
        // b moves to 180 + 40; c keeps its lead of 350 over b's old spot.
        assert_eq!(fx.pos("b").0, 220.0);
        assert_eq!(fx.pos("c").0, 570.0);
        assert_eq!(fx.pos("other-row").0, 10.0);
    }

    #[test]
    fn coincident_nodes_are_separated() {
        let mut fx = Fixture::new(
            vec![PersonNode::at("b", 0.0, 0.0), PersonNode::at("a", 0.0, 0.0)],
            vec![],
        );
        fx.run(resolve_collisions);
        assert_eq!(fx.pos("a").0, 0.0);
        assert_eq!(fx.pos("b").0, 220.0);
    }
}
