use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use famlay::config::LayoutConfig;
use famlay::generation::classify_generations_extended;
use famlay::ir::{FamilyGraph, RelationshipEdge};
use famlay::layout::LayoutEngine;
use famlay::sync::sync_relationships;
use futures::executor::block_on;
use std::hint::black_box;

/// Every couple has `children` kids and each kid marries in, for `generations` levels.
fn synthetic_family(generations: usize, children: usize) -> FamilyGraph {
    let mut graph = FamilyGraph::new();
    let mut couples = vec![("g0-a".to_string(), "g0-b".to_string())];
    graph.add_edge(RelationshipEdge::partner("g0-a", "g0-b"));
    for generation in 1..generations {
        let mut next = Vec::new();
        for (couple_idx, (a, b)) in couples.iter().enumerate() {
            for kid in 0..children {
                let child = format!("g{generation}-{couple_idx}-{kid}");
                let spouse = format!("{child}-spouse");
                graph.add_edge(RelationshipEdge::parent(a, &child));
                graph.add_edge(RelationshipEdge::parent(b, &child));
                graph.add_edge(RelationshipEdge::partner(&child, &spouse));
                next.push((child, spouse));
            }
        }
        couples = next;
    }
    graph
}

fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");
    for (generations, children) in [(3, 2), (4, 3), (5, 3)] {
        let graph = synthetic_family(generations, children);
        let name = format!("{generations}x{children}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, data| {
            b.iter(|| {
                let nodes = sync_relationships(black_box(&data.nodes), &data.edges);
                black_box(nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for (generations, children) in [(3, 2), (4, 3), (5, 3)] {
        let graph = synthetic_family(generations, children);
        let name = format!("{generations}x{children}");
        let reference = graph.nodes.last().map(|node| node.id.clone()).unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, data| {
            b.iter(|| {
                let generations =
                    classify_generations_extended(black_box(&data.nodes), &data.edges, &reference);
                black_box(generations.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let engine = LayoutEngine::new(LayoutConfig::default());
    for (generations, children) in [(3, 2), (4, 3), (5, 3)] {
        let graph = synthetic_family(generations, children);
        let nodes = sync_relationships(&graph.nodes, &graph.edges);
        let name = format!("{generations}x{children}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &nodes, |b, data| {
            b.iter(|| {
                let placed = block_on(engine.layout(black_box(data), &graph.edges));
                black_box(placed.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_sync, bench_classify, bench_layout
);
criterion_main!(benches);
