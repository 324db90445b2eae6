//! Criterion benchmarks for graph evaluation.
//!
//! Run with: `cargo bench --bench evaluation`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use tracegraph::{
    EvaluationConfig, Graph, VertexId, coverage_markers, evaluate_marker_matching,
    evaluate_shortest_paths,
};

/// A `size` x `size` grid of two-way streets, optionally shifted.
fn grid_graph(size: usize, spacing: f64, shift: f64) -> Graph {
    let mut graph = Graph::with_capacity(size * size, size * size * 4);
    for row in 0..size {
        for col in 0..size {
            graph.add_vertex(col as f64 * spacing + shift, row as f64 * spacing + shift);
        }
    }
    let id = |row: usize, col: usize| VertexId(row * size + col);
    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                graph.add_edge(id(row, col), id(row, col + 1)).ok();
                graph.add_edge(id(row, col + 1), id(row, col)).ok();
            }
            if row + 1 < size {
                graph.add_edge(id(row, col), id(row + 1, col)).ok();
                graph.add_edge(id(row + 1, col), id(row, col)).ok();
            }
        }
    }
    graph
}

fn bench_coverage_markers(c: &mut Criterion) {
    let mut group = c.benchmark_group("coverage_markers");

    for size in [10, 30, 60] {
        let graph = grid_graph(size, 100.0, 0.0);
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, _| {
            b.iter(|| coverage_markers(black_box(&graph), 30.0));
        });
    }

    group.finish();
}

fn bench_marker_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("marker_matching");
    let config = EvaluationConfig::default();

    for size in [10, 30] {
        let actual = grid_graph(size, 100.0, 0.0);
        let inferred = grid_graph(size, 100.0, 8.0);
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, _| {
            b.iter(|| evaluate_marker_matching(&actual, &inferred, &config));
        });
    }

    group.finish();
}

fn bench_shortest_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_paths");
    group.sample_size(20);
    let config = EvaluationConfig::default();

    let actual = grid_graph(30, 100.0, 0.0);
    let inferred = grid_graph(30, 100.0, 8.0);
    group.bench_function("grid_30_100_trials", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(config.seed);
            evaluate_shortest_paths(&actual, &inferred, &config, &mut rng)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_coverage_markers,
    bench_marker_matching,
    bench_shortest_paths
);
criterion_main!(benches);
