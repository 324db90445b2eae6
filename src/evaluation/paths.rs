//! Shortest-path agreement between two graphs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::EvaluationConfig;
use crate::error::{OptionExt, Result};
use crate::graph::{Graph, Vertex, VertexId};
use crate::spatial_index::SpatialIndex;

/// Priority queue entry, ordered so the smallest key pops first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    key: f64,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Length of the shortest directed path from `src` to `dst`, following
/// out-edges weighted by their Euclidean length.
///
/// Returns `None` when `dst` is unreachable or either id is out of range.
pub fn shortest_path_distance(graph: &Graph, src: VertexId, dst: VertexId) -> Option<f64> {
    let n = graph.vertex_count();
    if src.0 >= n || dst.0 >= n {
        return None;
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut heap = BinaryHeap::new();
    dist[src.0] = 0.0;
    heap.push(State {
        key: 0.0,
        node: src.0,
    });

    while let Some(State { key, node }) = heap.pop() {
        if node == dst.0 {
            return Some(key);
        }
        if key > dist[node] {
            continue;
        }
        for edge in graph.out_edges(VertexId(node)) {
            let next = key + graph.edge_length(edge);
            if next < dist[edge.dst.0] {
                dist[edge.dst.0] = next;
                heap.push(State {
                    key: next,
                    node: edge.dst.0,
                });
            }
        }
    }

    None
}

/// One sampled vertex pair and the path lengths found in each graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub actual_source: VertexId,
    pub actual_target: VertexId,
    pub inferred_source: VertexId,
    pub inferred_target: VertexId,
    /// `None` when no route exists
    pub actual: Option<f64>,
    pub inferred: Option<f64>,
}

impl TrialOutcome {
    /// Both graphs agree there is no route, or both routes are within `tolerance`.
    pub fn matches(&self, tolerance: f64) -> bool {
        match (self.actual, self.inferred) {
            (None, None) => true,
            (Some(a), Some(i)) => (a - i).abs() < tolerance,
            _ => false,
        }
    }
}

/// Fraction of sampled vertex pairs whose shortest paths agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAgreementReport {
    pub trials: usize,
    pub matched: usize,
    /// `matched / trials`, in `[0, 1]`
    pub score: f64,
    pub outcomes: Vec<TrialOutcome>,
}

impl fmt::Display for PathAgreementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score)
    }
}

/// Compare shortest-path lengths between random vertex pairs.
///
/// Each trial picks two random vertices of `actual`, maps each onto its
/// nearest vertex of `inferred`, and runs Dijkstra in both graphs. A trial
/// matches when both report no route, or both path lengths differ by less
/// than `path_tolerance`.
pub fn evaluate_shortest_paths<R: Rng + ?Sized>(
    actual: &Graph,
    inferred: &Graph,
    config: &EvaluationConfig,
    rng: &mut R,
) -> Result<PathAgreementReport> {
    config.validate()?;
    actual.vertices().first().ok_or_empty_graph("actual")?;
    let inferred_index = SpatialIndex::new(inferred.vertices());
    inferred_index
        .items()
        .first()
        .ok_or_empty_graph("inferred")?;

    let mut outcomes = Vec::with_capacity(config.path_trials);
    for _ in 0..config.path_trials {
        let actual_one = actual.vertices().choose(rng).ok_or_empty_graph("actual")?;
        let actual_two = actual.vertices().choose(rng).ok_or_empty_graph("actual")?;
        let inferred_one = nearest_vertex(&inferred_index, actual_one)?;
        let inferred_two = nearest_vertex(&inferred_index, actual_two)?;

        let outcome = TrialOutcome {
            actual_source: actual_one.id,
            actual_target: actual_two.id,
            inferred_source: inferred_one.id,
            inferred_target: inferred_two.id,
            actual: shortest_path_distance(actual, actual_one.id, actual_two.id),
            inferred: shortest_path_distance(inferred, inferred_one.id, inferred_two.id),
        };
        debug!(
            "[Paths] {} -> {}: actual={:?} inferred={:?}",
            outcome.actual_source, outcome.actual_target, outcome.actual, outcome.inferred
        );
        outcomes.push(outcome);
    }

    let matched = outcomes
        .iter()
        .filter(|o| o.matches(config.path_tolerance))
        .count();
    let score = matched as f64 / outcomes.len() as f64;

    info!(
        "[Paths] {}/{} trials agree (score {:.4})",
        matched,
        outcomes.len(),
        score
    );

    Ok(PathAgreementReport {
        trials: outcomes.len(),
        matched,
        score,
        outcomes,
    })
}

fn nearest_vertex<'a>(index: &SpatialIndex<'a, Vertex>, vertex: &Vertex) -> Result<&'a Vertex> {
    index.nearest(vertex).ok_or_empty_graph("inferred")
}
