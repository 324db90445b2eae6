//! Coverage markers and marker-matching precision/recall.

use std::collections::VecDeque;
use std::fmt;

use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::EvaluationConfig;
use crate::Planar;
use crate::error::{Result, TraceGraphError};
use crate::graph::{EdgeId, Graph, VertexId};
use crate::spatial_index::SpatialIndex;

/// A marker dropped while walking a graph for evaluation.
///
/// Ids are local to one walk and unrelated to clustering marker ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageMarker {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Planar for CoverageMarker {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
}

/// Precision, recall and F1 of an inferred graph against ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerMatchReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub actual_markers: usize,
    pub inferred_markers: usize,
    pub matched_actual: usize,
    pub matched_inferred: usize,
}

impl fmt::Display for MarkerMatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision={}, recall={}, score={}",
            self.precision, self.recall, self.f1
        )
    }
}

enum Step {
    /// Arrive at a vertex with `remaining` distance until the next marker
    Vertex { vertex: VertexId, remaining: f64 },
    /// Continue along an edge; `entering` steps are skipped if the
    /// destination was visited in the meantime
    Edge {
        edge: EdgeId,
        along: f64,
        remaining: f64,
        entering: bool,
    },
}

struct CoverageWalk<'a> {
    graph: &'a Graph,
    visited: Vec<bool>,
    markers: Vec<CoverageMarker>,
    /// Edge positions where a marker was dropped and the walk resumes
    frontier: VecDeque<(EdgeId, f64)>,
}

impl CoverageWalk<'_> {
    fn add_marker<P: Planar>(&mut self, at: &P) {
        self.markers.push(CoverageMarker {
            id: self.markers.len(),
            x: at.x(),
            y: at.y(),
        });
    }

    /// Depth-first continuation from one step until every branch either
    /// drops a marker on an edge or dead-ends.
    fn run(&mut self, first: Step) {
        let graph = self.graph;
        let mut stack = vec![first];
        while let Some(step) = stack.pop() {
            match step {
                Step::Vertex { vertex, remaining } => {
                    if self.visited[vertex.0] {
                        continue;
                    }
                    self.visited[vertex.0] = true;
                    for &edge in graph.vertices()[vertex.0].out_edges.iter().rev() {
                        stack.push(Step::Edge {
                            edge,
                            along: 0.0,
                            remaining,
                            entering: true,
                        });
                    }
                }
                Step::Edge {
                    edge,
                    along,
                    remaining,
                    entering,
                } => {
                    let edge = graph.edges()[edge.0];
                    if entering && self.visited[edge.dst.0] {
                        continue;
                    }
                    let position = along + remaining;
                    let length = graph.edge_length(&edge);
                    if !length.is_finite() {
                        continue;
                    }
                    if length > position {
                        self.frontier.push_back((edge.id, position));
                        let point = graph.point_along_edge(&edge, position);
                        self.add_marker(&point);
                    } else {
                        stack.push(Step::Vertex {
                            vertex: edge.dst,
                            remaining: position - length,
                        });
                    }
                }
            }
        }
    }
}

/// Sample a graph with markers every `frequency` units along its edges.
///
/// Components are started from unvisited vertices in id order, each with a
/// marker at the start vertex; the walk then proceeds breadth-first along
/// out-edges. Vertices without any edges get no marker, and neither do
/// edges of non-finite length.
pub fn coverage_markers(graph: &Graph, frequency: f64) -> Vec<CoverageMarker> {
    if !(frequency.is_finite() && frequency > 0.0) {
        return Vec::new();
    }

    let mut walk = CoverageWalk {
        graph,
        visited: vec![false; graph.vertex_count()],
        markers: Vec::new(),
        frontier: VecDeque::new(),
    };

    for vertex in graph.vertices() {
        if walk.visited[vertex.id.0] {
            continue;
        }
        if vertex.is_isolated() {
            walk.visited[vertex.id.0] = true;
            continue;
        }

        walk.add_marker(vertex);
        walk.run(Step::Vertex {
            vertex: vertex.id,
            remaining: frequency,
        });
        while let Some((edge, along)) = walk.frontier.pop_front() {
            walk.run(Step::Edge {
                edge,
                along,
                remaining: frequency,
                entering: false,
            });
        }
    }

    walk.markers
}

/// Compare two graphs by spatially matching their coverage markers.
///
/// Every inferred marker with at least one actual marker strictly within
/// `match_distance` is matched, and so is every such actual marker.
/// Fails if either graph yields no markers.
pub fn evaluate_marker_matching(
    actual: &Graph,
    inferred: &Graph,
    config: &EvaluationConfig,
) -> Result<MarkerMatchReport> {
    config.validate()?;

    #[cfg(feature = "parallel")]
    let mut sampled: Vec<Vec<CoverageMarker>> = [actual, inferred]
        .par_iter()
        .map(|graph| coverage_markers(graph, config.marker_frequency))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let mut sampled: Vec<Vec<CoverageMarker>> = [actual, inferred]
        .iter()
        .map(|graph| coverage_markers(graph, config.marker_frequency))
        .collect();

    let inferred_markers = sampled.pop().unwrap_or_default();
    let actual_markers = sampled.pop().unwrap_or_default();

    if actual_markers.is_empty() {
        return Err(TraceGraphError::EmptyMarkers { graph: "actual" });
    }
    if inferred_markers.is_empty() {
        return Err(TraceGraphError::EmptyMarkers { graph: "inferred" });
    }

    let index = SpatialIndex::new(&actual_markers);
    let mut actual_matched = vec![false; actual_markers.len()];
    let mut matched_inferred = 0;

    for marker in &inferred_markers {
        let candidates = index.nearby_indices(marker, config.match_distance);
        if candidates.is_empty() {
            continue;
        }
        matched_inferred += 1;
        for idx in candidates {
            actual_matched[idx] = true;
        }
    }
    let matched_actual = actual_matched.iter().filter(|&&m| m).count();

    let precision = matched_inferred as f64 / inferred_markers.len() as f64;
    let recall = matched_actual as f64 / actual_markers.len() as f64;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    info!(
        "[Evaluation] {} actual / {} inferred markers, precision={:.4} recall={:.4} f1={:.4}",
        actual_markers.len(),
        inferred_markers.len(),
        precision,
        recall,
        f1
    );

    Ok(MarkerMatchReport {
        precision,
        recall,
        f1,
        actual_markers: actual_markers.len(),
        inferred_markers: inferred_markers.len(),
        matched_actual,
        matched_inferred,
    })
}
