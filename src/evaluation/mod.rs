//! # Graph Evaluation
//!
//! Scores an inferred road graph against a ground-truth graph in two
//! independent ways:
//!
//! - **Coverage matching**: both graphs are walked and sampled with markers
//!   at a fixed spacing; markers are matched spatially to give precision,
//!   recall and F1.
//! - **Shortest-path agreement**: random vertex pairs of the ground truth
//!   are mapped onto the inferred graph and their shortest path lengths
//!   compared.

mod coverage;
mod paths;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceGraphError};
use crate::ensure_positive;

pub use coverage::{CoverageMarker, MarkerMatchReport, coverage_markers, evaluate_marker_matching};
pub use paths::{
    PathAgreementReport, TrialOutcome, evaluate_shortest_paths, shortest_path_distance,
};

/// Configuration for graph evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Distance between coverage markers along edges.
    /// Default: 30.0 metres
    pub marker_frequency: f64,

    /// Markers closer than this are considered matching.
    /// Default: 60.0 metres
    pub match_distance: f64,

    /// Number of random vertex pairs compared by the shortest-path method.
    /// Default: 100
    pub path_trials: usize,

    /// Maximum absolute difference for two path lengths to agree.
    /// Default: 5.0 metres
    pub path_tolerance: f64,

    /// Seed for vertex pair sampling.
    /// Default: 0
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            marker_frequency: 30.0,
            match_distance: 60.0,
            path_trials: 100,
            path_tolerance: 5.0,
            seed: 0,
        }
    }
}

impl EvaluationConfig {
    /// Reject non-positive or non-finite parameters.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("marker_frequency", self.marker_frequency)?;
        ensure_positive("match_distance", self.match_distance)?;
        ensure_positive("path_tolerance", self.path_tolerance)?;
        if self.path_trials == 0 {
            return Err(TraceGraphError::InvalidConfig {
                field: "path_trials",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
