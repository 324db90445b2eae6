//! Unified error handling for trace loading, inference and evaluation.
//!
//! Expected "no solution" outcomes (no route between two vertices, a marker
//! with no nearby cluster) are modelled as values elsewhere in the crate and
//! never surface through this type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the tracegraph pipeline.
#[derive(Error, Debug)]
pub enum TraceGraphError {
    /// A trace has too few observations to derive any bearing.
    #[error("trace '{trace_id}' has {point_count} points, at least {minimum_required} required")]
    InsufficientPoints {
        trace_id: String,
        point_count: usize,
        minimum_required: usize,
    },

    /// An observation has a NaN or infinite coordinate.
    #[error("trace '{trace_id}' has a non-finite observation at index {index}")]
    NonFiniteObservation { trace_id: String, index: usize },

    /// A line of a trace or graph file could not be parsed.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// An edge references a vertex id that does not exist in the graph.
    #[error("edge {src} -> {dst} references a missing vertex (graph has {vertex_count} vertices)")]
    DanglingEdge {
        src: usize,
        dst: usize,
        vertex_count: usize,
    },

    /// A graph produced no coverage markers, so precision/recall are undefined.
    #[error("{graph} graph produced no coverage markers")]
    EmptyMarkers { graph: &'static str },

    /// A graph has no vertices to sample from.
    #[error("{graph} graph has no vertices")]
    EmptyGraph { graph: &'static str },

    /// No traces were supplied to the inference pipeline.
    #[error("no traces found in {source_name}")]
    NoTraces { source_name: String },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TraceGraphError>;

/// Convenience conversions from `Option` into descriptive errors.
pub trait OptionExt<T> {
    /// Map `None` to [`TraceGraphError::InsufficientPoints`].
    fn ok_or_insufficient_points(
        self,
        trace_id: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T>;

    /// Map `None` to [`TraceGraphError::EmptyGraph`].
    fn ok_or_empty_graph(self, graph: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_points(
        self,
        trace_id: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T> {
        self.ok_or_else(|| TraceGraphError::InsufficientPoints {
            trace_id: trace_id.to_string(),
            point_count,
            minimum_required,
        })
    }

    fn ok_or_empty_graph(self, graph: &'static str) -> Result<T> {
        self.ok_or(TraceGraphError::EmptyGraph { graph })
    }
}
