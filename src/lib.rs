//! # tracegraph
//!
//! Road network inference from noisy, sparsely sampled GPS traces, plus
//! tools for scoring an inferred graph against ground truth.
//!
//! This library provides:
//! - A bulk-loaded spatial index for radius and nearest queries over 2-D points
//! - Fixed-interval marker generation along traces
//! - Distance and bearing aware clustering (greedy seeding + k-means refinement)
//! - Graph construction from cluster transitions
//! - Graph evaluation via coverage-marker F1 and shortest-path agreement
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel processing with rayon (default)
//!
//! ## Quick Start
//!
//! ```rust
//! use tracegraph::{infer_graph, InferenceConfig, Observation, Trace};
//!
//! let traces: Vec<Trace> = (0..3)
//!     .map(|i| {
//!         let observations = (0..20)
//!             .map(|j| Observation::new(j as f64 * 25.0, i as f64 * 2.0))
//!             .collect();
//!         Trace::new(format!("trace-{i}"), observations)
//!     })
//!     .collect();
//!
//! let result = infer_graph(&traces, &InferenceConfig::default()).unwrap();
//! assert!(result.graph.vertex_count() > 1);
//! assert!(result.graph.edge_count() > 0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TraceGraphError};

// Planar distance, bearing and bounds helpers
pub mod geo_utils;

// R-tree backed proximity queries
pub mod spatial_index;
pub use spatial_index::SpatialIndex;

// Trace loading
pub mod trace;
pub use trace::{Trace, read_trace_file, read_traces};

// Fixed arc-length resampling of traces
pub mod markers;
pub use markers::{Marker, MarkerId, flatten_markers, generate_markers, markers_by_trace};

// Seeding and k-means refinement of markers
pub mod clustering;
pub use clustering::{Cluster, RefinementOutcome, initialize_clusters, kmeans};

// Directed road graph, its text format and construction from clusters
pub mod graph;
pub use graph::{Edge, EdgeId, EdgePolicy, Graph, Vertex, VertexId, build_graph, generate_edges};

// Graph similarity scoring
pub mod evaluation;
pub use evaluation::{
    CoverageMarker, EvaluationConfig, MarkerMatchReport, PathAgreementReport,
    coverage_markers, evaluate_marker_matching, evaluate_shortest_paths,
};

// End-to-end inference pipeline
pub mod inference;
pub use inference::{InferenceResult, infer_graph};

// ============================================================================
// Core Types
// ============================================================================

/// Anything with a planar position.
///
/// Implemented by every point-like type so the spatial index and distance
/// helpers can operate on them uniformly.
pub trait Planar {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

impl<T: Planar + ?Sized> Planar for &T {
    #[inline]
    fn x(&self) -> f64 {
        (**self).x()
    }
    #[inline]
    fn y(&self) -> f64 {
        (**self).y()
    }
}

impl Planar for [f64; 2] {
    #[inline]
    fn x(&self) -> f64 {
        self[0]
    }
    #[inline]
    fn y(&self) -> f64 {
        self[1]
    }
}

/// A planar position with a heading.
///
/// # Example
/// ```
/// use tracegraph::Point;
/// let p = Point::new(0.0, 0.0, -90.0);
/// assert_eq!(p.bearing, 270.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, `[0, 360)`
    pub bearing: f64,
}

impl Point {
    /// Create a point, normalizing the bearing into `[0, 360)`.
    pub fn new(x: f64, y: f64, bearing: f64) -> Self {
        Self {
            x,
            y,
            bearing: geo_utils::normalize_bearing(bearing),
        }
    }

    /// Euclidean distance to any planar position.
    pub fn distance_to<P: Planar + ?Sized>(&self, other: &P) -> f64 {
        geo_utils::euclidean_distance(self, other)
    }

    /// Circular bearing difference to another point, in `[0, 180]`.
    pub fn angle_to(&self, other: &Point) -> f64 {
        geo_utils::angle_difference(self.bearing, other.bearing)
    }
}

impl Planar for Point {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
}

/// A raw GPS sample in projected coordinates, without heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert into a [`Point`] heading towards the following observation.
    pub fn to_point(&self, next: &Observation) -> Point {
        Point::new(self.x, self.y, geo_utils::bearing_between(self, next))
    }

    /// Check if the coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Planar for Observation {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
}

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rectangle {
    /// A rectangle containing nothing; extending it yields the first point.
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Width and height.
    pub fn lengths(&self) -> (f64, f64) {
        (self.max_x - self.min_x, self.max_y - self.min_y)
    }

    pub fn extend_to_contain<P: Planar + ?Sized>(&mut self, point: &P) {
        self.min_x = self.min_x.min(point.x());
        self.min_y = self.min_y.min(point.y());
        self.max_x = self.max_x.max(point.x());
        self.max_y = self.max_y.max(point.y());
    }

    pub fn extend_to_contain_rect(&mut self, other: &Rectangle) {
        if other.is_empty() {
            return;
        }
        self.extend_to_contain(&[other.min_x, other.min_y]);
        self.extend_to_contain(&[other.max_x, other.max_y]);
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains<P: Planar + ?Sized>(&self, point: &P) -> bool {
        point.x() >= self.min_x
            && point.x() <= self.max_x
            && point.y() >= self.min_y
            && point.y() <= self.max_y
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for graph inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Arc-length spacing between markers along each trace.
    /// Default: 20.0 metres
    pub marker_interval: f64,

    /// Maximum distance between a seed and the markers it claims.
    /// Default: 70.0 metres
    pub distance_threshold: f64,

    /// Maximum bearing difference between a seed and the markers it claims.
    /// Default: 45.0 degrees
    pub bearing_threshold: f64,

    /// Refinement stops once the summed center movement drops below this.
    /// Default: 10.0 metres
    pub movement_threshold: f64,

    /// Multiplier applied to `distance_threshold` for the refinement search radius.
    /// Default: 2.0
    pub refine_distance_factor: f64,

    /// Upper bound on refinement rounds.
    /// Default: 100
    pub max_iterations: usize,

    /// Whether repeated transitions produce parallel edges.
    /// Default: keep duplicates
    pub edge_policy: EdgePolicy,

    /// Seed for the random seeding order.
    /// Default: 0
    pub seed: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            marker_interval: 20.0,
            distance_threshold: 70.0,
            bearing_threshold: 45.0,
            movement_threshold: 10.0,
            refine_distance_factor: 2.0,
            max_iterations: 100,
            edge_policy: EdgePolicy::KeepDuplicates,
            seed: 0,
        }
    }
}

impl InferenceConfig {
    /// Search radius used while reassigning markers during refinement.
    pub fn refine_distance_threshold(&self) -> f64 {
        self.distance_threshold * self.refine_distance_factor
    }

    /// Reject non-positive or non-finite parameters.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("marker_interval", self.marker_interval)?;
        ensure_positive("distance_threshold", self.distance_threshold)?;
        ensure_positive("bearing_threshold", self.bearing_threshold)?;
        ensure_positive("movement_threshold", self.movement_threshold)?;
        ensure_positive("refine_distance_factor", self.refine_distance_factor)?;
        if self.max_iterations == 0 {
            return Err(TraceGraphError::InvalidConfig {
                field: "max_iterations",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TraceGraphError::InvalidConfig {
            field,
            value,
            reason: "must be positive and finite",
        })
    }
}
