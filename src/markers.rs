//! Fixed arc-length resampling of traces into markers.
//!
//! Markers are the unit of clustering: each is a position along a trace
//! with the heading of the segment it was placed on, tagged with an id that
//! is unique across every trace of one inference run.

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{bearing_between, euclidean_distance, interpolate};
use crate::{Planar, Point, Trace};

/// Slack for float drift when a marker falls exactly on an observation.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Identity of a clustering marker, unique across all traces of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub usize);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A resampled trace point with a global identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub point: Point,
}

impl Marker {
    pub fn new(id: usize, x: f64, y: f64, bearing: f64) -> Self {
        Self {
            id: MarkerId(id),
            point: Point::new(x, y, bearing),
        }
    }

    #[inline]
    pub fn bearing(&self) -> f64 {
        self.point.bearing
    }
}

impl Planar for Marker {
    #[inline]
    fn x(&self) -> f64 {
        self.point.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.point.y
    }
}

/// Resample a trace into points every `interval` units of arc length.
///
/// The first observation with a distinct successor receives a point. Each
/// point carries the heading of the segment it lies on; zero-length segments
/// get no points and leave the spacing unchanged. A point is placed on the final
/// observation when the trace length is an exact multiple of `interval`,
/// never beyond it. Traces with fewer than two observations, and
/// non-positive intervals, yield nothing.
///
/// # Example
/// ```
/// use tracegraph::{generate_markers, Observation, Trace};
///
/// let trace = Trace::new("t", vec![
///     Observation::new(0.0, 0.0),
///     Observation::new(0.0, 50.0),
///     Observation::new(50.0, 50.0),
/// ]);
/// let points = generate_markers(&trace, 30.0);
/// assert_eq!(points.len(), 4);
/// assert!((points[1].y - 30.0).abs() < 1e-9);
/// assert!((points[1].bearing - 90.0).abs() < 1e-9);
/// ```
pub fn generate_markers(trace: &Trace, interval: f64) -> Vec<Point> {
    if trace.observations.len() < 2 || !(interval.is_finite() && interval > 0.0) {
        return Vec::new();
    }

    let mut points = Vec::new();
    // Arc length still to travel before the next marker
    let mut remaining = 0.0;

    for segment in trace.observations.windows(2) {
        let (start, end) = (&segment[0], &segment[1]);
        let length = euclidean_distance(start, end);
        // Repeated observations have no heading to give a marker
        if length <= 0.0 {
            continue;
        }
        let bearing = bearing_between(start, end);

        let mut offset = remaining;
        while offset <= length + BOUNDARY_EPSILON {
            let t = (offset / length).min(1.0);
            let (x, y) = interpolate(start, end, t);
            points.push(Point::new(x, y, bearing));
            offset += interval;
        }
        remaining = offset - length;
    }

    points
}

/// Generate markers for every trace, numbering them sequentially across
/// traces (trace order, then position along the trace).
pub fn markers_by_trace(traces: &[Trace], interval: f64) -> Vec<Vec<Marker>> {
    #[cfg(feature = "parallel")]
    let per_trace: Vec<Vec<Point>> = traces
        .par_iter()
        .map(|trace| generate_markers(trace, interval))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_trace: Vec<Vec<Point>> = traces
        .iter()
        .map(|trace| generate_markers(trace, interval))
        .collect();

    let mut next_id = 0;
    per_trace
        .into_iter()
        .map(|points| {
            points
                .into_iter()
                .map(|point| {
                    let marker = Marker {
                        id: MarkerId(next_id),
                        point,
                    };
                    next_id += 1;
                    marker
                })
                .collect()
        })
        .collect()
}

/// Concatenate per-trace markers into the flat list used for clustering.
pub fn flatten_markers(markers_by_trace: &[Vec<Marker>]) -> Vec<Marker> {
    markers_by_trace.iter().flatten().copied().collect()
}
