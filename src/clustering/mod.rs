//! # Marker Clustering
//!
//! Groups markers from many traces into clusters that each represent a
//! short stretch of road travelled in one direction.
//!
//! ## Algorithm
//! 1. Seeding: repeatedly pick a random unassigned marker and claim every
//!    unassigned marker within a distance and bearing threshold of it
//! 2. Refinement: move each cluster to the mean of its members, then
//!    reassign every marker to the most similar nearby cluster
//! 3. Repeat refinement until the summed center movement is small
//!
//! Similarity combines distance and bearing difference into one score
//! (lower is better). The units differ on purpose: a degree of heading
//! weighs the same as a metre of offset.

mod refinement;
mod seeding;

use serde::{Deserialize, Serialize};

use crate::geo_utils::{angle_difference, circular_mean, euclidean_distance};
use crate::{Marker, Planar, Point};

pub use refinement::{RefinementOutcome, kmeans};
pub use seeding::initialize_clusters;

/// A group of markers believed to lie on the same road segment.
///
/// `center` is the point the cluster was seeded at; members accumulate
/// during assignment and are discarded when the cluster is recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub center: Point,
    pub members: Vec<Marker>,
}

impl Cluster {
    pub fn new(center: Point) -> Self {
        Self {
            center,
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, marker: Marker) {
        self.members.push(marker);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Mean position and circular mean bearing of the members.
    ///
    /// A cluster without members reports its center.
    pub fn mean(&self) -> Point {
        if self.members.is_empty() {
            return self.center;
        }
        let n = self.members.len() as f64;
        let x = self.members.iter().map(|m| m.point.x).sum::<f64>() / n;
        let y = self.members.iter().map(|m| m.point.y).sum::<f64>() / n;
        let bearing = circular_mean(self.members.iter().map(Marker::bearing))
            .unwrap_or(self.center.bearing);
        Point::new(x, y, bearing)
    }

    /// Combined distance + bearing difference score; lower is more similar.
    pub fn similarity(&self, marker: &Marker) -> f64 {
        euclidean_distance(&self.center, marker)
            + angle_difference(self.center.bearing, marker.bearing())
    }
}

impl Planar for Cluster {
    #[inline]
    fn x(&self) -> f64 {
        self.center.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.center.y
    }
}
