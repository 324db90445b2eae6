//! Distance and bearing aware k-means refinement.

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::Cluster;
use crate::Marker;
use crate::geo_utils::euclidean_distance;
use crate::spatial_index::SpatialIndex;

/// Result of running refinement to convergence or to the iteration cap.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    /// Final clusters with their members from the last assignment round
    pub clusters: Vec<Cluster>,
    /// Number of recompute/assign rounds performed
    pub iterations: usize,
    /// Whether movement dropped below the threshold before the cap
    pub converged: bool,
    /// Summed center movement of the last round
    pub last_movement: f64,
    /// Markers with no cluster within range in the last round
    pub stranded: usize,
}

/// Refine clusters until the summed center movement of a round falls below
/// `movement_threshold`, or `max_iterations` rounds have run.
///
/// Each round moves every cluster to the mean of its current members
/// (dropping the members), then assigns every marker in `markers` to the
/// nearby cluster with the lowest [`Cluster::similarity`]. Only clusters
/// strictly within `distance_threshold` are candidates; a marker with none
/// is left out for that round and retried in the next one.
pub fn kmeans(
    markers: &[Marker],
    initial_clusters: Vec<Cluster>,
    distance_threshold: f64,
    movement_threshold: f64,
    max_iterations: usize,
) -> RefinementOutcome {
    let mut clusters = initial_clusters;
    let mut iterations = 0;
    let mut last_movement = f64::INFINITY;
    let mut stranded = 0;
    let mut converged = false;

    while iterations < max_iterations {
        let (mut next, movement) = recompute_clusters(&clusters);
        stranded = assign_members(&mut next, markers, distance_threshold);
        clusters = next;
        last_movement = movement;
        iterations += 1;

        debug!(
            "[Refinement] Round {}: clusters moved {:.3}, {} stranded markers",
            iterations, movement, stranded
        );

        if movement < movement_threshold {
            converged = true;
            break;
        }
    }

    if converged {
        info!(
            "[Refinement] Converged after {} rounds ({} clusters, movement {:.3})",
            iterations,
            clusters.len(),
            last_movement
        );
    } else {
        warn!(
            "[Refinement] Stopped after {} rounds without converging (movement {:.3} >= {:.3})",
            iterations, last_movement, movement_threshold
        );
    }
    if stranded > 0 {
        warn!(
            "[Refinement] {} markers not within {} of any cluster",
            stranded, distance_threshold
        );
    }

    RefinementOutcome {
        clusters,
        iterations,
        converged,
        last_movement,
        stranded,
    }
}

/// New empty clusters at the mean of each previous cluster, and the summed
/// distance the centers moved.
fn recompute_clusters(previous: &[Cluster]) -> (Vec<Cluster>, f64) {
    let mut total_movement = 0.0;
    let next = previous
        .iter()
        .map(|cluster| {
            let moved = Cluster::new(cluster.mean());
            total_movement += euclidean_distance(&moved.center, &cluster.center);
            moved
        })
        .collect();
    (next, total_movement)
}

/// Assign each marker to its most similar cluster in range. Returns the
/// number of markers left without a cluster.
fn assign_members(clusters: &mut [Cluster], markers: &[Marker], distance_threshold: f64) -> usize {
    // Every choice is made against the same snapshot of centers
    let choices: Vec<Option<usize>> = {
        let index = SpatialIndex::new(&*clusters);

        #[cfg(feature = "parallel")]
        let choices: Vec<Option<usize>> = markers
            .par_iter()
            .map(|marker| best_cluster(&index, marker, distance_threshold))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let choices: Vec<Option<usize>> = markers
            .iter()
            .map(|marker| best_cluster(&index, marker, distance_threshold))
            .collect();

        choices
    };

    let mut stranded = 0;
    for (marker, choice) in markers.iter().zip(choices) {
        match choice {
            Some(idx) => clusters[idx].add_member(*marker),
            None => {
                stranded += 1;
                debug!("[Refinement] Marker {} has no cluster in range", marker.id);
            }
        }
    }
    stranded
}

/// Lowest-similarity candidate; the first candidate wins ties.
fn best_cluster(
    index: &SpatialIndex<'_, Cluster>,
    marker: &Marker,
    distance_threshold: f64,
) -> Option<usize> {
    let clusters = index.items();
    index
        .nearby_indices(marker, distance_threshold)
        .into_iter()
        .map(|idx| (idx, clusters[idx].similarity(marker)))
        .fold(None, |best: Option<(usize, f64)>, (idx, score)| match best {
            Some((_, best_score)) if best_score <= score => best,
            _ => Some((idx, score)),
        })
        .map(|(idx, _)| idx)
}
