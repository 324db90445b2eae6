//! Greedy cluster seeding.

use log::info;
use rand::Rng;

use super::Cluster;
use crate::Marker;
use crate::geo_utils::angle_difference;
use crate::spatial_index::SpatialIndex;

/// Create an initial set of clusters.
///
/// Repeatedly picks a random unassigned marker, seeds a cluster there, and
/// claims every unassigned marker strictly within `distance_threshold` whose
/// bearing differs from the seed by at most `bearing_threshold`. Every
/// marker ends up in exactly one cluster.
///
/// A marker close to two seeds goes to whichever seed is picked first, so
/// the result depends on `rng`. Pass a seeded generator for reproducible
/// clusters.
pub fn initialize_clusters<R: Rng + ?Sized>(
    markers: &[Marker],
    distance_threshold: f64,
    bearing_threshold: f64,
    rng: &mut R,
) -> Vec<Cluster> {
    // Built once; assigned markers are filtered out at query time, which is
    // equivalent to querying an index over the shrinking unassigned pool.
    let index = SpatialIndex::new(markers);
    let mut assigned = vec![false; markers.len()];
    let mut pool: Vec<usize> = (0..markers.len()).collect();
    let mut clusters = Vec::new();

    while !pool.is_empty() {
        let seed_idx = pool.swap_remove(rng.gen_range(0..pool.len()));
        if assigned[seed_idx] {
            continue;
        }
        assigned[seed_idx] = true;

        let seed = markers[seed_idx];
        let mut cluster = Cluster::new(seed.point);
        cluster.add_member(seed);

        for idx in index.nearby_indices(&seed, distance_threshold) {
            if assigned[idx] {
                continue;
            }
            let candidate = markers[idx];
            if angle_difference(candidate.bearing(), seed.bearing()) <= bearing_threshold {
                assigned[idx] = true;
                cluster.add_member(candidate);
            }
        }

        clusters.push(cluster);
    }

    info!(
        "[Seeding] Created {} clusters from {} markers",
        clusters.len(),
        markers.len()
    );
    clusters
}
