//! Integration tests for SpatialIndex

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracegraph::geo_utils::euclidean_distance;
use tracegraph::{Marker, Point, SpatialIndex};

fn grid_points() -> Vec<Point> {
    (0..10)
        .flat_map(|i| (0..10).map(move |j| Point::new(i as f64 * 10.0, j as f64 * 10.0, 0.0)))
        .collect()
}

#[test]
fn test_build_and_len() {
    let points = grid_points();
    let index = SpatialIndex::new(&points);
    assert_eq!(index.len(), 100);
    assert!(!index.is_empty());

    let bounds = index.bounds();
    assert!(bounds.contains(&[0.0, 0.0]));
    assert!(bounds.contains(&[90.0, 90.0]));
}

#[test]
fn test_empty_index() {
    let points: Vec<Point> = Vec::new();
    let index = SpatialIndex::new(&points);
    assert!(index.is_empty());
    assert!(index.nearby(&[0.0, 0.0], 100.0).is_empty());
    assert!(index.nearest(&[0.0, 0.0]).is_none());
}

#[test]
fn test_nearby_is_strict() {
    let points = grid_points();
    let index = SpatialIndex::new(&points);

    // Neighbours at exactly 10 are excluded
    let found = index.nearby(&[50.0, 50.0], 10.0);
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].x, found[0].y), (50.0, 50.0));

    let found = index.nearby(&[50.0, 50.0], 10.0001);
    assert_eq!(found.len(), 5);
}

#[test]
fn test_nearby_indices_sorted() {
    let points = grid_points();
    let index = SpatialIndex::new(&points);
    let found = index.nearby_indices(&[45.0, 45.0], 15.0);
    assert_eq!(found.len(), 4);
    assert!(found.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_nearby_non_positive_radius() {
    let points = grid_points();
    let index = SpatialIndex::new(&points);
    assert!(index.nearby(&[0.0, 0.0], 0.0).is_empty());
    assert!(index.nearby(&[0.0, 0.0], -5.0).is_empty());
}

#[test]
fn test_duplicates_returned_per_insertion() {
    let p = Point::new(1.0, 1.0, 0.0);
    let points = vec![p, p, p];
    let index = SpatialIndex::new(&points);
    assert_eq!(index.nearby(&[1.0, 1.0], 0.5).len(), 3);
}

#[test]
fn test_nearest() {
    let points = grid_points();
    let index = SpatialIndex::new(&points);
    let nearest = index.nearest(&[31.0, 68.0]).unwrap();
    assert_eq!((nearest.x, nearest.y), (30.0, 70.0));

    // Far outside the indexed area still finds the globally nearest item
    let nearest = index.nearest(&[-1000.0, -1000.0]).unwrap();
    assert_eq!((nearest.x, nearest.y), (0.0, 0.0));
}

#[test]
fn test_indexes_markers() {
    let markers = vec![Marker::new(0, 0.0, 0.0, 0.0), Marker::new(1, 100.0, 0.0, 0.0)];
    let index = SpatialIndex::new(&markers);
    let found = index.nearby(&markers[1], 1.0);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, markers[1].id);
}

#[test]
fn test_nearby_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..25 {
        let count = rng.gen_range(0..300);
        let points: Vec<Point> = (0..count)
            .map(|_| Point::new(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0), 0.0))
            .collect();
        let index = SpatialIndex::new(&points);

        for _ in 0..20 {
            let query = [rng.gen_range(-600.0..600.0), rng.gen_range(-600.0..600.0)];
            let radius = rng.gen_range(0.1..250.0);

            let found = index.nearby_indices(&query, radius);
            let expected: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| euclidean_distance(&query, *p) < radius)
                .map(|(i, _)| i)
                .collect();

            assert_eq!(found, expected);
        }
    }
}
