//! Spatial indexing for proximity queries.
//!
//! Uses a bulk-loaded R-tree over the positions of a borrowed slice. The
//! index is a snapshot: it holds a shared borrow of the slice, so the
//! collection cannot change underneath it. Rebuild the index when the
//! indexed set changes.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geo_utils::{compute_bounds, euclidean_distance};
use crate::{Planar, Rectangle};

/// Margin added around the indexed points when reporting bounds.
const BOUNDS_MARGIN: f64 = 1.0;

/// A position with its index into the source slice, for R-tree queries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexedPoint {
    pub idx: usize,
    pub x: f64,
    pub y: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over a slice of planar items.
///
/// # Example
/// ```
/// use tracegraph::{Point, SpatialIndex};
///
/// let points = vec![Point::new(0.0, 0.0, 0.0), Point::new(10.0, 0.0, 0.0)];
/// let index = SpatialIndex::new(&points);
///
/// assert_eq!(index.nearby(&[1.0, 0.0], 5.0).len(), 1);
/// assert!(index.nearby(&[5.0, 0.0], 5.0).is_empty()); // strict radius
/// ```
#[derive(Debug)]
pub struct SpatialIndex<'a, T> {
    items: &'a [T],
    tree: RTree<IndexedPoint>,
    bounds: Rectangle,
}

impl<'a, T: Planar> SpatialIndex<'a, T> {
    /// Bulk-load an index over `items`.
    ///
    /// An item appearing several times in the slice is returned once per
    /// occurrence by queries.
    pub fn new(items: &'a [T]) -> Self {
        let indexed: Vec<IndexedPoint> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| IndexedPoint {
                idx,
                x: item.x(),
                y: item.y(),
            })
            .collect();

        let bounds = if items.is_empty() {
            Rectangle::empty()
        } else {
            compute_bounds(items).expanded(BOUNDS_MARGIN)
        };

        Self {
            items,
            tree: RTree::bulk_load(indexed),
            bounds,
        }
    }

    /// Positions in the indexed slice of every item strictly closer than
    /// `distance` to `point`, in ascending order.
    pub fn nearby_indices<P: Planar + ?Sized>(&self, point: &P, distance: f64) -> Vec<usize> {
        if distance.is_nan() || distance <= 0.0 {
            return Vec::new();
        }

        // Bounding-box pruning first, exact distance second
        let envelope = AABB::from_corners(
            [point.x() - distance, point.y() - distance],
            [point.x() + distance, point.y() + distance],
        );

        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter(|candidate| euclidean_distance(point, &[candidate.x, candidate.y]) < distance)
            .map(|candidate| candidate.idx)
            .collect();
        found.sort_unstable();
        found
    }

    /// Every item strictly closer than `distance` to `point`.
    pub fn nearby<P: Planar + ?Sized>(&self, point: &P, distance: f64) -> Vec<&'a T> {
        self.nearby_indices(point, distance)
            .into_iter()
            .map(|idx| &self.items[idx])
            .collect()
    }

    /// Position of the single item closest to `point`.
    pub fn nearest_index<P: Planar + ?Sized>(&self, point: &P) -> Option<usize> {
        self.tree
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|nearest| nearest.idx)
    }

    /// The single item closest to `point`, or `None` for an empty index.
    pub fn nearest<P: Planar + ?Sized>(&self, point: &P) -> Option<&'a T> {
        self.nearest_index(point).map(|idx| &self.items[idx])
    }

    /// Bounding box of the indexed points plus a small margin.
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// The indexed items.
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    /// Get the number of indexed items.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
