//! Planar geometry utilities: distances, bearings and bounds.
//!
//! All coordinates are projected metres. Bearings are degrees measured
//! counter-clockwise from the positive x axis and normalized into `[0, 360)`.

use crate::{Planar, Rectangle};

/// Euclidean distance between two planar positions.
#[inline]
pub fn euclidean_distance<A: Planar + ?Sized, B: Planar + ?Sized>(a: &A, b: &B) -> f64 {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    (dx * dx + dy * dy).sqrt()
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let b = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360.0
    if b >= 360.0 { 0.0 } else { b }
}

/// Heading of the vector `(dx, dy)` in degrees, normalized.
///
/// A zero vector has heading 0.
#[inline]
pub fn vector_bearing(dx: f64, dy: f64) -> f64 {
    normalize_bearing(dy.atan2(dx).to_degrees())
}

/// Heading from `from` towards `to`.
pub fn bearing_between<A: Planar + ?Sized, B: Planar + ?Sized>(from: &A, to: &B) -> f64 {
    vector_bearing(to.x() - from.x(), to.y() - from.y())
}

/// Minimal circular difference between two bearings, in `[0, 180]`.
///
/// ```
/// use tracegraph::geo_utils::angle_difference;
/// assert_eq!(angle_difference(350.0, 10.0), 20.0);
/// assert_eq!(angle_difference(90.0, 270.0), 180.0);
/// ```
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((b - a + 180.0).rem_euclid(360.0) - 180.0).abs()
}

/// Circular mean of a set of bearings.
///
/// Sums the unit vector at each bearing and takes the heading of the
/// resulting vector. Returns `None` for an empty input. Opposing bearings
/// that cancel out produce a heading of 0.
pub fn circular_mean<I>(bearings: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut count = 0usize;
    for bearing in bearings {
        let rad = bearing.to_radians();
        sum_x += rad.cos();
        sum_y += rad.sin();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(vector_bearing(sum_x / count as f64, sum_y / count as f64))
}

/// Linear interpolation between two positions, `t` in `[0, 1]`.
#[inline]
pub fn interpolate<A: Planar + ?Sized, B: Planar + ?Sized>(a: &A, b: &B, t: f64) -> (f64, f64) {
    (a.x() + t * (b.x() - a.x()), a.y() + t * (b.y() - a.y()))
}

/// Total polyline length of a sequence of positions.
pub fn polyline_length<P: Planar>(points: &[P]) -> f64 {
    points
        .windows(2)
        .map(|w| euclidean_distance(&w[0], &w[1]))
        .sum()
}

/// Smallest rectangle containing all positions.
pub fn compute_bounds<'a, P, I>(points: I) -> Rectangle
where
    P: Planar + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let mut bounds = Rectangle::empty();
    for p in points {
        bounds.extend_to_contain(p);
    }
    bounds
}
