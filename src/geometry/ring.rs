//! Polygon ring model and derived geometric queries.
//!
//! A [`Ring`] is the canonical representation of a detected cell outline.
//! It provides the derived quantities the overlap resolver relies on:
//! vertex-average centroid, shoelace area, bounding box, point and ring
//! containment, and centroid-anchored scaling.

use itertools::Itertools;

use super::point::Point;

/// Tolerance for on-boundary checks, in the same units as input coordinates.
const BOUNDARY_EPS: f64 = 1e-9;

/// An ordered sequence of vertices describing a simple polygon boundary.
///
/// The ring is stored open: the first and last vertex need not coincide.
/// Closure is a detail of the GeoJSON serialization, not of the geometry,
/// so a duplicated closing vertex is dropped on construction. A ring needs
/// at least 3 vertices to bound an area.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Creates a ring from a vertex sequence, opening it if the input is
    /// closed (first vertex repeated at the end).
    pub fn new(mut points: Vec<Point>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// The vertices of the ring, in order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the ring has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if the ring has enough vertices to bound an area.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }

    /// Iterates the edges of the closed boundary, including the wrapping
    /// edge from the last vertex back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.iter().copied().circular_tuple_windows()
    }

    /// Arithmetic mean of the ring vertices.
    ///
    /// This is deliberately the unweighted vertex average, not the area
    /// centroid: downstream nearest-neighbor queries were calibrated against
    /// this convention and must reproduce it exactly.
    pub fn centroid(&self) -> Point {
        if self.points.is_empty() {
            return Point::new(0.0, 0.0);
        }
        let sum_x: f64 = self.points.iter().map(|p| p.x).sum();
        let sum_y: f64 = self.points.iter().map(|p| p.y).sum();
        let count = self.points.len() as f64;
        Point::new(sum_x / count, sum_y / count)
    }

    /// Absolute polygon area via the shoelace formula.
    ///
    /// Returns 0.0 for rings with fewer than 3 vertices.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for (a, b) in self.edges() {
            area += a.x * b.y;
            area -= b.x * a.y;
        }
        area.abs() / 2.0
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    ///
    /// Returns a degenerate box at the origin for an empty ring.
    pub fn bounding_box(&self) -> (Point, Point) {
        let Some((min_x, max_x)) = self.points.iter().map(|p| p.x).minmax().into_option() else {
            return (Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        };
        let (min_y, max_y) = self
            .points
            .iter()
            .map(|p| p.y)
            .minmax()
            .into_option()
            .unwrap_or((0.0, 0.0));
        (Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Tests whether a point lies inside the ring or on its boundary.
    ///
    /// Uses even-odd ray casting with an on-segment tolerance so that
    /// boundary vertices count as contained.
    pub fn contains_point(&self, p: &Point) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if point_on_segment(p, &a, &b) {
                return true;
            }
            if ((a.y <= p.y && p.y < b.y) || (b.y <= p.y && p.y < a.y))
                && p.x < a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y)
            {
                inside = !inside;
            }
        }
        inside
    }

    /// Tests whether `inner` is fully contained in this ring.
    ///
    /// Containment holds when every vertex of `inner` is inside or on the
    /// boundary of this ring and no edge of `inner` properly crosses an edge
    /// of this ring. A ring that only partially overlaps is not contained.
    pub fn contains_ring(&self, inner: &Ring) -> bool {
        if !self.is_valid() || !inner.is_valid() {
            return false;
        }

        // Cheap bounding-box reject before the per-vertex scan.
        let (outer_min, outer_max) = self.bounding_box();
        let (inner_min, inner_max) = inner.bounding_box();
        if inner_min.x < outer_min.x - BOUNDARY_EPS
            || inner_min.y < outer_min.y - BOUNDARY_EPS
            || inner_max.x > outer_max.x + BOUNDARY_EPS
            || inner_max.y > outer_max.y + BOUNDARY_EPS
        {
            return false;
        }

        if !inner.points.iter().all(|p| self.contains_point(p)) {
            return false;
        }

        for (a1, a2) in inner.edges() {
            for (b1, b2) in self.edges() {
                if segments_cross(&a1, &a2, &b1, &b2) {
                    return false;
                }
            }
        }
        true
    }

    /// Returns a copy of the ring expanded (or shrunk) about its own
    /// vertex-average centroid.
    ///
    /// Each vertex maps to `centroid + (vertex - centroid) * factor`, with
    /// the centroid computed on the unscaled ring. A factor of 1.0 is the
    /// identity; the centroid itself is preserved by any factor.
    pub fn scaled(&self, factor: f64) -> Ring {
        let c = self.centroid();
        Ring {
            points: self
                .points
                .iter()
                .map(|p| Point::new(c.x + (p.x - c.x) * factor, c.y + (p.y - c.y) * factor))
                .collect(),
        }
    }
}

/// Cross product of the vectors `o -> a` and `o -> b`.
#[inline]
pub(crate) fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Tests whether `p` lies on the segment `a`-`b` within [`BOUNDARY_EPS`].
fn point_on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    let len2 = a.distance_squared(b);
    if len2 == 0.0 {
        return p.distance(a) <= BOUNDARY_EPS;
    }
    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    let proj = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.distance(&proj) <= BOUNDARY_EPS
}

/// Tests whether two segments properly cross (intersect at a point interior
/// to both). Shared endpoints and collinear touching do not count.
pub(crate) fn segments_cross(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    (d1 > 0.0) != (d2 > 0.0) && d1 != 0.0 && d2 != 0.0 && (d3 > 0.0) != (d4 > 0.0) && d3 != 0.0 && d4 != 0.0
}

/// Intersection point of two properly crossing segments.
///
/// Returns `None` when the segments do not properly cross.
pub(crate) fn crossing_point(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Option<Point> {
    if !segments_cross(a1, a2, b1, b2) {
        return None;
    }
    let denom = (a2.x - a1.x) * (b2.y - b1.y) - (a2.y - a1.y) * (b2.x - b1.x);
    if denom == 0.0 {
        return None;
    }
    let t = ((b1.x - a1.x) * (b2.y - b1.y) - (b1.y - a1.y) * (b2.x - b1.x)) / denom;
    Some(Point::new(
        a1.x + t * (a2.x - a1.x),
        a1.y + t * (a2.y - a1.y),
    ))
}
