//! Topology-preserving boundary simplification.
//!
//! Vertex reduction uses the Douglas-Peucker algorithm on the closed
//! boundary. Plain Douglas-Peucker can leave a self-intersecting ring;
//! topology is preserved by decomposing such a result into disjoint simple
//! loops, which the resolver then collapses with [`largest_by_area`].

use super::point::Point;
use super::ring::{crossing_point, Ring};

/// Outcome of simplifying a ring.
#[derive(Debug, Clone)]
pub enum Simplified {
    /// The reduced boundary is a single simple ring.
    Single(Ring),
    /// Reduction produced a self-intersecting boundary that was split into
    /// multiple disjoint simple rings.
    Multi(Vec<Ring>),
}

/// Simplifies a ring with the given tolerance, preserving topology.
///
/// Rings that are too small to reduce, or whose reduction would drop below
/// 3 vertices, are returned unchanged. A reduced boundary that
/// self-intersects is split at its crossing points into simple loops.
pub fn simplify(ring: &Ring, tolerance: f64) -> Simplified {
    if ring.len() <= 3 {
        return Simplified::Single(ring.clone());
    }

    let reduced = if tolerance > 0.0 {
        douglas_peucker_closed(ring.points(), tolerance)
    } else {
        ring.points().to_vec()
    };
    if reduced.len() < 3 {
        // Reduction collapsed the boundary; keep the original ring rather
        // than emit a degenerate one.
        return Simplified::Single(ring.clone());
    }

    let mut loops = decompose(reduced);
    match loops.len() {
        0 => Simplified::Single(ring.clone()),
        1 => Simplified::Single(loops.pop().unwrap_or_else(|| ring.clone())),
        _ => Simplified::Multi(loops),
    }
}

/// Selects the ring with the greatest area.
///
/// This is the deterministic collapse rule for multi-part simplification
/// output. Returns `None` only for an empty input.
pub fn largest_by_area(rings: Vec<Ring>) -> Option<Ring> {
    rings.into_iter().max_by(|a, b| {
        a.area()
            .partial_cmp(&b.area())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Douglas-Peucker on an implicitly closed vertex sequence.
///
/// The first vertex is always kept and serves as both endpoints of the
/// initial baseline; the degenerate baseline is handled by measuring
/// deviation as distance to the anchor point.
fn douglas_peucker_closed(points: &[Point], tolerance: f64) -> Vec<Point> {
    let n = points.len();
    let mut keep = vec![false; n];
    keep[0] = true;

    // Index `n` on the stack refers back to vertex 0 (closing edge).
    let mut stack = vec![(0usize, n)];

    const MAX_ITERATIONS: usize = 10_000;
    let mut iterations = 0;

    while let Some((start, end)) = stack.pop() {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            for k in keep.iter_mut().take(end.min(n)).skip(start) {
                *k = true;
            }
            break;
        }

        if end - start <= 1 {
            continue;
        }

        let anchor_a = points[start];
        let anchor_b = points[end % n];

        let mut max_dist = 0.0;
        let mut max_index = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let dist = deviation(p, &anchor_a, &anchor_b);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > tolerance {
            keep[max_index] = true;
            if max_index - start > 1 {
                stack.push((start, max_index));
            }
            if end - max_index > 1 {
                stack.push((max_index, end));
            }
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(p, _)| *p)
        .collect()
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// distance to `a` when the baseline is degenerate.
fn deviation(p: &Point, a: &Point, b: &Point) -> f64 {
    let line_a = b.y - a.y;
    let line_b = a.x - b.x;
    let line_c = b.x * a.y - a.x * b.y;

    let denominator = (line_a * line_a + line_b * line_b).sqrt();
    if denominator == 0.0 {
        return p.distance(a);
    }
    (line_a * p.x + line_b * p.y + line_c).abs() / denominator
}

/// Splits a closed vertex sequence into simple loops at its crossing points.
///
/// A sequence with no proper self-crossing comes back as a single ring.
/// Loops that end up with fewer than 3 vertices are discarded.
fn decompose(points: Vec<Point>) -> Vec<Ring> {
    let mut pending = vec![points];
    let mut out = Vec::new();

    // Each split strictly shrinks both halves, but cap the work anyway.
    let mut budget = 1_000;

    while let Some(pts) = pending.pop() {
        if pts.len() < 3 {
            continue;
        }
        budget -= 1;
        if budget == 0 {
            out.push(Ring::new(pts));
            continue;
        }
        match first_crossing(&pts) {
            None => out.push(Ring::new(pts)),
            Some((i, j, x)) => {
                let mut loop_a = Vec::with_capacity(j - i + 1);
                loop_a.push(x);
                loop_a.extend_from_slice(&pts[i + 1..=j]);

                let mut loop_b = Vec::with_capacity(pts.len() - (j - i) + 1);
                loop_b.push(x);
                loop_b.extend_from_slice(&pts[j + 1..]);
                loop_b.extend_from_slice(&pts[..=i]);

                pending.push(loop_a);
                pending.push(loop_b);
            }
        }
    }
    out
}

/// Finds the first pair of properly crossing edges of the closed sequence,
/// together with the crossing point.
fn first_crossing(pts: &[Point]) -> Option<(usize, usize, Point)> {
    let n = pts.len();
    for i in 0..n {
        let a1 = pts[i];
        let a2 = pts[(i + 1) % n];
        for j in (i + 1)..n {
            let b1 = pts[j];
            let b2 = pts[(j + 1) % n];
            if let Some(x) = crossing_point(&a1, &a2, &b1, &b2) {
                return Some((i, j, x));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collinear_vertices_removed() {
        // Square with redundant edge midpoints.
        let ring = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 5.0),
        ]);
        match simplify(&ring, 0.5) {
            Simplified::Single(out) => {
                assert_eq!(out.len(), 4);
                assert_eq!(out.area(), 100.0);
            }
            Simplified::Multi(_) => panic!("square must stay a single ring"),
        }
    }

    #[test]
    fn test_corners_survive_tolerance() {
        let ring = Ring::new(vec![
            Point::new(-5.0, -5.0),
            Point::new(15.0, -5.0),
            Point::new(15.0, 15.0),
            Point::new(-5.0, 15.0),
        ]);
        match simplify(&ring, 1.0) {
            Simplified::Single(out) => assert_eq!(out.points(), ring.points()),
            Simplified::Multi(_) => panic!("square must stay a single ring"),
        }
    }

    #[test]
    fn test_self_intersecting_ring_splits_into_loops() {
        // Asymmetric bowtie: edges 1 and 3 cross at (20/7, 10/7), producing
        // lobes of area 50/7 and 8/7.
        let ring = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(4.0, 2.0),
        ]);
        let parts = match simplify(&ring, 0.01) {
            Simplified::Multi(parts) => parts,
            Simplified::Single(_) => panic!("bowtie must split"),
        };
        assert_eq!(parts.len(), 2);

        let mut areas: Vec<f64> = parts.iter().map(Ring::area).collect();
        areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((areas[0] - 8.0 / 7.0).abs() < 1e-9);
        assert!((areas[1] - 50.0 / 7.0).abs() < 1e-9);

        let largest = largest_by_area(parts).unwrap();
        assert!((largest.area() - 50.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_largest_by_area_empty() {
        assert!(largest_by_area(Vec::new()).is_none());
    }

    #[test]
    fn test_tiny_ring_unchanged() {
        let triangle = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        match simplify(&triangle, 10.0) {
            Simplified::Single(out) => assert_eq!(out.points(), triangle.points()),
            Simplified::Multi(_) => panic!("triangle must stay a single ring"),
        }
    }
}
