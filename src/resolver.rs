//! Overlap resolution between dilated fibroblasts and their neighbors.
//!
//! For each fibroblast the resolver discovers nearby cells through a coarse
//! centroid index, checks whether the nearest candidate is fully enclosed
//! by the dilated fibroblast boundary, and if so rebuilds that boundary
//! from the scaled vertices that remain closer to the fibroblast's own
//! original outline than to the enclosed neighbor's. The result is then
//! simplified and, when simplification splits it apart, collapsed to its
//! largest part.
//!
//! Every fibroblast is processed independently; a feature-level failure
//! degrades to the scaled-but-unfiltered shape and never aborts the batch.

use tracing::{debug, info};

use crate::collection::FeatureCollection;
use crate::core::{DilationConfig, DilationError, SkipReason};
use crate::geometry::{largest_by_area, simplify, Point, Ring, Simplified};
use crate::spatial::NearestIndex;

/// A cell outline extracted from a collection, tagged with the index of the
/// feature it came from.
#[derive(Debug, Clone)]
pub struct CellPolygon {
    /// Index of the source feature in its collection.
    pub source_index: usize,
    /// The unscaled boundary ring.
    pub ring: Ring,
}

/// A scaled copy of a cell outline.
///
/// `source_index` ties the scaled ring back to its unscaled counterpart;
/// the resolver depends on this pairing to recover original boundaries for
/// the fine classification step.
#[derive(Debug, Clone)]
pub struct ScaledPolygon {
    /// Index of the source feature in its collection.
    pub source_index: usize,
    /// The scaled boundary ring.
    pub ring: Ring,
}

/// Counters describing one dilation run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DilationStats {
    /// Fibroblasts that produced an output feature.
    pub resolved: usize,
    /// Fibroblasts skipped for missing or malformed geometry.
    pub skipped_empty_geometry: usize,
    /// Fibroblasts skipped for a ring with fewer than 3 vertices.
    pub skipped_invalid_ring: usize,
    /// Fibroblasts whose boundary was filtered against an enclosed neighbor.
    pub neighbors_subtracted: usize,
    /// Boundary filters that yielded fewer than 3 vertices and were
    /// reverted to the pre-filter ring.
    pub filter_fallbacks: usize,
    /// Simplifications that split the boundary and were collapsed to the
    /// largest part.
    pub multi_part_collapses: usize,
}

impl DilationStats {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::EmptyGeometry => self.skipped_empty_geometry += 1,
            SkipReason::InvalidRingSize => self.skipped_invalid_ring += 1,
        }
    }
}

/// Dilates every fibroblast in `fibroblasts` and resolves overlaps against
/// the cells of `all_cells` (a superset that includes the fibroblasts).
///
/// Returns the resolved collection, in input order, containing one feature
/// per fibroblast that passed geometry validation, plus the run counters.
pub fn dilate_collection(
    fibroblasts: &FeatureCollection,
    all_cells: &FeatureCollection,
    config: &DilationConfig,
) -> Result<(FeatureCollection, DilationStats), DilationError> {
    config.validate()?;

    let cells = extract_cells(all_cells);
    let scaled_cells: Vec<ScaledPolygon> = cells
        .iter()
        .map(|c| ScaledPolygon {
            source_index: c.source_index,
            ring: c.ring.scaled(config.other_scale_factor),
        })
        .collect();
    let centroid_index = NearestIndex::build(scaled_cells.iter().map(|c| c.ring.centroid()));
    info!(cells = cells.len(), "built coarse centroid index over scaled cells");

    let resolver = OverlapResolver {
        config,
        cells: &cells,
        scaled_cells: &scaled_cells,
        centroid_index,
    };

    let mut out = FeatureCollection::empty();
    let mut stats = DilationStats::default();

    for (i, feature) in fibroblasts.features.iter().enumerate() {
        let orig = match feature.ring() {
            Ok(ring) => ring,
            Err(reason) => {
                debug!(feature = i, %reason, "skipping fibroblast");
                stats.record_skip(reason);
                continue;
            }
        };
        let scaled = orig.scaled(config.fibroblast_scale_factor);
        let resolved = resolver.resolve(&orig, &scaled, &mut stats);

        let mut feature = feature.clone();
        feature.set_ring(&resolved);
        out.features.push(feature);
        stats.resolved += 1;
    }

    info!(
        resolved = stats.resolved,
        skipped_empty = stats.skipped_empty_geometry,
        skipped_invalid = stats.skipped_invalid_ring,
        subtracted = stats.neighbors_subtracted,
        fallbacks = stats.filter_fallbacks,
        collapsed = stats.multi_part_collapses,
        "overlap resolution finished"
    );
    Ok((out, stats))
}

/// Extracts the valid cell outlines of a collection, preserving each
/// feature's original index.
fn extract_cells(collection: &FeatureCollection) -> Vec<CellPolygon> {
    collection
        .features
        .iter()
        .enumerate()
        .filter_map(|(i, feature)| match feature.ring() {
            Ok(ring) => Some(CellPolygon {
                source_index: i,
                ring,
            }),
            Err(reason) => {
                debug!(feature = i, %reason, "skipping cell feature");
                None
            }
        })
        .collect()
}

struct OverlapResolver<'a> {
    config: &'a DilationConfig,
    /// Unscaled cells, positionally aligned with `scaled_cells`.
    cells: &'a [CellPolygon],
    scaled_cells: &'a [ScaledPolygon],
    centroid_index: NearestIndex,
}

impl OverlapResolver<'_> {
    /// Runs the per-fibroblast state machine: neighbor discovery,
    /// containment scan, boundary filtering, rebuild, simplification and
    /// multi-part collapse.
    fn resolve(&self, orig: &Ring, scaled: &Ring, stats: &mut DilationStats) -> Ring {
        let mut working = scaled.clone();

        if let Some(neighbor) = self.find_enclosed_neighbor(orig, &working) {
            let filtered =
                filter_boundary(&working, orig, self.cells[neighbor].ring.points());
            if filtered.is_valid() {
                working = filtered;
                stats.neighbors_subtracted += 1;
            } else {
                // A filter that empties the boundary must not discard the
                // fibroblast; fall back to the unfiltered scaled ring.
                stats.filter_fallbacks += 1;
            }
        }

        match simplify(&working, self.config.simplify_tolerance) {
            Simplified::Single(ring) => ring,
            Simplified::Multi(parts) => {
                stats.multi_part_collapses += 1;
                largest_by_area(parts).unwrap_or(working)
            }
        }
    }

    /// Finds the nearest neighbor cell whose scaled ring is fully enclosed
    /// by the scaled fibroblast boundary.
    ///
    /// Candidates are the `neighbor_candidates` nearest scaled-cell
    /// centroids, in ascending distance, with the fibroblast's own entry in
    /// the all-cells set excluded by index. Only the first enclosed
    /// candidate is ever handled; later enclosed neighbors are deliberately
    /// ignored.
    fn find_enclosed_neighbor(&self, orig: &Ring, scaled_fibro: &Ring) -> Option<usize> {
        let centroid = scaled_fibro.centroid();
        let self_index = self.find_self(orig, &centroid);
        self.centroid_index
            .k_nearest_excluding(
                &centroid,
                self.config.neighbor_candidates,
                self_index,
                self.config.boundary_padding_k,
            )
            .into_iter()
            .find(|(idx, _)| scaled_fibro.contains_ring(&self.scaled_cells[*idx].ring))
            .map(|(idx, _)| idx)
    }

    /// Locates the fibroblast's own entry in the all-cells set.
    ///
    /// Scaling preserves centroids, so the fibroblast's entry is among the
    /// closest centroid matches; it is identified by comparing unscaled
    /// rings rather than by distance, because a distance-zero tie between
    /// two distinct cells must not be mistaken for self.
    fn find_self(&self, orig: &Ring, centroid: &Point) -> Option<usize> {
        self.centroid_index
            .k_nearest_excluding(centroid, self.config.boundary_padding_k, None, self.config.boundary_padding_k)
            .into_iter()
            .find(|(idx, _)| self.cells[*idx].ring == *orig)
            .map(|(idx, _)| idx)
    }
}

/// Rebuilds a scaled fibroblast boundary against an enclosed neighbor.
///
/// Classifies every vertex of `scaled` by its nearest match in the
/// concatenation of the fibroblast's and the neighbor's unscaled boundary
/// vertices, and keeps the ordered subsequence of vertices whose nearest
/// match belongs to the fibroblast. With no competing neighbor vertices
/// every point is kept and the ring comes back unchanged.
pub(crate) fn filter_boundary(scaled: &Ring, fibro_orig: &Ring, neighbor: &[Point]) -> Ring {
    let index = NearestIndex::build(
        fibro_orig
            .points()
            .iter()
            .copied()
            .chain(neighbor.iter().copied()),
    );
    let split = fibro_orig.len();

    let kept: Vec<Point> = scaled
        .points()
        .iter()
        .filter(|p| match index.nearest(p) {
            Some((idx, _)) => idx < split,
            None => true,
        })
        .copied()
        .collect();
    Ring::new(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn regular_ngon(center: (f64, f64), radius: f64, sides: usize) -> Ring {
        let points = (0..sides)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / sides as f64;
                Point::new(
                    center.0 + radius * angle.cos(),
                    center.1 + radius * angle.sin(),
                )
            })
            .collect();
        Ring::new(points)
    }

    fn collection_of(rings: &[&Ring]) -> FeatureCollection {
        let features = rings
            .iter()
            .map(|ring| {
                let coords: Vec<[f64; 2]> = ring.points().iter().map(|p| [p.x, p.y]).collect();
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [coords] },
                    "classification": "cell"
                })
            })
            .collect::<Vec<_>>();
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": features
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_without_neighbor_keeps_everything() {
        let fibro = regular_ngon((0.0, 0.0), 5.0, 24);
        let scaled = fibro.scaled(2.0);
        let filtered = filter_boundary(&scaled, &fibro, &[]);
        assert_eq!(filtered, scaled);
    }

    #[test]
    fn test_filter_drops_points_near_neighbor() {
        let fibro = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        // A scaled ring with one vertex sitting right next to the neighbor
        // cluster and the rest near the fibroblast's own outline.
        let scaled = Ring::new(vec![
            Point::new(1.0, 1.0),
            Point::new(29.0, 5.0),
            Point::new(9.0, 9.0),
            Point::new(5.0, -1.0),
        ]);
        let neighbor = [
            Point::new(30.0, 4.0),
            Point::new(30.0, 5.0),
            Point::new(30.0, 6.0),
        ];
        let filtered = filter_boundary(&scaled, &fibro, &neighbor);
        assert_eq!(filtered.len(), 3);
        assert!(!filtered.points().contains(&Point::new(29.0, 5.0)));
        // Original order of the kept vertices is preserved.
        assert_eq!(
            filtered.points(),
            &[
                Point::new(1.0, 1.0),
                Point::new(9.0, 9.0),
                Point::new(5.0, -1.0),
            ]
        );
    }

    #[test]
    fn test_enclosed_neighbor_is_subtracted() {
        // Fibroblast at the origin; a small cell sits just inside the
        // dilated boundary. The resolved outline must drop scaled vertices
        // near the cell and leave its centroid outside.
        let fibro = regular_ngon((0.0, 0.0), 5.0, 36);
        let neighbor = regular_ngon((8.5, 0.0), 1.0, 36);

        let fibros = collection_of(&[&fibro]);
        let cells = collection_of(&[&fibro, &neighbor]);

        let config = DilationConfig::default();
        let (out, stats) = dilate_collection(&fibros, &cells, &config).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(stats.neighbors_subtracted, 1);

        let resolved = out.features[0].ring().unwrap();
        assert!(resolved.is_valid());
        // Fewer vertices than the full scaled ring: some were dropped.
        assert!(resolved.len() < 36);
        assert!(!resolved.contains_point(&neighbor.centroid()));
    }

    #[test]
    fn test_no_enclosed_neighbor_goes_straight_to_simplify() {
        let fibro = regular_ngon((0.0, 0.0), 5.0, 36);
        let faraway = regular_ngon((100.0, 100.0), 5.0, 36);

        let fibros = collection_of(&[&fibro]);
        let cells = collection_of(&[&fibro, &faraway]);

        let (out, stats) = dilate_collection(&fibros, &cells, &DilationConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(stats.neighbors_subtracted, 0);
        assert_eq!(stats.filter_fallbacks, 0);

        let resolved = out.features[0].ring().unwrap();
        // The dilated boundary is untouched apart from simplification.
        let c = resolved.centroid();
        assert!(c.distance(&Point::new(0.0, 0.0)) < 0.5);
        assert!(resolved.points().iter().all(|p| {
            let r = p.distance(&Point::new(0.0, 0.0));
            (r - 10.0).abs() < 1.0
        }));
    }

    #[test]
    fn test_malformed_fibroblast_is_dropped() {
        let fibro = regular_ngon((0.0, 0.0), 5.0, 12);
        let mut fibros = collection_of(&[&fibro, &fibro]);
        // Second feature gets empty coordinates.
        fibros.features[1] = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [] }
        }))
        .unwrap();
        let cells = collection_of(&[&fibro]);

        let (out, stats) = dilate_collection(&fibros, &cells, &DilationConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.skipped_empty_geometry, 1);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let fibro = regular_ngon((0.0, 0.0), 5.0, 12);
        let fibros = collection_of(&[&fibro]);
        let cells = collection_of(&[&fibro]);
        let config = DilationConfig {
            neighbor_candidates: 0,
            ..Default::default()
        };
        assert!(dilate_collection(&fibros, &cells, &config).is_err());
    }

    #[test]
    fn test_self_is_excluded_from_candidates() {
        // A lone fibroblast must not subtract itself even though its own
        // 1.2x-scaled copy is contained in its 2.0x-scaled copy.
        let fibro = regular_ngon((0.0, 0.0), 5.0, 36);
        let fibros = collection_of(&[&fibro]);
        let cells = collection_of(&[&fibro]);

        let (out, stats) = dilate_collection(&fibros, &cells, &DilationConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(stats.neighbors_subtracted, 0);
    }
}
