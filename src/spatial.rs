//! Exact Euclidean nearest-neighbor lookup over a static 2D point set.
//!
//! The resolver uses this index twice with different semantics: a coarse
//! search over scaled cell centroids to discover neighbor candidates, and a
//! fine per-fibroblast search over concatenated boundary vertices to
//! classify scaled boundary points. Both are static builds; no insertion or
//! deletion is supported.

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::geometry::Point;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-neighbor index over a fixed set of points.
///
/// Query results carry the position each point had in the build input, so
/// callers can map matches back to their source collections.
#[derive(Debug)]
pub struct NearestIndex {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl NearestIndex {
    /// Builds the index from a point sequence. Input order defines the
    /// indices reported by queries.
    pub fn build(points: impl IntoIterator<Item = Point>) -> Self {
        let entries: Vec<IndexedPoint> = points
            .into_iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
            .collect();
        let len = entries.len();
        Self {
            tree: RTree::bulk_load(entries),
            len,
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the index and Euclidean distance of the point nearest to the
    /// query, or `None` for an empty index.
    pub fn nearest(&self, query: &Point) -> Option<(usize, f64)> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y])
            .next()
            .map(|(entry, dist2)| (entry.data, dist2.sqrt()))
    }

    /// Returns up to `k` nearest points sorted by ascending distance,
    /// skipping the entry at `exclude` (matched by index, never by
    /// distance, so a distance-zero tie between two distinct points is not
    /// silently dropped as "self").
    ///
    /// `overfetch` bounds how many candidates are pulled from the tree
    /// before the exclusion filter is applied.
    pub fn k_nearest_excluding(
        &self,
        query: &Point,
        k: usize,
        exclude: Option<usize>,
        overfetch: usize,
    ) -> Vec<(usize, f64)> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y])
            .take(overfetch.max(k + 1))
            .filter(|(entry, _)| Some(entry.data) != exclude)
            .take(k)
            .map(|(entry, dist2)| (entry.data, dist2.sqrt()))
            .collect()
    }
}
