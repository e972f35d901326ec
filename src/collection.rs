//! GeoJSON-shaped feature collections at the pipeline boundary.
//!
//! Only the first coordinate ring of each feature is modeled; holes and any
//! additional rings are silently ignored. Every non-geometry field of a
//! feature round-trips verbatim through a flattened map, so upstream
//! metadata (`isLocked`, `classification`, `color`, measurements) passes
//! through the pipeline unchanged.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::errors::{DilationError, SkipReason};
use crate::geometry::{Point, Ring};

/// Geometry member of a feature. Coordinates are kept as raw JSON so that
/// malformed geometries can be skipped per-feature instead of failing the
/// whole parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    /// Geometry type tag, e.g. `"Polygon"`.
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// Raw coordinate array; `coordinates[0]` is the boundary ring.
    #[serde(default)]
    pub coordinates: Value,
    /// Any further geometry members, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One detected cell outline with its upstream metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Feature type tag, normally `"Feature"`.
    #[serde(rename = "type", default = "default_feature_type")]
    pub feature_type: String,
    /// The feature geometry, absent in degenerate inputs.
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// All non-geometry fields, passed through verbatim.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

fn default_feature_type() -> String {
    "Feature".to_string()
}

impl Feature {
    /// Extracts the boundary ring from `geometry.coordinates[0]`.
    ///
    /// Additional rings (holes) are ignored. Returns a [`SkipReason`] when
    /// the geometry is missing or malformed, or when the ring has fewer
    /// than 3 vertices.
    pub fn ring(&self) -> Result<Ring, SkipReason> {
        let geometry = self.geometry.as_ref().ok_or(SkipReason::EmptyGeometry)?;
        let rings = geometry
            .coordinates
            .as_array()
            .ok_or(SkipReason::EmptyGeometry)?;
        let first = rings.first().ok_or(SkipReason::EmptyGeometry)?;
        let pairs = first.as_array().ok_or(SkipReason::EmptyGeometry)?;

        let mut points = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let coords = pair.as_array().ok_or(SkipReason::EmptyGeometry)?;
            let (Some(x), Some(y)) = (
                coords.first().and_then(Value::as_f64),
                coords.get(1).and_then(Value::as_f64),
            ) else {
                return Err(SkipReason::EmptyGeometry);
            };
            points.push(Point::new(x, y));
        }

        let ring = Ring::new(points);
        if !ring.is_valid() {
            return Err(SkipReason::InvalidRingSize);
        }
        Ok(ring)
    }

    /// Replaces the feature geometry with the given ring.
    ///
    /// The ring is written closed (first vertex repeated at the end) as a
    /// single-ring `Polygon`; every other field of the feature is left
    /// untouched.
    pub fn set_ring(&mut self, ring: &Ring) {
        let mut closed: Vec<[f64; 2]> = ring.points().iter().map(|p| [p.x, p.y]).collect();
        if let Some(&first) = closed.first() {
            closed.push(first);
        }
        let coordinates = json!([closed]);

        match self.geometry.as_mut() {
            Some(geometry) => {
                geometry.geometry_type = "Polygon".to_string();
                geometry.coordinates = coordinates;
            }
            None => {
                self.geometry = Some(Geometry {
                    geometry_type: "Polygon".to_string(),
                    coordinates,
                    extra: Map::new(),
                });
            }
        }
    }
}

/// An ordered feature collection. Order is meaningful: it aligns scaled and
/// unscaled copies of the same collection by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Collection type tag, normally `"FeatureCollection"`.
    #[serde(rename = "type", default = "default_collection_type")]
    pub collection_type: String,
    /// The features, in source order.
    pub features: Vec<Feature>,
    /// Any further collection members, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_collection_type() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    /// Creates an empty collection with the standard type tag.
    pub fn empty() -> Self {
        Self {
            collection_type: default_collection_type(),
            features: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Loads a collection from a JSON file.
    ///
    /// A missing file or a document without the expected collection shape
    /// is fatal for the run.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DilationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DilationError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| DilationError::parse(path, e))
    }

    /// Writes the collection pretty-printed, creating the parent directory
    /// if it does not exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DilationError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DilationError::io(parent, e))?;
            }
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| DilationError::parse(path, e))?;
        fs::write(path, text).map_err(|e| DilationError::io(path, e))
    }

    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the collection holds no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_from_json(value: Value) -> Feature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ring_extraction() {
        let feature = feature_from_json(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
            }
        }));
        let ring = feature.ring().unwrap();
        // The closing duplicate is dropped on parse.
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.centroid(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_extra_rings_ignored() {
        let feature = feature_from_json(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
                    [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]]
                ]
            }
        }));
        assert_eq!(feature.ring().unwrap().len(), 4);
    }

    #[test]
    fn test_empty_coordinates_skip() {
        let feature = feature_from_json(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [] }
        }));
        assert_eq!(feature.ring(), Err(SkipReason::EmptyGeometry));

        let feature = feature_from_json(json!({ "type": "Feature" }));
        assert_eq!(feature.ring(), Err(SkipReason::EmptyGeometry));
    }

    #[test]
    fn test_too_small_ring_skip() {
        let feature = feature_from_json(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]] }
        }));
        assert_eq!(feature.ring(), Err(SkipReason::InvalidRingSize));
    }

    #[test]
    fn test_set_ring_closes_and_preserves_metadata() {
        let mut feature = feature_from_json(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]] },
            "isLocked": "false",
            "classification": "fibroblast",
            "color": [255, 0, 0]
        }));
        let ring = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
        ]);
        feature.set_ring(&ring);

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["classification"], "fibroblast");
        assert_eq!(value["isLocked"], "false");
        assert_eq!(value["color"], json!([255, 0, 0]));

        let coords = value["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(coords.len(), 4);
        assert_eq!(coords.first(), coords.last());
    }

    #[test]
    fn test_collection_requires_features_member() {
        let result: Result<FeatureCollection, _> =
            serde_json::from_value(json!({ "type": "FeatureCollection" }));
        assert!(result.is_err());
    }
}
