//! Polygonal GeoJSON geometries

use serde::{Deserialize, Serialize};

/// `[x, y]` or `[x, y, z]`
pub type Position = Vec<f64>;
/// Closed ring of positions
pub type Ring = Vec<Position>;
/// Exterior ring followed by holes
pub type PolygonRings = Vec<Ring>;

/// A GeoJSON Polygon or MultiPolygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: PolygonRings },
    MultiPolygon { coordinates: Vec<PolygonRings> },
}

impl Geometry {
    /// GeoJSON type names accepted as a geocoding result
    pub const POLYGONAL_TYPES: [&'static str; 2] = ["Polygon", "MultiPolygon"];

    /// Member polygons, one for a Polygon
    pub fn polygons(&self) -> Vec<PolygonRings> {
        match self {
            Geometry::Polygon { coordinates } => vec![coordinates.clone()],
            Geometry::MultiPolygon { coordinates } => coordinates.clone(),
        }
    }

    /// Combine geometries into one. A single input is returned unchanged,
    /// several become a MultiPolygon holding every member polygon in order.
    /// Overlapping members are kept as they are, not dissolved.
    pub fn union(geometries: Vec<Geometry>) -> Option<Geometry> {
        if geometries.len() <= 1 {
            return geometries.into_iter().next();
        }

        let coordinates = geometries.iter().flat_map(Geometry::polygons).collect();
        Some(Geometry::MultiPolygon { coordinates })
    }

    pub fn to_geojson(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
