//! Reference region polygons and spatial admission.
//!
//! Candidate tiles are admitted when their declared footprint intersects
//! the region of interest. Non-intersecting tiles are filtered out, not
//! failed. Geometry comes in as GeoJSON values; only the exterior ring
//! is considered.

use geo::Intersects;
use geo_types::{Coord, LineString, Polygon};
use serde_json::Value;

use crate::error::{EoError, EoResult};

/// A reference region-of-interest polygon (e.g. the continental Africa
/// extent), fetched once per batch and shared read-only across units.
#[derive(Debug, Clone)]
pub struct RegionOfInterest {
    polygon: Polygon<f64>,
}

impl RegionOfInterest {
    pub fn new(polygon: Polygon<f64>) -> Self {
        Self { polygon }
    }

    /// Build from a GeoJSON FeatureCollection, using the first feature's
    /// geometry (the shape the extent document has upstream).
    pub fn from_feature_collection(doc: &Value) -> EoResult<Self> {
        let geometry = doc
            .get("features")
            .and_then(|f| f.get(0))
            .and_then(|f| f.get("geometry"))
            .ok_or_else(|| {
                EoError::Validation("Extent document has no features[0].geometry".to_string())
            })?;
        Ok(Self::new(polygon_from_geometry(geometry)?))
    }

    /// Spatial admission check: true when the footprint intersects the
    /// region. Touching the boundary counts as intersecting.
    pub fn admits(&self, footprint: &Polygon<f64>) -> bool {
        self.polygon.intersects(footprint)
    }
}

/// Parse a GeoJSON Polygon geometry's exterior ring into a polygon.
pub fn polygon_from_geometry(geometry: &Value) -> EoResult<Polygon<f64>> {
    let ring = geometry
        .get("coordinates")
        .and_then(|c| c.get(0))
        .and_then(|r| r.as_array())
        .ok_or_else(|| EoError::Validation("Geometry has no exterior ring".to_string()))?;

    let mut coords = Vec::with_capacity(ring.len());
    for position in ring {
        let lon = position.get(0).and_then(Value::as_f64);
        let lat = position.get(1).and_then(Value::as_f64);
        match (lon, lat) {
            (Some(x), Some(y)) => coords.push(Coord { x, y }),
            _ => {
                return Err(EoError::Validation(
                    "Malformed coordinate in exterior ring".to_string(),
                ))
            }
        }
    }

    if coords.len() < 4 {
        return Err(EoError::Validation(
            "Exterior ring has fewer than four positions".to_string(),
        ));
    }

    Ok(Polygon::new(LineString::from(coords), vec![]))
}

/// GeoJSON bbox [west, south, east, north] of a polygon's exterior ring.
pub fn bbox_of(polygon: &Polygon<f64>) -> Vec<f64> {
    let mut west = f64::INFINITY;
    let mut south = f64::INFINITY;
    let mut east = f64::NEG_INFINITY;
    let mut north = f64::NEG_INFINITY;
    for c in polygon.exterior().coords() {
        west = west.min(c.x);
        south = south.min(c.y);
        east = east.max(c.x);
        north = north.max(c.y);
    }
    vec![west, south, east, north]
}
