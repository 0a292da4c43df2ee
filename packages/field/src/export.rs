//! GeoJSON conversion for heat fields and selection shapes.

use geo::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use uhi_map_field_models::{GeoPoint, GridCell, SelectionShape, color_for};

/// Renders cells as a GeoJSON `FeatureCollection` of polygons.
///
/// Each feature carries `intensity`, `label`, and the overlay `color`.
#[must_use]
pub fn grid_feature_collection(cells: &[GridCell]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: cells.iter().map(cell_feature).collect(),
        foreign_members: None,
    }
}

/// Serializes cells as a GeoJSON string.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn grid_geojson(cells: &[GridCell]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&grid_feature_collection(cells))
}

fn cell_feature(cell: &GridCell) -> Feature {
    let ring: LineString<f64> = cell.polygon.iter().map(|v| (v.lng, v.lat)).collect();
    let polygon = Polygon::new(ring, Vec::new());

    let mut properties = JsonObject::new();
    properties.insert("intensity".to_string(), serde_json::json!(cell.intensity));
    properties.insert("label".to_string(), serde_json::json!(cell.label));
    properties.insert("color".to_string(), serde_json::json!(color_for(cell.intensity)));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&polygon))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Parses a GeoJSON `Polygon` (bare geometry or wrapped in a `Feature`)
/// into a polygon selection. Only the exterior ring is used, without its
/// closing vertex.
#[must_use]
pub fn selection_from_geojson(geojson_str: &str) -> Option<SelectionShape> {
    let geometry = match geojson_str.parse::<GeoJson>().ok()? {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature.geometry?,
        GeoJson::FeatureCollection(_) => return None,
    };

    let Value::Polygon(rings) = geometry.value else {
        return None;
    };
    let exterior = rings.into_iter().next()?;

    let mut vertices: Vec<GeoPoint> = exterior
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| GeoPoint::new(position[1], position[0]))
        .collect();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    Some(SelectionShape::Polygon { vertices })
}
