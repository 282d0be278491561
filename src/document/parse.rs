//! Conversion between raw JSON and the typed GeoJSON tree

use geojson::GeoJson;
use serde_json::Value as JsonValue;

use crate::document::errors::{ReprojError, ReprojResult};
use crate::document::visitor::MIN_POSITION_LEN;

/// Geometry `type` tags that carry `coordinates`
pub const GEOMETRY_KINDS: [&str; 6] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
];

/// Parse a GeoJSON document from text
pub fn parse_document(text: &str) -> ReprojResult<GeoJson> {
    let value: JsonValue = serde_json::from_str(text)?;
    parse_value(value)
}

/// Parse a GeoJSON document from a JSON value
///
/// Every node's `type` tag is checked first so that an unknown kind is
/// reported as `UnsupportedGeometryKind` instead of a generic parse error,
/// and a short or non-numeric position as `MalformedCoordinate`.
pub fn parse_value(value: JsonValue) -> ReprojResult<GeoJson> {
    check_kinds(&value)?;
    Ok(GeoJson::from_json_value(value)?)
}

/// Serialize a document to JSON text
pub fn to_json_string(doc: &GeoJson, pretty: bool) -> ReprojResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(text)
}

fn check_kinds(value: &JsonValue) -> ReprojResult<()> {
    let object = value
        .as_object()
        .ok_or_else(|| ReprojError::InvalidDocument(format!("expected a JSON object, found {}", value)))?;

    let kind = object
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ReprojError::InvalidDocument("missing \"type\" member".to_string()))?;

    match kind {
        "FeatureCollection" => {
            if let Some(features) = object.get("features").and_then(JsonValue::as_array) {
                for feature in features {
                    check_kinds(feature)?;
                }
            }
        },
        "Feature" => {
            if let Some(geometry) = object.get("geometry") {
                if !geometry.is_null() {
                    check_kinds(geometry)?;
                }
            }
        },
        "GeometryCollection" => {
            if let Some(geometries) = object.get("geometries").and_then(JsonValue::as_array) {
                for geometry in geometries {
                    check_kinds(geometry)?;
                }
            }
        },
        other if GEOMETRY_KINDS.contains(&other) => {
            if let Some(coordinates) = object.get("coordinates") {
                check_coordinates(coordinates, position_depth(other))?;
            }
        },
        other => return Err(ReprojError::UnsupportedGeometryKind(other.to_string())),
    }
    Ok(())
}

/// Array levels above the positions of a geometry kind
fn position_depth(kind: &str) -> usize {
    match kind {
        "Point" => 0,
        "MultiPoint" | "LineString" => 1,
        "MultiLineString" | "Polygon" => 2,
        _ => 3,
    }
}

/// Validate the positions at `depth` levels below `value`
///
/// Anything that is not an array is left for the geojson parser to reject.
fn check_coordinates(value: &JsonValue, depth: usize) -> ReprojResult<()> {
    let Some(items) = value.as_array() else {
        return Ok(());
    };
    if depth > 0 {
        return items.iter().try_for_each(|child| check_coordinates(child, depth - 1));
    }
    if items.len() < MIN_POSITION_LEN {
        return Err(ReprojError::MalformedCoordinate(format!(
            "expected at least {} components, found {}",
            MIN_POSITION_LEN, value
        )));
    }
    if let Some(component) = items.iter().find(|component| !component.is_number()) {
        return Err(ReprojError::MalformedCoordinate(format!(
            "non-numeric component {} in {}",
            component, value
        )));
    }
    Ok(())
}
