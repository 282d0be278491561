//! Coordinate Reference System handling

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use proj4rs::proj::Proj;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::document::errors::{ReprojError, ReprojResult};

/// Definition used for `toWgs84`
pub const WGS84_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";

lazy_static! {
    // EPSG:3006, epsg:3006, urn:ogc:def:crs:EPSG::3006, urn:ogc:def:crs:EPSG:6.6:3006
    static ref EPSG_NAME: Regex =
        Regex::new(r"(?i)^(?:urn:ogc:def:crs:)?EPSG:(?:[0-9.]*:)?(\d+)$").expect("valid EPSG regex");
    // urn:ogc:def:crs:OGC:1.3:CRS84, OGC:CRS84, CRS84
    static ref CRS84_NAME: Regex =
        Regex::new(r"(?i)^(?:urn:ogc:def:crs:)?(?:OGC:(?:[0-9.]*:)?)?CRS84$").expect("valid CRS84 regex");
}

/// An immutable, parsed coordinate reference system
///
/// Cloning is cheap: the parsed projection is shared.
#[derive(Clone)]
pub struct CrsDescriptor {
    definition: Arc<str>,
    proj: Arc<Proj>,
    geographic: bool,
}

impl CrsDescriptor {
    /// Parse a proj4 definition string (e.g. `+proj=utm +zone=33 ...`)
    pub fn from_definition(definition: &str) -> ReprojResult<Self> {
        let definition = definition.trim();
        let proj = Proj::from_proj_string(definition)
            .map_err(|e| ReprojError::Projection(format!("Invalid CRS definition '{}': {:?}", definition, e)))?;
        Ok(Self::from_proj(proj, definition))
    }

    /// Wrap an already parsed projection
    pub fn from_proj(proj: Proj, definition: &str) -> Self {
        let geographic = proj.is_latlong();
        CrsDescriptor {
            definition: Arc::from(definition),
            proj: Arc::new(proj),
            geographic,
        }
    }

    /// WGS 84 longitude/latitude
    pub fn wgs84() -> ReprojResult<Self> {
        Self::from_definition(WGS84_DEFINITION)
    }

    /// The definition string this descriptor was built from
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Whether coordinates are angular (degrees at the API boundary)
    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    pub(crate) fn proj(&self) -> &Proj {
        &self.proj
    }
}

impl fmt::Debug for CrsDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrsDescriptor")
            .field("definition", &self.definition)
            .field("geographic", &self.geographic)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CrsDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.proj, &other.proj) || self.definition == other.definition
    }
}

/// A CRS argument: either a ready descriptor or a name to resolve
#[derive(Debug, Clone, PartialEq)]
pub enum CrsInput {
    Descriptor(CrsDescriptor),
    Name(String),
}

impl From<CrsDescriptor> for CrsInput {
    fn from(descriptor: CrsDescriptor) -> Self {
        CrsInput::Descriptor(descriptor)
    }
}

impl From<&CrsDescriptor> for CrsInput {
    fn from(descriptor: &CrsDescriptor) -> Self {
        CrsInput::Descriptor(descriptor.clone())
    }
}

impl From<&str> for CrsInput {
    fn from(name: &str) -> Self {
        CrsInput::Name(name.to_string())
    }
}

impl From<String> for CrsInput {
    fn from(name: String) -> Self {
        CrsInput::Name(name)
    }
}

/// CRS metadata embedded in a document's `crs` member
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedCrs {
    /// `{"type": "name", "properties": {"name": "EPSG:3006"}}`
    Name(String),
    /// `{"type": "EPSG", "properties": {"code": 3006}}`
    Epsg(u32),
    /// Anything else (links, malformed members); kept as JSON text
    Unknown(String),
}

impl EmbeddedCrs {
    /// Interpret a `crs` member
    pub fn from_json(value: &JsonValue) -> Self {
        let properties = value.get("properties");
        match value.get("type").and_then(JsonValue::as_str) {
            Some("name") => {
                if let Some(name) = properties.and_then(|p| p.get("name")).and_then(JsonValue::as_str) {
                    return EmbeddedCrs::Name(name.to_string());
                }
            },
            Some("EPSG") => {
                let code = properties.and_then(|p| p.get("code"));
                let parsed = match code {
                    Some(JsonValue::Number(n)) => n.as_u64().and_then(|c| u32::try_from(c).ok()),
                    Some(JsonValue::String(s)) => s.trim().parse::<u32>().ok(),
                    _ => None,
                };
                if let Some(code) = parsed {
                    return EmbeddedCrs::Epsg(code);
                }
            },
            _ => {},
        }
        EmbeddedCrs::Unknown(value.to_string())
    }

    /// Registry key this metadata points at, if any
    pub fn registry_name(&self) -> Option<String> {
        match self {
            EmbeddedCrs::Name(name) => Some(name.clone()),
            EmbeddedCrs::Epsg(code) => Some(format!("EPSG:{}", code)),
            EmbeddedCrs::Unknown(_) => None,
        }
    }

    /// Original metadata as JSON text for error messages
    pub fn describe(&self) -> String {
        match self {
            EmbeddedCrs::Name(name) => format!("{{\"type\":\"name\",\"properties\":{{\"name\":\"{}\"}}}}", name),
            EmbeddedCrs::Epsg(code) => format!("{{\"type\":\"EPSG\",\"properties\":{{\"code\":{}}}}}", code),
            EmbeddedCrs::Unknown(raw) => raw.clone(),
        }
    }
}

/// Extract the EPSG code from names like `EPSG:3006` or `urn:ogc:def:crs:EPSG::3006`
pub fn epsg_code_from_name(name: &str) -> Option<u32> {
    EPSG_NAME
        .captures(name.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Canonical registry spelling of a CRS name
///
/// EPSG names become `EPSG:<code>` and OGC CRS84 becomes `EPSG:4326`
/// (both are longitude/latitude on WGS 84). Other names are returned trimmed.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some(code) = epsg_code_from_name(trimmed) {
        return format!("EPSG:{}", code);
    }
    if CRS84_NAME.is_match(trimmed) {
        return "EPSG:4326".to_string();
    }
    trimmed.to_string()
}
