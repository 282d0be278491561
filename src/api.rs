use std::sync::Arc;

use geojson::GeoJson;
use log::info;
use serde_json::Value as JsonValue;

use crate::coordinate::{CrsDescriptor, CrsInput};
use crate::crs::{builtin_definitions, CrsDefinitions, CrsRegistry, CrsResolver, SharedCrsRegistry};
use crate::document::errors::ReprojResult;
use crate::document::parse::{parse_value, to_json_string};
use crate::reproject::Reprojector;

/// Main interface to the ReprojKit library
///
/// Owns a reprojector and a shared registry, and works on GeoJSON text.
/// Clones share the registry, so names resolved through one clone are
/// visible to all of them.
#[derive(Clone)]
pub struct ReprojKit {
    reprojector: Reprojector,
    registry: SharedCrsRegistry,
}

/// Parsed input: either a document or a JSON `null`
enum Input {
    Null,
    Document(GeoJson),
}

impl ReprojKit {
    /// Create a kit from a reprojector and a registry
    pub fn new(reprojector: Reprojector, registry: SharedCrsRegistry) -> Self {
        ReprojKit { reprojector, registry }
    }

    /// Offline kit seeded with the built-in definitions
    ///
    /// # Returns
    /// A ReprojKit instance or an error if the built-in table is unusable
    pub fn offline() -> ReprojResult<Self> {
        let registry = CrsRegistry::with_builtin_definitions()?;
        Ok(Self::new(Reprojector::offline(), registry.into()))
    }

    /// Kit seeded with built-in plus user definitions, using `resolver`
    /// for names neither table knows
    ///
    /// User aliases may point at built-in definitions.
    ///
    /// # Arguments
    /// * `user_definitions` - Extra definitions, taking precedence over built-ins
    /// * `resolver` - Resolver for unknown names
    pub fn with_definitions(user_definitions: &CrsDefinitions, resolver: Arc<dyn CrsResolver>) -> ReprojResult<Self> {
        let mut definitions = builtin_definitions().clone();
        definitions.merge(user_definitions);
        let registry = CrsRegistry::from_definitions(&definitions)?;
        info!("Registry seeded with {} CRS names", registry.len());
        Ok(Self::new(Reprojector::with_resolver(resolver), registry.into()))
    }

    /// The shared registry
    pub fn registry(&self) -> &SharedCrsRegistry {
        &self.registry
    }

    /// The underlying reprojector
    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    /// Reproject a GeoJSON text
    ///
    /// # Arguments
    /// * `input` - GeoJSON text
    /// * `from` - Source CRS name; detected from the document when `None`
    /// * `to` - Target CRS name
    /// * `pretty` - Pretty-print the output
    ///
    /// # Returns
    /// The reprojected GeoJSON text or an error
    pub async fn reproject_json(&self, input: &str, from: Option<&str>, to: &str, pretty: bool) -> ReprojResult<String> {
        let doc = match Self::parse_input(input)? {
            Input::Null => return Ok("null".to_string()),
            Input::Document(doc) => doc,
        };
        let from = from.map(CrsInput::from);
        let to = CrsInput::from(to);
        let mut registry = self.registry.clone();
        let result = self.reprojector.reproject(&doc, from.as_ref(), &to, &mut registry).await?;
        to_json_string(&result, pretty)
    }

    /// Reproject a GeoJSON text to WGS 84
    pub async fn to_wgs84_json(&self, input: &str, from: Option<&str>, pretty: bool) -> ReprojResult<String> {
        let doc = match Self::parse_input(input)? {
            Input::Null => return Ok("null".to_string()),
            Input::Document(doc) => doc,
        };
        let from = from.map(CrsInput::from);
        let mut registry = self.registry.clone();
        let result = self.reprojector.to_wgs84(&doc, from.as_ref(), &mut registry).await?;
        to_json_string(&result, pretty)
    }

    /// Swap the axis order of a GeoJSON text
    pub fn reverse_json(&self, input: &str, pretty: bool) -> ReprojResult<String> {
        let doc = match Self::parse_input(input)? {
            Input::Null => return Ok("null".to_string()),
            Input::Document(doc) => doc,
        };
        let result = self.reprojector.reverse(&doc)?;
        to_json_string(&result, pretty)
    }

    /// Find the CRS a GeoJSON text declares
    pub fn detect_crs_json(&self, input: &str) -> ReprojResult<CrsDescriptor> {
        let value: JsonValue = serde_json::from_str(input)?;
        let doc = parse_value(value)?;
        self.reprojector.detect_crs(&doc, &self.registry)
    }

    fn parse_input(input: &str) -> ReprojResult<Input> {
        let value: JsonValue = serde_json::from_str(input)?;
        if value.is_null() {
            return Ok(Input::Null);
        }
        Ok(Input::Document(parse_value(value)?))
    }
}
