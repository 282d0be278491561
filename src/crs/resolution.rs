//! Deciding which CRS a transformation goes from and to

use geojson::{GeoJson, JsonObject};
use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::coordinate::{normalize_name, CrsDescriptor, CrsInput, EmbeddedCrs};
use crate::crs::registry::CrsCache;
use crate::crs::resolver::CrsResolver;
use crate::document::errors::{ReprojError, ReprojResult};

/// Resolve a CRS argument to a descriptor
///
/// Names are looked up in `registry` first; on a miss the resolver is asked
/// once and its answer memoized under the requested name.
pub async fn resolve_crs<C, R>(input: &CrsInput, registry: &mut C, resolver: &R) -> ReprojResult<CrsDescriptor>
where
    C: CrsCache + ?Sized,
    R: CrsResolver + ?Sized,
{
    match input {
        CrsInput::Descriptor(crs) => Ok(crs.clone()),
        CrsInput::Name(name) => resolve_name(name, registry, resolver).await,
    }
}

/// Resolve a CRS name through the registry, then the resolver
pub async fn resolve_name<C, R>(name: &str, registry: &mut C, resolver: &R) -> ReprojResult<CrsDescriptor>
where
    C: CrsCache + ?Sized,
    R: CrsResolver + ?Sized,
{
    if let Some(crs) = lookup_with_normalization(name, registry) {
        debug!("CRS '{}' found in registry", name);
        return Ok(crs);
    }

    info!("CRS '{}' not in registry, consulting resolver", name);
    let crs = resolver.resolve_by_name(name).await.map_err(|e| match e {
        unresolved @ ReprojError::UnresolvedCrs { .. } => unresolved,
        other => ReprojError::unresolved(name, other.to_string()),
    })?;
    Ok(registry.memoize(name, crs))
}

/// Source CRS: explicit argument, or detected from the document
pub async fn resolve_from<C, R>(
    doc: &GeoJson,
    explicit: Option<&CrsInput>,
    registry: &mut C,
    resolver: &R,
) -> ReprojResult<CrsDescriptor>
where
    C: CrsCache + ?Sized,
    R: CrsResolver + ?Sized,
{
    match explicit {
        Some(input) => resolve_crs(input, registry, resolver).await,
        None => detect_crs(doc, registry),
    }
}

/// Target CRS from an explicit argument
pub async fn resolve_to<C, R>(explicit: &CrsInput, registry: &mut C, resolver: &R) -> ReprojResult<CrsDescriptor>
where
    C: CrsCache + ?Sized,
    R: CrsResolver + ?Sized,
{
    resolve_crs(explicit, registry, resolver).await
}

/// Find the CRS named by the document's root `crs` member
///
/// Only the registry is consulted. A `name` entry that misses is retried
/// with its normalized `EPSG:<code>` spelling.
pub fn detect_crs<C: CrsCache + ?Sized>(doc: &GeoJson, registry: &C) -> ReprojResult<CrsDescriptor> {
    let crs_member = embedded_crs_member(doc).ok_or(ReprojError::MissingCrs)?;
    let embedded = EmbeddedCrs::from_json(crs_member);

    let name = embedded
        .registry_name()
        .ok_or_else(|| ReprojError::UnidentifiableCrs(embedded.describe()))?;

    let crs = lookup_with_normalization(&name, registry)
        .ok_or_else(|| ReprojError::UnidentifiableCrs(embedded.describe()))?;
    debug!("Detected CRS '{}' from document", name);
    Ok(crs)
}

/// Root-level `crs` member, ignoring an explicit `null`
pub fn embedded_crs_member(doc: &GeoJson) -> Option<&JsonValue> {
    let foreign: Option<&JsonObject> = match doc {
        GeoJson::Geometry(g) => g.foreign_members.as_ref(),
        GeoJson::Feature(f) => f.foreign_members.as_ref(),
        GeoJson::FeatureCollection(fc) => fc.foreign_members.as_ref(),
    };
    foreign
        .and_then(|members| members.get("crs"))
        .filter(|value| !value.is_null())
}

fn lookup_with_normalization<C: CrsCache + ?Sized>(name: &str, registry: &C) -> Option<CrsDescriptor> {
    registry.lookup(name).or_else(|| {
        let normalized = normalize_name(name);
        if normalized == name {
            None
        } else {
            registry.lookup(&normalized)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::registry::CrsRegistry;
    use crate::crs::resolver::OfflineResolver;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often it is asked, answering with WGS 84
    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CrsResolver for CountingResolver {
        async fn resolve_by_name(&self, _name: &str) -> ReprojResult<CrsDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CrsDescriptor::wgs84()
        }
    }

    fn doc(value: serde_json::Value) -> GeoJson {
        GeoJson::from_json_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_descriptor_used_directly() {
        let mut registry = CrsRegistry::new();
        let crs = CrsDescriptor::wgs84().unwrap();
        let resolved = resolve_crs(&CrsInput::from(&crs), &mut registry, &OfflineResolver).await.unwrap();
        assert_eq!(resolved, crs);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_consulted_once() {
        let mut registry = CrsRegistry::new();
        let resolver = CountingResolver::default();
        let name = CrsInput::from("LOCAL:1");

        resolve_crs(&name, &mut registry, &resolver).await.unwrap();
        resolve_crs(&name, &mut registry, &resolver).await.unwrap();
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert!(registry.contains("LOCAL:1"));
    }

    #[tokio::test]
    async fn test_unresolved_name() {
        let mut registry = CrsRegistry::new();
        let result = resolve_to(&CrsInput::from("EPSG:3006"), &mut registry, &OfflineResolver).await;
        assert!(matches!(result, Err(ReprojError::UnresolvedCrs { .. })));
    }

    #[tokio::test]
    async fn test_normalized_registry_hit() {
        let mut registry = CrsRegistry::with_builtin_definitions().unwrap();
        let resolved = resolve_crs(&CrsInput::from("urn:ogc:def:crs:EPSG::3006"), &mut registry, &OfflineResolver)
            .await
            .unwrap();
        assert_eq!(Some(&resolved), registry.get("EPSG:3006"));
    }

    /// Fails with a projection error instead of `UnresolvedCrs`
    struct BrokenResolver;

    #[async_trait]
    impl CrsResolver for BrokenResolver {
        async fn resolve_by_name(&self, _name: &str) -> ReprojResult<CrsDescriptor> {
            CrsDescriptor::from_definition("+proj=not_a_projection")
        }
    }

    #[tokio::test]
    async fn test_resolver_failure_is_unresolved() {
        let mut registry = CrsRegistry::new();
        let resolver = BrokenResolver;
        let result = resolve_crs(&CrsInput::from("X"), &mut registry, &resolver).await;
        assert!(matches!(result, Err(ReprojError::UnresolvedCrs { ref name, .. }) if name == "X"));
    }

    #[test]
    fn test_detect_missing() {
        let registry = CrsRegistry::with_builtin_definitions().unwrap();
        let result = detect_crs(&doc(json!({"type": "Point", "coordinates": [1.0, 2.0]})), &registry);
        assert!(matches!(result, Err(ReprojError::MissingCrs)));

        let null_crs = doc(json!({"type": "Point", "coordinates": [1.0, 2.0], "crs": null}));
        assert!(matches!(detect_crs(&null_crs, &registry), Err(ReprojError::MissingCrs)));
    }

    #[test]
    fn test_detect_by_name_and_code() {
        let registry = CrsRegistry::with_builtin_definitions().unwrap();

        let named = doc(json!({
            "type": "FeatureCollection",
            "features": [],
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3006"}}
        }));
        assert_eq!(Some(&detect_crs(&named, &registry).unwrap()), registry.get("EPSG:3006"));

        let coded = doc(json!({
            "type": "Feature",
            "properties": {},
            "geometry": null,
            "crs": {"type": "EPSG", "properties": {"code": 3857}}
        }));
        assert_eq!(Some(&detect_crs(&coded, &registry).unwrap()), registry.get("EPSG:3857"));
    }

    #[test]
    fn test_detect_unidentifiable() {
        let registry = CrsRegistry::new();
        let named = doc(json!({
            "type": "Point",
            "coordinates": [1.0, 2.0],
            "crs": {"type": "name", "properties": {"name": "EPSG:3006"}}
        }));
        match detect_crs(&named, &registry) {
            Err(ReprojError::UnidentifiableCrs(text)) => assert!(text.contains("EPSG:3006")),
            other => panic!("unexpected result {:?}", other),
        }

        let linked = doc(json!({
            "type": "Point",
            "coordinates": [1.0, 2.0],
            "crs": {"type": "link", "properties": {"href": "http://example.com/crs"}}
        }));
        assert!(matches!(detect_crs(&linked, &registry), Err(ReprojError::UnidentifiableCrs(_))));
    }

    #[tokio::test]
    async fn test_resolve_from_prefers_explicit() {
        let mut registry = CrsRegistry::with_builtin_definitions().unwrap();
        let d = doc(json!({
            "type": "Point",
            "coordinates": [1.0, 2.0],
            "crs": {"type": "name", "properties": {"name": "EPSG:3006"}}
        }));
        let explicit = CrsInput::from("EPSG:4326");
        let from = resolve_from(&d, Some(&explicit), &mut registry, &OfflineResolver).await.unwrap();
        assert!(from.is_geographic());

        let detected = resolve_from(&d, None, &mut registry, &OfflineResolver).await.unwrap();
        assert!(!detected.is_geographic());
    }
}
