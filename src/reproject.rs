//! Reprojection and axis-reversal of GeoJSON documents
//!
//! `Reprojector` ties the pieces together: CRS resolution picks the source
//! and target, the projection provider supplies the point transform, and the
//! walker rebuilds the document with transformed coordinates.

use std::sync::Arc;

use geojson::{GeoJson, Geometry};
use log::{debug, info, warn};

use crate::coordinate::{BoundingBox, CoordinateTransform, CrsDescriptor, CrsInput, Proj4Provider, ProjectionProvider};
use crate::crs::registry::CrsCache;
use crate::crs::resolution;
use crate::crs::resolver::{CrsResolver, OfflineResolver};
use crate::document::errors::ReprojResult;
use crate::document::visitor::{map_value, swap_axes};
use crate::document::walker::{walk, GeoJsonVisitor, NodeMut};

/// Reprojects documents with a projection provider and a CRS resolver
#[derive(Clone)]
pub struct Reprojector {
    provider: Arc<dyn ProjectionProvider>,
    resolver: Arc<dyn CrsResolver>,
}

impl Default for Reprojector {
    fn default() -> Self {
        Self::offline()
    }
}

impl Reprojector {
    /// Create a reprojector from its two collaborators
    pub fn new(provider: Arc<dyn ProjectionProvider>, resolver: Arc<dyn CrsResolver>) -> Self {
        Reprojector { provider, resolver }
    }

    /// `proj4rs` math with network lookup disabled
    pub fn offline() -> Self {
        Self::new(Arc::new(Proj4Provider::new()), Arc::new(OfflineResolver))
    }

    /// `proj4rs` math with the given resolver
    pub fn with_resolver(resolver: Arc<dyn CrsResolver>) -> Self {
        Self::new(Arc::new(Proj4Provider::new()), resolver)
    }

    /// Reproject `doc` from `from` (detected when `None`) to `to`
    ///
    /// Every `crs` member is removed from the output. Nodes that had a
    /// `bbox` get it recomputed from their transformed coordinates.
    pub async fn reproject<C: CrsCache + ?Sized>(
        &self,
        doc: &GeoJson,
        from: Option<&CrsInput>,
        to: &CrsInput,
        registry: &mut C,
    ) -> ReprojResult<GeoJson> {
        let from = resolution::resolve_from(doc, from, registry, self.resolver.as_ref()).await?;
        let to = resolution::resolve_to(to, registry, self.resolver.as_ref()).await?;
        self.reproject_with(doc, &from, &to)
    }

    /// Reproject between two already resolved systems
    pub fn reproject_with(&self, doc: &GeoJson, from: &CrsDescriptor, to: &CrsDescriptor) -> ReprojResult<GeoJson> {
        info!("Reprojecting from '{}' to '{}'", from.definition(), to.definition());
        let transform = self.provider.get_transform(from, to)?;
        let mut visitor = ReprojectVisitor::new(transform.as_ref());
        let result = walk(doc, &mut visitor)?;
        info!(
            "Reprojected {} geometries, recomputed {} bounding boxes",
            visitor.leaves, visitor.bboxes
        );
        Ok(result)
    }

    /// Reproject `doc` to WGS 84 longitude/latitude
    pub async fn to_wgs84<C: CrsCache + ?Sized>(
        &self,
        doc: &GeoJson,
        from: Option<&CrsInput>,
        registry: &mut C,
    ) -> ReprojResult<GeoJson> {
        let wgs84 = CrsInput::Descriptor(CrsDescriptor::wgs84()?);
        self.reproject(doc, from, &wgs84, registry).await
    }

    /// Swap X and Y of every position; see [`reverse`]
    pub fn reverse(&self, doc: &GeoJson) -> ReprojResult<GeoJson> {
        reverse(doc)
    }

    /// Source CRS the document declares; see [`detect_crs`]
    pub fn detect_crs<C: CrsCache + ?Sized>(&self, doc: &GeoJson, registry: &C) -> ReprojResult<CrsDescriptor> {
        detect_crs(doc, registry)
    }
}

/// Swap the first two components of every position
///
/// No CRS is looked up, `crs` members are left alone and no `bbox` is
/// recomputed.
pub fn reverse(doc: &GeoJson) -> ReprojResult<GeoJson> {
    debug!("Reversing axis order");
    walk(doc, &mut ReverseVisitor)
}

/// Source CRS the document declares in its root `crs` member
pub fn detect_crs<C: CrsCache + ?Sized>(doc: &GeoJson, registry: &C) -> ReprojResult<CrsDescriptor> {
    resolution::detect_crs(doc, registry)
}

/// Applies a point transform to leaves and tidies every node
struct ReprojectVisitor<'a> {
    transform: &'a dyn CoordinateTransform,
    leaves: usize,
    bboxes: usize,
}

impl<'a> ReprojectVisitor<'a> {
    fn new(transform: &'a dyn CoordinateTransform) -> Self {
        ReprojectVisitor { transform, leaves: 0, bboxes: 0 }
    }
}

impl<'a> GeoJsonVisitor for ReprojectVisitor<'a> {
    fn on_leaf(&mut self, geometry: &mut Geometry) -> ReprojResult<()> {
        let transform = self.transform;
        geometry.value = map_value(&geometry.value, &mut |position: &[f64]| transform.forward(position))?;
        self.leaves += 1;
        Ok(())
    }

    fn on_node(&mut self, mut node: NodeMut<'_>) -> ReprojResult<()> {
        // The old CRS no longer describes the moved points
        let members = node.foreign_members_mut();
        let now_empty = match members.as_mut() {
            Some(map) => {
                map.remove("crs");
                map.is_empty()
            },
            None => false,
        };
        if now_empty {
            *members = None;
        }

        if node.bbox_mut().is_some() {
            let bbox = subtree_bbox(&node);
            let kind = node.kind();
            if bbox.is_empty() {
                warn!("Removing bbox from {} without coordinates", kind);
                *node.bbox_mut() = None;
            } else {
                debug!("Recomputed bbox of {}: {:?}", kind, bbox);
                *node.bbox_mut() = Some(bbox.to_geojson());
                self.bboxes += 1;
            }
        }
        Ok(())
    }
}

/// Swaps axes of every leaf
struct ReverseVisitor;

impl GeoJsonVisitor for ReverseVisitor {
    fn on_leaf(&mut self, geometry: &mut Geometry) -> ReprojResult<()> {
        geometry.value = map_value(&geometry.value, &mut |position: &[f64]| swap_axes(position))?;
        Ok(())
    }
}

/// Extent of all positions below `node`
fn subtree_bbox(node: &NodeMut<'_>) -> BoundingBox {
    let mut bbox = BoundingBox::empty();
    match node {
        NodeMut::Geometry(geometry) => bbox.expand_value(&geometry.value),
        NodeMut::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                bbox.expand_value(&geometry.value);
            }
        },
        NodeMut::FeatureCollection(collection) => {
            for feature in &collection.features {
                if let Some(geometry) = &feature.geometry {
                    bbox.expand_value(&geometry.value);
                }
            }
        },
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::registry::CrsRegistry;
    use crate::document::errors::ReprojError;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    const SWEREF99TM: &str = "+proj=utm +zone=33 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

    fn doc(value: serde_json::Value) -> GeoJson {
        GeoJson::from_json_value(value).unwrap()
    }

    fn json_of(doc: &GeoJson) -> serde_json::Value {
        serde_json::to_value(doc).unwrap()
    }

    fn sweref() -> CrsInput {
        CrsInput::Descriptor(CrsDescriptor::from_definition(SWEREF99TM).unwrap())
    }

    #[tokio::test]
    async fn test_point_to_wgs84() {
        let reprojector = Reprojector::offline();
        let mut registry = CrsRegistry::new();
        let point = doc(json!({"type": "Point", "coordinates": [319180.0, 6399862.0]}));

        let result = reprojector.to_wgs84(&point, Some(&sweref()), &mut registry).await.unwrap();
        let value = json_of(&result);
        assert_eq!(value["type"], "Point");
        assert_abs_diff_eq!(value["coordinates"][0].as_f64().unwrap(), 11.96526, epsilon = 1e-5);
        assert_abs_diff_eq!(value["coordinates"][1].as_f64().unwrap(), 57.70451, epsilon = 1e-5);
    }

    #[tokio::test]
    async fn test_crs_stripped_everywhere() {
        let reprojector = Reprojector::offline();
        let mut registry = CrsRegistry::with_builtin_definitions().unwrap();
        let crs = json!({"type": "name", "properties": {"name": "EPSG:3006"}});
        let input = doc(json!({
            "type": "FeatureCollection",
            "crs": crs,
            "features": [{
                "type": "Feature",
                "crs": crs,
                "properties": {"name": "a"},
                "geometry": {"type": "Point", "coordinates": [319180.0, 6399862.0], "crs": crs}
            }]
        }));

        let result = reprojector
            .reproject(&input, None, &CrsInput::from("EPSG:4326"), &mut registry)
            .await
            .unwrap();
        let text = serde_json::to_string(&result).unwrap();
        assert!(!text.contains("\"crs\""));
        assert_eq!(json_of(&result)["features"][0]["properties"], json!({"name": "a"}));
    }

    #[tokio::test]
    async fn test_bbox_recomputed_per_node() {
        let reprojector = Reprojector::offline();
        let mut registry = CrsRegistry::new();
        let input = doc(json!({
            "type": "FeatureCollection",
            "bbox": [0.0, 0.0, 1.0, 1.0],
            "features": [
                {
                    "type": "Feature",
                    "bbox": [0.0, 0.0, 1.0, 1.0],
                    "properties": {},
                    "geometry": {"type": "LineString", "coordinates": [[319180.0, 6399862.0], [319637.0, 6400617.0]]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "Point", "coordinates": [319675.0, 6400239.0]}
                }
            ]
        }));

        let result = reprojector.to_wgs84(&input, Some(&sweref()), &mut registry).await.unwrap();
        let value = json_of(&result);

        let line = &value["features"][0]["geometry"]["coordinates"];
        let feature_bbox = &value["features"][0]["bbox"];
        assert_eq!(feature_bbox[0], line[0][0]);
        assert_eq!(feature_bbox[1], line[0][1]);
        assert_eq!(feature_bbox[2], line[1][0]);
        assert_eq!(feature_bbox[3], line[1][1]);

        // The second feature had no bbox and gets none
        assert!(value["features"][1].get("bbox").is_none());

        let point = &value["features"][1]["geometry"]["coordinates"];
        let collection_bbox = &value["bbox"];
        assert_eq!(collection_bbox[0], line[0][0]);
        assert_eq!(collection_bbox[1], line[0][1]);
        assert_eq!(collection_bbox[2], point[0]);
        assert_eq!(collection_bbox[3], line[1][1]);
    }

    #[tokio::test]
    async fn test_empty_bbox_removed() {
        let reprojector = Reprojector::offline();
        let mut registry = CrsRegistry::new();
        let input = doc(json!({"type": "FeatureCollection", "bbox": [0.0, 0.0, 1.0, 1.0], "features": []}));
        let result = reprojector.to_wgs84(&input, Some(&sweref()), &mut registry).await.unwrap();
        assert!(json_of(&result).get("bbox").is_none());
    }

    #[tokio::test]
    async fn test_missing_crs() {
        let reprojector = Reprojector::offline();
        let mut registry = CrsRegistry::new();
        let input = doc(json!({"type": "Point", "coordinates": [1.0, 2.0]}));
        let result = reprojector.reproject(&input, None, &CrsInput::from("EPSG:4326"), &mut registry).await;
        assert!(matches!(result, Err(ReprojError::MissingCrs)));
    }

    #[tokio::test]
    async fn test_malformed_coordinate_fails_whole_call() {
        let reprojector = Reprojector::offline();
        let mut registry = CrsRegistry::new();
        let input = doc(json!({"type": "LineString", "coordinates": [[319180.0, 6399862.0], [1.0]]}));
        let result = reprojector.to_wgs84(&input, Some(&sweref()), &mut registry).await;
        assert!(matches!(result, Err(ReprojError::MalformedCoordinate(_))));
    }

    #[test]
    fn test_reverse_linestring() {
        let input = doc(json!({"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}));
        let result = reverse(&input).unwrap();
        assert_eq!(
            result,
            doc(json!({"type": "LineString", "coordinates": [[2.0, 1.0], [4.0, 3.0]]}))
        );
    }

    #[test]
    fn test_reverse_keeps_crs_and_bbox() {
        let input = doc(json!({
            "type": "Point",
            "coordinates": [1.0, 2.0, 3.0],
            "bbox": [1.0, 2.0, 1.0, 2.0],
            "crs": {"type": "name", "properties": {"name": "EPSG:4326"}}
        }));
        let value = json_of(&reverse(&input).unwrap());
        assert_eq!(value["coordinates"], json!([2.0, 1.0, 3.0]));
        assert_eq!(value["bbox"], json!([1.0, 2.0, 1.0, 2.0]));
        assert_eq!(value["crs"]["properties"]["name"], "EPSG:4326");
    }
}
