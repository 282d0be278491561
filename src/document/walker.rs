//! GeoJSON document walker
//!
//! Rebuilds a GeoJSON tree node by node. Geometries that carry coordinates
//! are handed to the visitor's `on_leaf`; every node, collections included,
//! is then handed to `on_node` once its children are final.

use geojson::{Bbox, Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use log::debug;

use crate::document::errors::ReprojResult;

/// Mutable view of one rebuilt node
pub enum NodeMut<'a> {
    Geometry(&'a mut Geometry),
    Feature(&'a mut Feature),
    FeatureCollection(&'a mut FeatureCollection),
}

impl<'a> NodeMut<'a> {
    /// The node's `bbox` member
    pub fn bbox_mut(&mut self) -> &mut Option<Bbox> {
        match self {
            NodeMut::Geometry(g) => &mut g.bbox,
            NodeMut::Feature(f) => &mut f.bbox,
            NodeMut::FeatureCollection(fc) => &mut fc.bbox,
        }
    }

    /// Members outside the GeoJSON core (`crs` lives here)
    pub fn foreign_members_mut(&mut self) -> &mut Option<JsonObject> {
        match self {
            NodeMut::Geometry(g) => &mut g.foreign_members,
            NodeMut::Feature(f) => &mut f.foreign_members,
            NodeMut::FeatureCollection(fc) => &mut fc.foreign_members,
        }
    }

    /// GeoJSON `type` tag of the node
    pub fn kind(&self) -> &'static str {
        match self {
            NodeMut::Geometry(g) => geometry_kind(&g.value),
            NodeMut::Feature(_) => "Feature",
            NodeMut::FeatureCollection(_) => "FeatureCollection",
        }
    }
}

/// Callbacks driven by [`walk`]
pub trait GeoJsonVisitor {
    /// Called on a fresh copy of every geometry that has coordinates
    fn on_leaf(&mut self, geometry: &mut Geometry) -> ReprojResult<()>;

    /// Called on every node after its children have been processed
    fn on_node(&mut self, _node: NodeMut<'_>) -> ReprojResult<()> {
        Ok(())
    }
}

/// Rebuild `doc` with the same shape, running `visitor` over each node
///
/// The input is never modified. A feature without a geometry keeps its
/// `null` geometry and no leaf callback fires for it.
pub fn walk<V: GeoJsonVisitor + ?Sized>(doc: &GeoJson, visitor: &mut V) -> ReprojResult<GeoJson> {
    Ok(match doc {
        GeoJson::Geometry(geometry) => GeoJson::Geometry(walk_geometry(geometry, visitor)?),
        GeoJson::Feature(feature) => GeoJson::Feature(walk_feature(feature, visitor)?),
        GeoJson::FeatureCollection(collection) => {
            GeoJson::FeatureCollection(walk_feature_collection(collection, visitor)?)
        },
    })
}

/// Rebuild a feature collection
pub fn walk_feature_collection<V: GeoJsonVisitor + ?Sized>(
    collection: &FeatureCollection,
    visitor: &mut V,
) -> ReprojResult<FeatureCollection> {
    debug!("Walking FeatureCollection with {} features", collection.features.len());

    let features = collection
        .features
        .iter()
        .map(|feature| walk_feature(feature, visitor))
        .collect::<ReprojResult<Vec<_>>>()?;

    let mut copy = FeatureCollection {
        bbox: collection.bbox.clone(),
        features,
        foreign_members: collection.foreign_members.clone(),
    };
    visitor.on_node(NodeMut::FeatureCollection(&mut copy))?;
    Ok(copy)
}

/// Rebuild a feature, keeping its id and properties untouched
pub fn walk_feature<V: GeoJsonVisitor + ?Sized>(feature: &Feature, visitor: &mut V) -> ReprojResult<Feature> {
    let geometry = match &feature.geometry {
        Some(geometry) => Some(walk_geometry(geometry, visitor)?),
        None => None,
    };

    let mut copy = Feature {
        bbox: feature.bbox.clone(),
        geometry,
        id: feature.id.clone(),
        properties: feature.properties.clone(),
        foreign_members: feature.foreign_members.clone(),
    };
    visitor.on_node(NodeMut::Feature(&mut copy))?;
    Ok(copy)
}

/// Rebuild a geometry; collections recurse, everything else is a leaf
pub fn walk_geometry<V: GeoJsonVisitor + ?Sized>(geometry: &Geometry, visitor: &mut V) -> ReprojResult<Geometry> {
    let mut copy = match &geometry.value {
        Value::GeometryCollection(members) => {
            let members = members
                .iter()
                .map(|member| walk_geometry(member, visitor))
                .collect::<ReprojResult<Vec<_>>>()?;
            Geometry {
                bbox: geometry.bbox.clone(),
                value: Value::GeometryCollection(members),
                foreign_members: geometry.foreign_members.clone(),
            }
        },
        _ => {
            let mut leaf = Geometry {
                bbox: geometry.bbox.clone(),
                value: geometry.value.clone(),
                foreign_members: geometry.foreign_members.clone(),
            };
            visitor.on_leaf(&mut leaf)?;
            leaf
        },
    };
    visitor.on_node(NodeMut::Geometry(&mut copy))?;
    Ok(copy)
}

/// GeoJSON `type` tag of a geometry value
pub fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
