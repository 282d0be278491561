pub mod document;
pub mod coordinate;
pub mod crs;
pub mod reproject;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::ReprojKit;

pub use document::{parse_document, GeoJsonVisitor, ReprojError, ReprojResult};
pub use coordinate::{BoundingBox, CrsDescriptor, CrsInput, Proj4Provider, ProjectionProvider};
pub use crs::{CrsCache, CrsDefinitions, CrsRegistry, CrsResolver, SharedCrsRegistry};
pub use reproject::{detect_crs, reverse, Reprojector};
