//! Coordinate handling for geospatial data
//!
//! This module provides structures and functionality for handling
//! coordinate reference systems, transformations and bounding boxes.

mod bbox;
mod crs;
mod transform;

// Re-export key types
pub use self::bbox::BoundingBox;
pub use self::crs::{epsg_code_from_name, normalize_name, CrsDescriptor, CrsInput, EmbeddedCrs, WGS84_DEFINITION};
pub use self::transform::{CoordinateTransform, Proj4Provider, ProjectionProvider};
