//! GeoJSON document model and traversal
//!
//! This module provides the typed document tree, the coordinate visitor
//! and the walker used by every transformation.

pub mod errors;
pub mod parse;
pub mod visitor;
pub mod walker;

pub use errors::{ReprojError, ReprojResult};
pub use parse::{parse_document, parse_value, to_json_string};
pub use visitor::{map_value, swap_axes, CoordinateTree};
pub use walker::{walk, GeoJsonVisitor, NodeMut};
