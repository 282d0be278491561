//! CRS registries, resolvers and resolution
//!
//! Resolution is kept apart from the transform math so callers can seed a
//! registry from local definitions and never touch the network, or allow
//! on-demand lookups through a resolver.

pub mod definitions;
pub mod registry;
pub mod resolution;
pub mod resolver;

pub use definitions::{builtin_definitions, CrsDefinitions};
pub use registry::{CrsCache, CrsRegistry, SharedCrsRegistry};
pub use resolution::{detect_crs, resolve_crs, resolve_from, resolve_name, resolve_to};
pub use resolver::{CrsResolver, EpsgIoResolver, OfflineResolver};
