//! Custom error types for GeoJSON reprojection

use std::io;
use thiserror::Error;

/// Reprojection-specific error types
#[derive(Debug, Error)]
pub enum ReprojError {
    /// No source CRS was given and the document carries no `crs` member
    #[error("Unable to detect CRS, GeoJSON has no \"crs\" property")]
    MissingCrs,
    /// Embedded CRS metadata references a name the registry does not know
    #[error("CRS defined in crs section could not be identified: {0}")]
    UnidentifiableCrs(String),
    /// A named CRS could not be resolved locally or remotely
    #[error("Unable to resolve CRS '{name}': {reason}")]
    UnresolvedCrs { name: String, reason: String },
    /// A node carries a `type` tag that is not a GeoJSON kind
    #[error("Unsupported GeoJSON type: {0}")]
    UnsupportedGeometryKind(String),
    /// A position has fewer than two components
    #[error("Malformed coordinate: {0}")]
    MalformedCoordinate(String),
    /// The projection backend rejected a definition or a point
    #[error("Projection error: {0}")]
    Projection(String),
    /// Input could not be read as a GeoJSON tree
    #[error("Invalid GeoJSON document: {0}")]
    InvalidDocument(String),
    /// CRS definition files or CLI options are unusable
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReprojError {
    /// Shorthand for an `UnresolvedCrs` error
    pub fn unresolved(name: &str, reason: impl Into<String>) -> Self {
        ReprojError::UnresolvedCrs {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<geojson::Error> for ReprojError {
    fn from(error: geojson::Error) -> Self {
        ReprojError::InvalidDocument(error.to_string())
    }
}

/// Result type for reprojection operations
pub type ReprojResult<T> = Result<T, ReprojError>;
