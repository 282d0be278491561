//! Coordinate transformation functionality

use log::debug;
use proj4rs::transform::transform;

use super::crs::CrsDescriptor;
use crate::document::errors::{ReprojError, ReprojResult};
use crate::document::visitor::check_position;

/// A forward point transform between two fixed coordinate systems
pub trait CoordinateTransform {
    /// Transform one position; components after X/Y are kept as they are
    fn forward(&self, position: &[f64]) -> ReprojResult<Vec<f64>>;
}

/// Source of transforms for pairs of coordinate systems
pub trait ProjectionProvider: Send + Sync {
    /// Build the transform taking `from` coordinates to `to` coordinates
    fn get_transform(&self, from: &CrsDescriptor, to: &CrsDescriptor) -> ReprojResult<Box<dyn CoordinateTransform>>;
}

/// Projection provider backed by the pure Rust `proj4rs` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct Proj4Provider;

impl Proj4Provider {
    /// Create a new provider
    pub fn new() -> Self {
        Proj4Provider
    }
}

impl ProjectionProvider for Proj4Provider {
    fn get_transform(&self, from: &CrsDescriptor, to: &CrsDescriptor) -> ReprojResult<Box<dyn CoordinateTransform>> {
        debug!("Creating transform from '{}' to '{}'", from.definition(), to.definition());
        if from == to {
            return Ok(Box::new(IdentityTransform));
        }
        Ok(Box::new(Proj4Transform {
            source: from.clone(),
            target: to.clone(),
        }))
    }
}

/// Transform between two identical systems
struct IdentityTransform;

impl CoordinateTransform for IdentityTransform {
    fn forward(&self, position: &[f64]) -> ReprojResult<Vec<f64>> {
        check_position(position)?;
        Ok(position.to_vec())
    }
}

/// `proj4rs` transform between two parsed systems
struct Proj4Transform {
    source: CrsDescriptor,
    target: CrsDescriptor,
}

impl CoordinateTransform for Proj4Transform {
    fn forward(&self, position: &[f64]) -> ReprojResult<Vec<f64>> {
        check_position(position)?;

        // proj4rs works in radians for geographic systems
        let (x, y) = if self.source.is_geographic() {
            (position[0].to_radians(), position[1].to_radians())
        } else {
            (position[0], position[1])
        };

        let mut point = (x, y, 0.0);
        transform(self.source.proj(), self.target.proj(), &mut point)
            .map_err(|e| ReprojError::Projection(format!("Transform failed for {:?}: {:?}", position, e)))?;

        let (out_x, out_y) = if self.target.is_geographic() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !out_x.is_finite() || !out_y.is_finite() {
            return Err(ReprojError::Projection(format!(
                "Transform of {:?} produced a non-finite position", position
            )));
        }

        let mut result = Vec::with_capacity(position.len());
        result.push(out_x);
        result.push(out_y);
        result.extend_from_slice(&position[2..]);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SWEREF99TM: &str = "+proj=utm +zone=33 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

    #[test]
    fn test_sweref99tm_to_wgs84() {
        let from = CrsDescriptor::from_definition(SWEREF99TM).unwrap();
        let to = CrsDescriptor::wgs84().unwrap();
        let t = Proj4Provider::new().get_transform(&from, &to).unwrap();

        let result = t.forward(&[319180.0, 6399862.0]).unwrap();
        assert_eq!(result.len(), 2);
        assert_abs_diff_eq!(result[0], 11.96526, epsilon = 1e-5);
        assert_abs_diff_eq!(result[1], 57.70451, epsilon = 1e-5);
    }

    #[test]
    fn test_elevation_passes_through() {
        let from = CrsDescriptor::from_definition(SWEREF99TM).unwrap();
        let to = CrsDescriptor::wgs84().unwrap();
        let t = Proj4Provider::new().get_transform(&from, &to).unwrap();

        let result = t.forward(&[319180.0, 6399862.0, 42.5]).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[2], 42.5);
    }

    #[test]
    fn test_identity_for_same_descriptor() {
        let wgs84 = CrsDescriptor::wgs84().unwrap();
        let t = Proj4Provider::new().get_transform(&wgs84, &wgs84).unwrap();
        assert_eq!(t.forward(&[11.0, 57.0, 1.0]).unwrap(), vec![11.0, 57.0, 1.0]);
    }

    #[test]
    fn test_short_position_rejected() {
        let from = CrsDescriptor::from_definition(SWEREF99TM).unwrap();
        let to = CrsDescriptor::wgs84().unwrap();
        let t = Proj4Provider::new().get_transform(&from, &to).unwrap();
        assert!(matches!(t.forward(&[1.0]), Err(ReprojError::MalformedCoordinate(_))));
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let wgs84 = CrsDescriptor::wgs84().unwrap();
        let merc = CrsDescriptor::from_definition(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
        ).unwrap();
        let provider = Proj4Provider::new();
        let forward = provider.get_transform(&wgs84, &merc).unwrap();
        let inverse = provider.get_transform(&merc, &wgs84).unwrap();

        let projected = forward.forward(&[18.0686, 59.3293]).unwrap();
        let back = inverse.forward(&projected).unwrap();
        assert_abs_diff_eq!(back[0], 18.0686, epsilon = 1e-7);
        assert_abs_diff_eq!(back[1], 59.3293, epsilon = 1e-7);
    }
}
