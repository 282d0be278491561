//! Bounding box accumulation for recomputing GeoJSON `bbox` members

use geojson::Value;

use crate::document::visitor::for_each_in_value;

/// A 2D bounding box in a coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    /// An inverted box that any position will expand
    pub fn empty() -> Self {
        BoundingBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    /// Whether no position has been added yet
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow the box to include the X/Y part of `position`
    ///
    /// Positions shorter than two components are ignored here; they are
    /// rejected earlier when the coordinates get transformed.
    pub fn expand(&mut self, position: &[f64]) {
        if position.len() < 2 {
            return;
        }
        self.min_x = self.min_x.min(position[0]);
        self.min_y = self.min_y.min(position[1]);
        self.max_x = self.max_x.max(position[0]);
        self.max_y = self.max_y.max(position[1]);
    }

    /// Grow the box to include every position of a geometry value
    pub fn expand_value(&mut self, value: &Value) {
        for_each_in_value(value, &mut |position: &[f64]| self.expand(position));
    }

    /// GeoJSON `bbox` member, `[minX, minY, maxX, maxY]`
    ///
    /// Always planar, also for positions that carry Z.
    pub fn to_geojson(&self) -> Vec<f64> {
        vec![self.min_x, self.min_y, self.max_x, self.max_y]
    }
}
