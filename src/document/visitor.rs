//! Coordinate visitor
//!
//! Applies a per-position function across the nested coordinate arrays of a
//! geometry. The nesting depth is carried by the Rust type of the array
//! (`Vec<f64>` is a position, `Vec<Vec<f64>>` a line, and so on), so the
//! descent never has to guess whether a value is a coordinate or a list.

use geojson::{Geometry, Value};

use crate::document::errors::{ReprojError, ReprojResult};

/// Minimum number of components a position must have to be transformed
pub const MIN_POSITION_LEN: usize = 2;

/// A nested structure of positions
pub trait CoordinateTree: Sized {
    /// Build a new tree of the same shape by applying `f` to every position
    ///
    /// `f` owns arity changes: it may keep, drop, or add components.
    /// Positions with fewer than two components fail with
    /// `MalformedCoordinate` before `f` sees them.
    fn map_coordinates<F>(&self, f: &mut F) -> ReprojResult<Self>
    where
        F: FnMut(&[f64]) -> ReprojResult<Vec<f64>>;

    /// Visit every position in order without rebuilding anything
    fn for_each_coordinate<F>(&self, f: &mut F)
    where
        F: FnMut(&[f64]);
}

impl CoordinateTree for Vec<f64> {
    fn map_coordinates<F>(&self, f: &mut F) -> ReprojResult<Self>
    where
        F: FnMut(&[f64]) -> ReprojResult<Vec<f64>>,
    {
        check_position(self)?;
        f(self.as_slice())
    }

    fn for_each_coordinate<F>(&self, f: &mut F)
    where
        F: FnMut(&[f64]),
    {
        f(self.as_slice())
    }
}

impl<T: CoordinateTree> CoordinateTree for Vec<T> {
    fn map_coordinates<F>(&self, f: &mut F) -> ReprojResult<Self>
    where
        F: FnMut(&[f64]) -> ReprojResult<Vec<f64>>,
    {
        self.iter().map(|child| child.map_coordinates(f)).collect()
    }

    fn for_each_coordinate<F>(&self, f: &mut F)
    where
        F: FnMut(&[f64]),
    {
        for child in self {
            child.for_each_coordinate(f);
        }
    }
}

/// Check that `position` can be treated as an X/Y pair
pub fn check_position(position: &[f64]) -> ReprojResult<()> {
    if position.len() < MIN_POSITION_LEN {
        return Err(ReprojError::MalformedCoordinate(format!(
            "expected at least {} components, found {:?}",
            MIN_POSITION_LEN, position
        )));
    }
    Ok(())
}

/// Map every position of a geometry value, keeping its variant
///
/// Geometry collections are rebuilt member by member.
pub fn map_value<F>(value: &Value, f: &mut F) -> ReprojResult<Value>
where
    F: FnMut(&[f64]) -> ReprojResult<Vec<f64>>,
{
    Ok(match value {
        Value::Point(position) => Value::Point(position.map_coordinates(f)?),
        Value::MultiPoint(points) => Value::MultiPoint(points.map_coordinates(f)?),
        Value::LineString(line) => Value::LineString(line.map_coordinates(f)?),
        Value::MultiLineString(lines) => Value::MultiLineString(lines.map_coordinates(f)?),
        Value::Polygon(rings) => Value::Polygon(rings.map_coordinates(f)?),
        Value::MultiPolygon(polygons) => Value::MultiPolygon(polygons.map_coordinates(f)?),
        Value::GeometryCollection(geometries) => {
            let mut mapped = Vec::with_capacity(geometries.len());
            for geometry in geometries {
                mapped.push(Geometry {
                    bbox: geometry.bbox.clone(),
                    value: map_value(&geometry.value, f)?,
                    foreign_members: geometry.foreign_members.clone(),
                });
            }
            Value::GeometryCollection(mapped)
        },
    })
}

/// Visit every position of a geometry value
pub fn for_each_in_value<F>(value: &Value, f: &mut F)
where
    F: FnMut(&[f64]),
{
    match value {
        Value::Point(position) => position.for_each_coordinate(f),
        Value::MultiPoint(points) => points.for_each_coordinate(f),
        Value::LineString(line) => line.for_each_coordinate(f),
        Value::MultiLineString(lines) => lines.for_each_coordinate(f),
        Value::Polygon(rings) => rings.for_each_coordinate(f),
        Value::MultiPolygon(polygons) => polygons.for_each_coordinate(f),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                for_each_in_value(&geometry.value, f);
            }
        },
    }
}

/// Swap the first two components of a position, keeping the rest
pub fn swap_axes(position: &[f64]) -> ReprojResult<Vec<f64>> {
    check_position(position)?;
    let mut swapped = position.to_vec();
    swapped.swap(0, 1);
    Ok(swapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_single_position() {
        let point: Vec<f64> = vec![1.0, 2.0];
        let mapped = point.map_coordinates(&mut |p: &[f64]| Ok(vec![p[0] * 10.0, p[1] * 10.0])).unwrap();
        assert_eq!(mapped, vec![10.0, 20.0]);
    }

    #[test]
    fn test_preserves_nesting_shape() {
        let polygon: Vec<Vec<Vec<f64>>> = vec![
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]],
            vec![],
        ];
        let mapped = polygon.map_coordinates(&mut |p: &[f64]| swap_axes(p)).unwrap();
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].len(), 4);
        assert!(mapped[1].is_empty());
        assert_eq!(mapped[0][1], vec![0.0, 1.0]);
    }

    #[test]
    fn test_extra_components_pass_through_swap() {
        let line: Vec<Vec<f64>> = vec![vec![1.0, 2.0, 30.5], vec![3.0, 4.0, -2.0, 7.0]];
        let mapped = line.map_coordinates(&mut |p: &[f64]| swap_axes(p)).unwrap();
        assert_eq!(mapped, vec![vec![2.0, 1.0, 30.5], vec![4.0, 3.0, -2.0, 7.0]]);
    }

    #[test]
    fn test_short_position_is_malformed() {
        let line: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0]];
        let result = line.map_coordinates(&mut |p: &[f64]| Ok(p.to_vec()));
        assert!(matches!(result, Err(ReprojError::MalformedCoordinate(_))));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let line: Vec<Vec<f64>> = vec![vec![1.0, 2.0]];
        let _ = line.map_coordinates(&mut |_: &[f64]| Ok(vec![0.0, 0.0])).unwrap();
        assert_eq!(line, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_map_value_keeps_variant() {
        let value = Value::MultiLineString(vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]]]);
        let mapped = map_value(&value, &mut |p: &[f64]| swap_axes(p)).unwrap();
        assert_eq!(mapped, Value::MultiLineString(vec![vec![vec![2.0, 1.0], vec![4.0, 3.0]]]));
    }

    #[test]
    fn test_map_value_into_collection() {
        let value = Value::GeometryCollection(vec![
            Geometry::new(Value::Point(vec![1.0, 2.0])),
            Geometry::new(Value::LineString(vec![vec![5.0, 6.0]])),
        ]);
        let mut count = 0;
        for_each_in_value(&value, &mut |_: &[f64]| count += 1);
        assert_eq!(count, 2);

        let mapped = map_value(&value, &mut |p: &[f64]| swap_axes(p)).unwrap();
        match mapped {
            Value::GeometryCollection(geometries) => {
                assert_eq!(geometries[0].value, Value::Point(vec![2.0, 1.0]));
                assert_eq!(geometries[1].value, Value::LineString(vec![vec![6.0, 5.0]]));
            },
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_for_each_visits_all_positions() {
        let multi: Vec<Vec<Vec<f64>>> = vec![
            vec![vec![1.0, 1.0], vec![2.0, 2.0]],
            vec![vec![3.0, 3.0]],
        ];
        let mut seen = Vec::new();
        multi.for_each_coordinate(&mut |p: &[f64]| seen.push(p[0]));
        assert_eq!(seen, vec![1.0, 2.0, 3.0]);
    }
}
