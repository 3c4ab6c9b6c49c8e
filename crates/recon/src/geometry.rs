//! Geometry helpers shared by the pipeline stages.

use std::fmt;

use geo::{Area, BooleanOps, Buffer, CoordsIter, MultiPolygon, Polygon};
use serde::Serialize;

/// Why a geometry was left out of area-based computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    Empty,
    NonFiniteCoordinates,
    ZeroArea,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty geometry"),
            Self::NonFiniteCoordinates => write!(f, "non-finite coordinates"),
            Self::ZeroArea => write!(f, "zero area"),
        }
    }
}

pub fn has_finite_coords(geometry: &MultiPolygon<f64>) -> bool {
    geometry
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Planar area in CRS units, or why the geometry can't take part in area math.
pub fn measure(geometry: &MultiPolygon<f64>) -> Result<f64, Degeneracy> {
    if geometry.0.is_empty() {
        return Err(Degeneracy::Empty);
    }
    if !has_finite_coords(geometry) {
        return Err(Degeneracy::NonFiniteCoordinates);
    }
    let area = geometry.unsigned_area();
    if area > 0.0 && area.is_finite() {
        Ok(area)
    } else {
        Err(Degeneracy::ZeroArea)
    }
}

pub fn measure_polygon(polygon: &Polygon<f64>) -> Result<f64, Degeneracy> {
    measure(&MultiPolygon::new(vec![polygon.clone()]))
}

/// Dissolve geometries into one multipolygon, skipping non-finite ones.
pub fn union_of<'a>(geometries: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let usable: Vec<&MultiPolygon<f64>> = geometries
        .into_iter()
        .filter(|g| has_finite_coords(g) && !g.0.is_empty())
        .collect();
    if usable.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    geo::unary_union(usable)
}

pub fn union_of_polygons<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>) -> MultiPolygon<f64> {
    let usable: Vec<&Polygon<f64>> = polygons.into_iter().collect();
    if usable.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    geo::unary_union(usable)
}

/// Outward buffer by `distance` CRS units. Zero distance returns the input.
pub fn buffer(geometry: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance == 0.0 || geometry.0.is_empty() {
        return geometry.clone();
    }
    geometry.buffer(distance)
}

/// Area of `a ∩ b` in CRS units.
pub fn intersection_area(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    a.intersection(b).unsigned_area()
}

/// Relative tolerance under which two overlap measures count as a tie.
const TIE_TOLERANCE: f64 = 1e-6;

/// `a > b` by more than boolean-op rounding. Callers scanning candidates in
/// input order use this so near-equal overlaps keep the earlier candidate.
pub fn clearly_greater(a: f64, b: f64) -> bool {
    a - b > TIE_TOLERANCE * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::{Coord, LineString, Rect};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new((x0, y0), (x1, y1)).to_polygon()])
    }

    #[test]
    fn measure_flags_degenerate_shapes() {
        assert_eq!(measure(&MultiPolygon::new(vec![])), Err(Degeneracy::Empty));

        let flat = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)]),
            vec![],
        );
        assert_eq!(measure_polygon(&flat), Err(Degeneracy::ZeroArea));

        let nan = Polygon::new(
            LineString::from(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: f64::NAN, y: 1.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );
        assert_eq!(measure_polygon(&nan), Err(Degeneracy::NonFiniteCoordinates));

        assert_abs_diff_eq!(measure(&rect(0.0, 0.0, 2.0, 3.0)).unwrap(), 6.0);
    }

    #[test]
    fn union_dissolves_shared_edges() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        let u = union_of([&a, &b]);
        assert_eq!(u.0.len(), 1);
        assert_abs_diff_eq!(u.unsigned_area(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn union_of_nothing_is_empty() {
        let u = union_of(std::iter::empty());
        assert!(u.0.is_empty());
    }

    #[test]
    fn buffer_grows_area() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let grown = buffer(&a, 0.1);
        assert!(grown.unsigned_area() > 1.0);
        assert!(grown.unsigned_area() < 1.5);
        assert_eq!(buffer(&a, 0.0), a);
    }

    #[test]
    fn intersection_area_of_overlap() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 1.0, 3.0, 3.0);
        assert_abs_diff_eq!(intersection_area(&a, &b), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn near_equal_overlaps_tie() {
        assert!(clearly_greater(0.6, 0.5));
        assert!(!clearly_greater(0.5, 0.5));
        assert!(!clearly_greater(0.5 + 1e-9, 0.5));
        assert!(!clearly_greater(0.4, 0.5));
        assert!(clearly_greater(1e-12, 0.0));
    }
}
