//! Area measurement in a projected coordinate system.
//!
//! Geometries always stay in their source CRS. Projections here are used only
//! to measure area in km².

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, SQRT_2};
use std::fmt;

use geo::{Area, Coord, MapCoords, MultiPolygon, Polygon};
use serde::Deserialize;

/// Radius of the sphere with the same surface area as the WGS84 ellipsoid (m).
pub const AUTHALIC_RADIUS_M: f64 = 6_371_007.181;
/// Spherical radius used by Web Mercator (EPSG:3857).
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    #[default]
    Mollweide,
    CylindricalEqualArea,
    WebMercator,
    Planar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaProjection {
    /// Global equal-area pseudocylindrical projection (ESRI:54009).
    Mollweide,
    /// Lambert cylindrical equal-area.
    CylindricalEqualArea,
    /// EPSG:3857. Not equal-area; kept for comparing against legacy numbers.
    WebMercator,
    /// Input coordinates are already projected; scale units to metres.
    Planar { metres_per_unit: f64 },
}

impl Default for AreaProjection {
    fn default() -> Self {
        Self::Mollweide
    }
}

impl fmt::Display for AreaProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mollweide => write!(f, "mollweide"),
            Self::CylindricalEqualArea => write!(f, "cylindrical_equal_area"),
            Self::WebMercator => write!(f, "web_mercator"),
            Self::Planar { metres_per_unit } => write!(f, "planar({metres_per_unit} m/unit)"),
        }
    }
}

impl AreaProjection {
    /// Project a lon/lat (degrees) or planar coordinate to metres.
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        match *self {
            Self::Mollweide => mollweide(c),
            Self::CylindricalEqualArea => {
                let lambda = c.x.to_radians();
                let phi = c.y.clamp(-90.0, 90.0).to_radians();
                Coord {
                    x: AUTHALIC_RADIUS_M * lambda,
                    y: AUTHALIC_RADIUS_M * phi.sin(),
                }
            }
            Self::WebMercator => {
                let lat = c.y.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
                Coord {
                    x: WEB_MERCATOR_RADIUS_M * c.x.to_radians(),
                    y: WEB_MERCATOR_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
                }
            }
            Self::Planar { metres_per_unit } => Coord {
                x: c.x * metres_per_unit,
                y: c.y * metres_per_unit,
            },
        }
    }

    pub fn area_km2(&self, geometry: &MultiPolygon<f64>) -> f64 {
        geometry.map_coords(|c| self.project(c)).unsigned_area() / 1_000_000.0
    }

    pub fn polygon_area_km2(&self, polygon: &Polygon<f64>) -> f64 {
        polygon.map_coords(|c| self.project(c)).unsigned_area() / 1_000_000.0
    }
}

fn mollweide(c: Coord<f64>) -> Coord<f64> {
    let lambda = c.x.to_radians();
    let phi = c.y.clamp(-90.0, 90.0).to_radians();
    let theta = mollweide_theta(phi);
    Coord {
        x: AUTHALIC_RADIUS_M * 2.0 * SQRT_2 / PI * lambda * theta.cos(),
        y: AUTHALIC_RADIUS_M * SQRT_2 * theta.sin(),
    }
}

/// Solve `2θ + sin 2θ = π sin φ` by Newton iteration.
fn mollweide_theta(phi: f64) -> f64 {
    if (FRAC_PI_2 - phi.abs()).abs() < 1e-12 {
        return phi.signum() * FRAC_PI_2;
    }
    let target = PI * phi.sin();
    let mut two_theta = 2.0 * phi;
    for _ in 0..50 {
        let denom = 1.0 + two_theta.cos();
        if denom.abs() < 1e-15 {
            break;
        }
        let step = (two_theta + two_theta.sin() - target) / denom;
        two_theta -= step;
        if step.abs() < 1e-13 {
            break;
        }
    }
    two_theta / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use geo::Rect;

    fn cell(lon: f64, lat: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new((lon, lat), (lon + size, lat + size)).to_polygon()])
    }

    /// Exact area of a lon/lat box on the authalic sphere.
    fn spherical_box_km2(lat0: f64, lat1: f64, dlon: f64) -> f64 {
        let r = AUTHALIC_RADIUS_M / 1000.0;
        r * r * dlon.to_radians() * (lat1.to_radians().sin() - lat0.to_radians().sin())
    }

    #[test]
    fn cylindrical_equal_area_is_exact_for_boxes() {
        let expected = spherical_box_km2(0.0, 1.0, 1.0);
        let got = AreaProjection::CylindricalEqualArea.area_km2(&cell(36.0, 0.0, 1.0));
        assert_relative_eq!(got, expected, max_relative = 1e-9);
        assert_abs_diff_eq!(got, 12_363.7, epsilon = 1.0);
    }

    #[test]
    fn mollweide_preserves_area_at_high_latitude() {
        let expected = spherical_box_km2(60.0, 60.1, 0.1);
        let got = AreaProjection::Mollweide.area_km2(&cell(10.0, 60.0, 0.1));
        assert_relative_eq!(got, expected, max_relative = 1e-3);
    }

    #[test]
    fn web_mercator_inflates_high_latitudes() {
        let equal_area = AreaProjection::Mollweide.area_km2(&cell(10.0, 60.0, 0.1));
        let mercator = AreaProjection::WebMercator.area_km2(&cell(10.0, 60.0, 0.1));
        // Scale factor sec²(60°) = 4.
        assert_relative_eq!(mercator / equal_area, 4.0, max_relative = 0.02);
    }

    #[test]
    fn planar_scales_units() {
        let p = AreaProjection::Planar { metres_per_unit: 1000.0 };
        assert_abs_diff_eq!(p.area_km2(&cell(0.0, 0.0, 2.0)), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn mollweide_theta_endpoints() {
        assert_abs_diff_eq!(mollweide_theta(0.0), 0.0);
        assert_abs_diff_eq!(mollweide_theta(FRAC_PI_2), FRAC_PI_2);
        assert_abs_diff_eq!(mollweide_theta(-FRAC_PI_2), -FRAC_PI_2);
        let phi = 45f64.to_radians();
        let theta = mollweide_theta(phi);
        assert_abs_diff_eq!(
            2.0 * theta + (2.0 * theta).sin(),
            PI * phi.sin(),
            epsilon = 1e-10
        );
    }
}
