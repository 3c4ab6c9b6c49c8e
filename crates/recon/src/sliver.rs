use geo::{BooleanOps, MultiPolygon};

use crate::diagnostics::{Diagnostics, Entity, ReconWarning};
use crate::error::ReconError;
use crate::geometry::{self, Degeneracy};
use crate::model::{BoundaryCollection, Sliver};
use crate::projection::AreaProjection;

#[derive(Debug, Default)]
pub struct SliverExtraction {
    pub slivers: Vec<Sliver>,
    pub diagnostics: Diagnostics,
}

/// Area present in the reference but missing from the candidate, one sliver per
/// connected component.
pub fn extract_slivers(
    reference: &BoundaryCollection,
    candidate: &BoundaryCollection,
    projection: &AreaProjection,
) -> Result<SliverExtraction, ReconError> {
    reference.ensure_same_crs(candidate)?;
    let reference_union = geometry::union_of(reference.regions().iter().map(|r| &r.geometry));
    let candidate_union = geometry::union_of(candidate.regions().iter().map(|r| &r.geometry));
    Ok(slivers_between(&reference_union, &candidate_union, projection))
}

/// Same as [`extract_slivers`], over unions the caller already has.
pub fn slivers_between(
    reference_union: &MultiPolygon<f64>,
    candidate_union: &MultiPolygon<f64>,
    projection: &AreaProjection,
) -> SliverExtraction {
    let difference = reference_union.difference(candidate_union);
    slivers_from_difference(difference, projection)
}

/// Split a difference geometry into slivers with sequential ids.
///
/// Components with zero area are dropped and reported; they don't consume an id.
pub fn slivers_from_difference(
    difference: MultiPolygon<f64>,
    projection: &AreaProjection,
) -> SliverExtraction {
    let mut out = SliverExtraction::default();

    for (index, polygon) in difference.into_iter().enumerate() {
        if let Err(reason) = geometry::measure_polygon(&polygon) {
            out.diagnostics.push(ReconWarning::DegenerateGeometry {
                entity: Entity::SliverComponent { index },
                reason,
            });
            continue;
        }
        let area_km2 = projection.polygon_area_km2(&polygon);
        if !area_km2.is_finite() {
            out.diagnostics.push(ReconWarning::DegenerateGeometry {
                entity: Entity::SliverComponent { index },
                reason: Degeneracy::NonFiniteCoordinates,
            });
            continue;
        }
        out.slivers.push(Sliver {
            id: out.slivers.len(),
            geometry: polygon,
            area_km2,
        });
    }

    log::info!(
        "extracted {} slivers ({:.3} km² total)",
        out.slivers.len(),
        out.slivers.iter().map(|s| s.area_km2).sum::<f64>()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::Crs;
    use crate::model::{Region, Role};
    use approx::assert_abs_diff_eq;
    use geo::{Area, Rect};

    const KM: AreaProjection = AreaProjection::Planar { metres_per_unit: 1000.0 };

    fn rect(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::new(id, Rect::new((x0, y0), (x1, y1)).to_polygon())
    }

    fn collection(role: Role, regions: Vec<Region>) -> BoundaryCollection {
        BoundaryCollection::new(role, Crs::parse("EPSG:32637").unwrap(), regions).unwrap()
    }

    #[test]
    fn gap_strip_is_one_sliver() {
        let reference = collection(Role::Reference, vec![rect("r", 0.0, 0.0, 10.0, 10.0)]);
        let candidate = collection(
            Role::Candidate,
            vec![rect("a", 0.0, 0.0, 4.75, 10.0), rect("b", 5.25, 0.0, 10.0, 10.0)],
        );
        let out = extract_slivers(&reference, &candidate, &KM).unwrap();
        assert_eq!(out.slivers.len(), 1);
        assert_eq!(out.slivers[0].id, 0);
        assert_abs_diff_eq!(out.slivers[0].area_km2, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.slivers[0].geometry.unsigned_area(), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn disjoint_components_get_sequential_ids() {
        let reference = collection(Role::Reference, vec![rect("r", 0.0, 0.0, 10.0, 10.0)]);
        let candidate = collection(
            Role::Candidate,
            vec![
                rect("a", 0.0, 0.0, 3.0, 10.0),
                rect("b", 4.0, 0.0, 6.0, 10.0),
                rect("c", 7.0, 0.0, 10.0, 10.0),
            ],
        );
        let out = extract_slivers(&reference, &candidate, &KM).unwrap();
        let ids: Vec<usize> = out.slivers.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1]);
        let total: f64 = out.slivers.iter().map(|s| s.area_km2).sum();
        assert_abs_diff_eq!(total, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn identical_inputs_yield_nothing() {
        let regions = vec![rect("a", 0.0, 0.0, 5.0, 10.0), rect("b", 5.0, 0.0, 10.0, 10.0)];
        let reference = collection(Role::Reference, regions.clone());
        let candidate = collection(Role::Candidate, regions);
        let out = extract_slivers(&reference, &candidate, &KM).unwrap();
        assert!(out.slivers.is_empty());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn candidate_outside_reference_is_not_a_sliver() {
        // Area only in the candidate is a hole, not a sliver.
        let reference = collection(Role::Reference, vec![rect("r", 0.0, 0.0, 5.0, 5.0)]);
        let candidate = collection(Role::Candidate, vec![rect("c", 0.0, 0.0, 8.0, 8.0)]);
        let out = extract_slivers(&reference, &candidate, &KM).unwrap();
        assert!(out.slivers.is_empty());
    }

    #[test]
    fn disjoint_candidate_returns_whole_reference() {
        let reference = collection(
            Role::Reference,
            vec![rect("r1", 0.0, 0.0, 2.0, 2.0), rect("r2", 5.0, 5.0, 6.0, 6.0)],
        );
        let candidate = collection(Role::Candidate, vec![rect("c", 20.0, 20.0, 21.0, 21.0)]);
        let out = extract_slivers(&reference, &candidate, &KM).unwrap();
        assert_eq!(out.slivers.len(), 2);
        let total: f64 = out.slivers.iter().map(|s| s.area_km2).sum();
        assert_abs_diff_eq!(total, 5.0, epsilon = 1e-6);
    }
}
