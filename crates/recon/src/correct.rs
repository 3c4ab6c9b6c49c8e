use std::collections::HashMap;

use geo::{BooleanOps, MultiPolygon, Polygon};

use crate::error::ReconError;
use crate::geometry;
use crate::model::{BoundaryCollection, Role, Sliver, SliverAssignment};

/// Default seam buffer applied to merged slivers, in CRS units.
pub const DEFAULT_SEAM_BUFFER: f64 = 0.0001;

/// Rebuild the candidate collection against the reference.
///
/// Each candidate region becomes `(geometry ∩ union(reference)) ∪
/// buffer(union(assigned slivers), seam_buffer)`. Ids, attributes and match
/// records are kept; the result has role [`Role::Corrected`].
pub fn correct(
    candidate: &BoundaryCollection,
    reference: &BoundaryCollection,
    slivers: &[Sliver],
    assignments: &[SliverAssignment],
    seam_buffer: f64,
) -> Result<BoundaryCollection, ReconError> {
    candidate.ensure_same_crs(reference)?;
    let reference_union = geometry::union_of(reference.regions().iter().map(|r| &r.geometry));
    Ok(correct_with_union(
        candidate,
        &reference_union,
        slivers,
        assignments,
        seam_buffer,
    ))
}

/// [`correct`] with the reference union already computed.
pub fn correct_with_union(
    candidate: &BoundaryCollection,
    reference_union: &MultiPolygon<f64>,
    slivers: &[Sliver],
    assignments: &[SliverAssignment],
    seam_buffer: f64,
) -> BoundaryCollection {
    let by_target = slivers_by_target(slivers, assignments);

    let regions = candidate
        .regions()
        .iter()
        .map(|region| {
            if !geometry::has_finite_coords(&region.geometry) {
                // Already reported by the index; leave it alone.
                return region.clone();
            }
            let clipped = region.geometry.intersection(reference_union);
            let geometry = match by_target.get(region.id.as_str()) {
                Some(assigned) => {
                    let merged = geometry::buffer(
                        &geometry::union_of_polygons(assigned.iter().copied()),
                        seam_buffer,
                    );
                    log::debug!(
                        "region '{}' absorbs {} sliver(s)",
                        region.id,
                        assigned.len()
                    );
                    clipped.union(&merged)
                }
                None => clipped,
            };
            region.clone().with_geometry(geometry)
        })
        .collect();

    candidate.derive(Role::Corrected, regions)
}

fn slivers_by_target<'a>(
    slivers: &'a [Sliver],
    assignments: &'a [SliverAssignment],
) -> HashMap<&'a str, Vec<&'a Polygon<f64>>> {
    let geometry_of: HashMap<usize, &Polygon<f64>> =
        slivers.iter().map(|s| (s.id, &s.geometry)).collect();

    let mut by_target: HashMap<&str, Vec<&Polygon<f64>>> = HashMap::new();
    for assignment in assignments {
        let Some(target) = assignment.target_region_id.as_deref() else {
            continue;
        };
        match geometry_of.get(&assignment.sliver_id) {
            Some(geometry) => by_target.entry(target).or_default().push(geometry),
            None => log::warn!(
                "assignment for unknown sliver {} ignored",
                assignment.sliver_id
            ),
        }
    }
    by_target
}
