use geo::MultiPolygon;

use crate::batch::map_ordered;
use crate::diagnostics::{Diagnostics, ReconWarning};
use crate::error::ReconError;
use crate::geometry;
use crate::index::RegionIndex;
use crate::model::{BoundaryCollection, Sliver, SliverAssignment};

/// Default assigner buffer, in CRS units (degrees for geographic data).
pub const DEFAULT_SLIVER_BUFFER: f64 = 0.01;

#[derive(Debug)]
pub struct AssignmentOutput {
    /// One entry per input sliver, same order.
    pub assignments: Vec<SliverAssignment>,
    pub diagnostics: Diagnostics,
}

/// Decide which candidate region each mergeable sliver is merged into.
pub fn assign_slivers(
    slivers: &[Sliver],
    candidate: &BoundaryCollection,
    buffer: f64,
) -> Result<AssignmentOutput, ReconError> {
    candidate.ensure_not_empty()?;
    let mut diagnostics = Diagnostics::default();
    let index = RegionIndex::build(candidate, &mut diagnostics);
    let mut out = assign_against(slivers, &index, buffer);
    diagnostics.extend(out.diagnostics);
    out.diagnostics = diagnostics;
    Ok(out)
}

/// Assign slivers against a prebuilt candidate index.
///
/// Each sliver is buffered by `buffer` to bridge coordinate-precision gaps, then:
/// - no intersecting region: unassigned, reported as a warning
/// - one region: that region
/// - several: the one with the largest `area(region ∩ buffered sliver)`, ties
///   going to the region first in input order
pub fn assign_against(
    slivers: &[Sliver],
    index: &RegionIndex<'_>,
    buffer: f64,
) -> AssignmentOutput {
    let targets = map_ordered(slivers, |sliver| target_for(sliver, index, buffer));

    let mut diagnostics = Diagnostics::default();
    let assignments: Vec<SliverAssignment> = slivers
        .iter()
        .zip(targets)
        .map(|(sliver, target)| {
            if target.is_none() {
                diagnostics.push(ReconWarning::UnassignedSliver {
                    sliver_id: sliver.id,
                });
            }
            SliverAssignment {
                sliver_id: sliver.id,
                target_region_id: target.map(|i| index.region(i).id.clone()),
            }
        })
        .collect();

    log::info!(
        "assigned {}/{} slivers",
        assignments.iter().filter(|a| a.target_region_id.is_some()).count(),
        assignments.len()
    );

    AssignmentOutput {
        assignments,
        diagnostics,
    }
}

fn target_for(sliver: &Sliver, index: &RegionIndex<'_>, buffer: f64) -> Option<usize> {
    let buffered = geometry::buffer(&MultiPolygon::new(vec![sliver.geometry.clone()]), buffer);
    let hits = index.intersecting(&buffered);

    match hits.as_slice() {
        [] => None,
        [only] => Some(*only),
        _ => {
            let mut best: Option<(usize, f64)> = None;
            for &i in &hits {
                let area = geometry::intersection_area(&index.region(i).geometry, &buffered);
                if best.map_or(true, |(_, a)| geometry::clearly_greater(area, a)) {
                    best = Some((i, area));
                }
            }
            log::debug!(
                "sliver {} touches {} regions, picked '{}'",
                sliver.id,
                hits.len(),
                best.map(|(i, _)| index.region(i).id.as_str()).unwrap_or("")
            );
            best.map(|(i, _)| i)
        }
    }
}
