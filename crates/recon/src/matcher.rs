use crate::batch::map_ordered;
use crate::diagnostics::{Diagnostics, Entity, ReconWarning};
use crate::error::ReconError;
use crate::geometry::{self, Degeneracy};
use crate::index::RegionIndex;
use crate::model::{BoundaryCollection, MatchRecord, Region};

/// Source collection with match records attached, plus what went wrong per region.
#[derive(Debug)]
pub struct MatchOutput {
    pub collection: BoundaryCollection,
    pub diagnostics: Diagnostics,
}

enum MatchOutcome {
    Matched(MatchRecord),
    Unmatched,
    Degenerate(Degeneracy),
}

/// Find, for every source region, the target region covering most of it.
///
/// Returns a new collection; neither input is modified.
pub fn match_regions(
    source: &BoundaryCollection,
    target: &BoundaryCollection,
) -> Result<MatchOutput, ReconError> {
    source.ensure_same_crs(target)?;
    let mut diagnostics = Diagnostics::default();
    let index = RegionIndex::build(target, &mut diagnostics);
    let mut out = match_against(source, &index);
    diagnostics.extend(out.diagnostics);
    out.diagnostics = diagnostics;
    Ok(out)
}

/// Match `source` against a prebuilt index of the target collection.
///
/// Candidates are target regions intersecting the source region. The winner
/// maximises `area(source ∩ target) / area(source)`; ties go to the target
/// that comes first in input order.
pub fn match_against(source: &BoundaryCollection, index: &RegionIndex<'_>) -> MatchOutput {
    let (collection, warnings) = match_records(source, index);
    let mut diagnostics = Diagnostics::default();
    for warning in warnings {
        diagnostics.push(warning);
    }
    MatchOutput {
        collection,
        diagnostics,
    }
}

/// [`match_against`] without logging: warnings are returned for the caller to
/// report or drop.
pub(crate) fn match_records(
    source: &BoundaryCollection,
    index: &RegionIndex<'_>,
) -> (BoundaryCollection, Vec<ReconWarning>) {
    let outcomes = map_ordered(source.regions(), |region| match_one(region, index));

    let mut warnings = Vec::new();
    let mut regions = Vec::with_capacity(source.len());
    let mut matched = 0usize;

    for (region, outcome) in source.regions().iter().zip(outcomes) {
        let record = match outcome {
            MatchOutcome::Matched(record) => {
                matched += 1;
                Some(record)
            }
            MatchOutcome::Unmatched => {
                warnings.push(ReconWarning::UnmatchedRegion {
                    role: source.role(),
                    region_id: region.id.clone(),
                });
                None
            }
            MatchOutcome::Degenerate(reason) => {
                warnings.push(ReconWarning::DegenerateGeometry {
                    entity: Entity::Region {
                        role: source.role(),
                        id: region.id.clone(),
                    },
                    reason,
                });
                None
            }
        };
        regions.push(region.clone().with_match(record));
    }

    log::info!(
        "matched {matched}/{} {} regions to {} regions",
        source.len(),
        source.role(),
        index.collection().role()
    );

    (source.derive(source.role(), regions), warnings)
}

fn match_one(region: &Region, index: &RegionIndex<'_>) -> MatchOutcome {
    let area = match geometry::measure(&region.geometry) {
        Ok(area) => area,
        Err(reason) => return MatchOutcome::Degenerate(reason),
    };

    let mut best: Option<(usize, f64)> = None;
    for candidate in index.intersecting(&region.geometry) {
        let target = index.region(candidate);
        let overlap = geometry::intersection_area(&region.geometry, &target.geometry);
        let fraction = (overlap / area).clamp(0.0, 1.0);
        if best.map_or(true, |(_, f)| geometry::clearly_greater(fraction, f)) {
            best = Some((candidate, fraction));
        }
    }

    match best {
        Some((i, overlap_fraction)) => MatchOutcome::Matched(MatchRecord {
            matched_region_id: index.region(i).id.clone(),
            overlap_fraction,
        }),
        None => MatchOutcome::Unmatched,
    }
}
