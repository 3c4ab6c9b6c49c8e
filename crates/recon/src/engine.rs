use crate::assign::assign_against;
use crate::config::ReconConfig;
use crate::correct::correct_with_union;
use crate::diagnostics::Diagnostics;
use crate::error::ReconError;
use crate::geometry;
use crate::grid;
use crate::index::RegionIndex;
use crate::matcher::match_against;
use crate::model::{ReconInput, ReconMeta, ReconResult};
use crate::projection::AreaProjection;
use crate::sliver::slivers_between;
use crate::summary::summarize_unions;
use crate::triage::triage;

/// Run one reconciliation per config over pre-loaded collections.
///
/// Collection-level problems (empty input, CRS mismatch) abort the run.
/// Per-region and per-sliver problems end up in `ReconResult::diagnostics`.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let reference = &input.reference;
    let candidate = &input.candidate;

    reference.ensure_not_empty()?;
    candidate.ensure_not_empty()?;
    reference.ensure_same_crs(candidate)?;
    if let Some(grid) = &input.grid {
        reference.ensure_same_crs(grid)?;
    }

    let projection = config.area.projection()?;
    if !matches!(projection, AreaProjection::Planar { .. }) && !reference.crs().is_geographic() {
        log::warn!(
            "{projection} area projection expects lon/lat input, but bounds use {}",
            reference.crs()
        );
    }

    log::info!(
        "{}: reconciling {} candidate regions against {} reference regions",
        config.country,
        candidate.len(),
        reference.len()
    );

    let mut diagnostics = Diagnostics::default();

    let reference_index = RegionIndex::build(reference, &mut diagnostics);
    let matched = match_against(candidate, &reference_index);
    diagnostics.extend(matched.diagnostics);
    let matched_candidate = matched.collection;

    let reference_union = geometry::union_of(reference.regions().iter().map(|r| &r.geometry));
    let candidate_union = geometry::union_of(candidate.regions().iter().map(|r| &r.geometry));

    let extraction = slivers_between(&reference_union, &candidate_union, &projection);
    diagnostics.extend(extraction.diagnostics);
    let triaged = triage(extraction.slivers, config.triage.merge_threshold_km2);

    // Degenerate candidate regions were already reported by the matcher.
    let candidate_index = RegionIndex::build(&matched_candidate, &mut Diagnostics::default());
    let assigned = assign_against(&triaged.small, &candidate_index, config.tolerance.sliver_buffer);
    diagnostics.extend(assigned.diagnostics);

    let corrected = correct_with_union(
        &matched_candidate,
        &reference_union,
        &triaged.small,
        &assigned.assignments,
        config.tolerance.seam_buffer,
    );

    let summary = summarize_unions(
        (reference.len(), &reference_union),
        (candidate.len(), &candidate_union),
        &triaged.small,
        &triaged.large,
        &projection,
    );
    match summary.coverage_percent {
        Some(pct) => log::info!(
            "{}: total area of reference bounds is {pct:.2}% of candidate bounds",
            config.country
        ),
        None => log::warn!("{}: candidate bounds have no measurable area", config.country),
    }

    let grid = input.grid.as_ref().map(|cells| {
        grid::compare_with(cells, &reference_index, &candidate_index, &mut diagnostics)
    });

    let counts = diagnostics.counts();
    if !diagnostics.is_empty() {
        log::info!(
            "{}: {} unmatched regions, {} unassigned slivers, {} degenerate geometries",
            config.country,
            counts.unmatched_regions,
            counts.unassigned_slivers,
            counts.degenerate_geometries
        );
    }

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            country: config.country.clone(),
            crs: reference.crs().clone(),
            merge_threshold_km2: config.triage.merge_threshold_km2,
            area_projection: projection.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        matched_candidate,
        small_slivers: triaged.small,
        assignments: assigned.assignments,
        large_slivers: triaged.large,
        corrected,
        grid,
        diagnostics,
    })
}
