use geo::{BooleanOps, MultiPolygon};

use crate::error::ReconError;
use crate::geometry;
use crate::model::{BoundaryCollection, DifferenceSummary, Sliver};
use crate::projection::AreaProjection;

/// Aggregate comparison of the two original collections.
///
/// Read-only; areas are km² under `projection`.
pub fn summarize(
    reference: &BoundaryCollection,
    candidate: &BoundaryCollection,
    small: &[Sliver],
    large: &[Sliver],
    projection: &AreaProjection,
) -> Result<DifferenceSummary, ReconError> {
    reference.ensure_same_crs(candidate)?;
    let reference_union = geometry::union_of(reference.regions().iter().map(|r| &r.geometry));
    let candidate_union = geometry::union_of(candidate.regions().iter().map(|r| &r.geometry));
    Ok(summarize_unions(
        (reference.len(), &reference_union),
        (candidate.len(), &candidate_union),
        small,
        large,
        projection,
    ))
}

/// [`summarize`] over precomputed `(feature count, union)` pairs.
pub fn summarize_unions(
    reference: (usize, &MultiPolygon<f64>),
    candidate: (usize, &MultiPolygon<f64>),
    small: &[Sliver],
    large: &[Sliver],
    projection: &AreaProjection,
) -> DifferenceSummary {
    let (reference_features, reference_union) = reference;
    let (candidate_features, candidate_union) = candidate;

    let reference_area_km2 = projection.area_km2(reference_union);
    let candidate_area_km2 = projection.area_km2(candidate_union);
    let coverage_percent =
        (candidate_area_km2 > 0.0).then(|| reference_area_km2 / candidate_area_km2 * 100.0);

    // `sum()` over no items yields -0.0.
    let sliver_area_km2 = small
        .iter()
        .chain(large)
        .fold(0.0, |acc, s| acc + s.area_km2);
    let holes_area_km2 = projection.area_km2(&candidate_union.difference(reference_union));

    DifferenceSummary {
        reference_features,
        candidate_features,
        reference_area_km2,
        candidate_area_km2,
        coverage_percent,
        sliver_area_km2,
        holes_area_km2,
        small_slivers: small.len(),
        large_slivers: large.len(),
    }
}
