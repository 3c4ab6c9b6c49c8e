use crate::model::{Sliver, TriagedSlivers};

/// Canonical merge threshold when a config doesn't set one.
pub const DEFAULT_MERGE_THRESHOLD_KM2: f64 = 100.0;

/// Split slivers at `threshold_km2`.
///
/// `area_km2 <= threshold_km2` is small (merged automatically); anything larger
/// is left for manual review. Input order is kept within each side.
pub fn triage(slivers: Vec<Sliver>, threshold_km2: f64) -> TriagedSlivers {
    let (small, large): (Vec<Sliver>, Vec<Sliver>) = slivers
        .into_iter()
        .partition(|s| s.area_km2 <= threshold_km2);

    log::info!(
        "triage at {threshold_km2} km²: {} small, {} large",
        small.len(),
        large.len()
    );
    for s in &large {
        log::debug!("sliver {} ({:.3} km²) needs manual review", s.id, s.area_km2);
    }

    TriagedSlivers { small, large }
}
