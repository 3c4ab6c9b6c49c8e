//! Agreement check on an external comparison grid (typically hex cells).
//!
//! Every cell is matched to a reference region and to a candidate region. The
//! cell agrees when the candidate region it falls in was itself matched to the
//! same reference region the cell falls in.

use serde::Serialize;

use crate::diagnostics::{Diagnostics, ReconWarning};
use crate::error::ReconError;
use crate::index::RegionIndex;
use crate::matcher;
use crate::model::BoundaryCollection;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCellComparison {
    pub cell_id: String,
    /// Reference region covering most of the cell.
    pub reference_id: Option<String>,
    /// Reference region that the cell's best candidate region was matched to.
    pub candidate_match_id: Option<String>,
    pub agrees: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridSummary {
    pub cells: usize,
    pub agreeing: usize,
    /// Both ids known but different.
    pub disagreeing: usize,
    /// Either id missing.
    pub unmatched: usize,
}

impl GridSummary {
    /// Share of fully matched cells that agree, in percent.
    pub fn agreement_percent(&self) -> Option<f64> {
        let matched = self.agreeing + self.disagreeing;
        (matched > 0).then(|| self.agreeing as f64 / matched as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridComparison {
    pub cells: Vec<GridCellComparison>,
    pub summary: GridSummary,
}

/// Compare `grid` cells against the reference and the matched candidate.
///
/// `matched_candidate` must carry match records from the candidate→reference
/// pass; regions without one count as unmatched.
pub fn compare_grid(
    grid: &BoundaryCollection,
    reference: &BoundaryCollection,
    matched_candidate: &BoundaryCollection,
) -> Result<(GridComparison, Diagnostics), ReconError> {
    grid.ensure_same_crs(reference)?;
    grid.ensure_same_crs(matched_candidate)?;

    let mut diagnostics = Diagnostics::default();
    let reference_index = RegionIndex::build(reference, &mut diagnostics);
    let candidate_index = RegionIndex::build(matched_candidate, &mut diagnostics);
    let comparison = compare_with(grid, &reference_index, &candidate_index, &mut diagnostics);
    Ok((comparison, diagnostics))
}

/// [`compare_grid`] over prebuilt indexes.
///
/// Cells falling outside either collection are expected near borders; they are
/// counted in [`GridSummary::unmatched`] rather than reported as warnings.
pub fn compare_with(
    grid: &BoundaryCollection,
    reference_index: &RegionIndex<'_>,
    candidate_index: &RegionIndex<'_>,
    diagnostics: &mut Diagnostics,
) -> GridComparison {
    let (to_reference, reference_warnings) = matcher::match_records(grid, reference_index);
    let (to_candidate, _) = matcher::match_records(grid, candidate_index);

    // Degenerate cells are reported once; cells outside a footprint only count.
    for warning in reference_warnings
        .into_iter()
        .filter(|w| !matches!(w, ReconWarning::UnmatchedRegion { .. }))
    {
        diagnostics.push(warning);
    }

    let mut summary = GridSummary::default();
    let cells: Vec<GridCellComparison> = to_reference
        .regions()
        .iter()
        .zip(to_candidate.regions())
        .map(|(by_reference, by_candidate)| {
            let reference_id = by_reference
                .match_record
                .as_ref()
                .map(|m| m.matched_region_id.clone());
            let candidate_match_id = by_candidate
                .match_record
                .as_ref()
                .and_then(|m| candidate_index.collection().get(&m.matched_region_id))
                .and_then(|c| c.match_record.as_ref())
                .map(|m| m.matched_region_id.clone());

            let agrees = match (&reference_id, &candidate_match_id) {
                (Some(r), Some(c)) if r == c => {
                    summary.agreeing += 1;
                    true
                }
                (Some(_), Some(_)) => {
                    summary.disagreeing += 1;
                    false
                }
                _ => {
                    summary.unmatched += 1;
                    false
                }
            };

            GridCellComparison {
                cell_id: by_reference.id.clone(),
                reference_id,
                candidate_match_id,
                agrees,
            }
        })
        .collect();
    summary.cells = cells.len();

    log::info!(
        "grid: {}/{} cells agree ({} disagree, {} unmatched)",
        summary.agreeing,
        summary.cells,
        summary.disagreeing,
        summary.unmatched
    );

    GridComparison { cells, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::Crs;
    use crate::model::{MatchRecord, Region, Role};
    use geo::Rect;
    use std::sync::Mutex;

    /// Records every log message emitted while the tests run.
    struct CapturedLog(Mutex<Vec<String>>);

    impl log::Log for CapturedLog {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            self.0.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    static LOG: CapturedLog = CapturedLog(Mutex::new(Vec::new()));

    fn captured_log() -> &'static CapturedLog {
        let _ = log::set_logger(&LOG);
        log::set_max_level(log::LevelFilter::Warn);
        &LOG
    }

    fn rect(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::new(id, Rect::new((x0, y0), (x1, y1)).to_polygon())
    }

    fn collection(role: Role, regions: Vec<Region>) -> BoundaryCollection {
        BoundaryCollection::new(role, Crs::wgs84(), regions).unwrap()
    }

    fn matched(region: Region, target: &str) -> Region {
        region.with_match(Some(MatchRecord {
            matched_region_id: target.into(),
            overlap_fraction: 1.0,
        }))
    }

    fn cells() -> BoundaryCollection {
        collection(
            Role::Grid,
            vec![
                rect("left", 0.0, 0.0, 1.0, 1.0),
                rect("right", 3.0, 0.0, 4.0, 1.0),
                rect("outside", 20.0, 20.0, 21.0, 21.0),
            ],
        )
    }

    #[test]
    fn agreeing_and_disagreeing_cells() {
        let reference = collection(
            Role::Reference,
            vec![rect("R1", 0.0, 0.0, 2.0, 2.0), rect("R2", 2.0, 0.0, 4.0, 2.0)],
        );
        // "B" covers the right cell but was matched to R1.
        let candidate = collection(
            Role::Candidate,
            vec![
                matched(rect("A", 0.0, 0.0, 2.0, 2.0), "R1"),
                matched(rect("B", 2.0, 0.0, 4.0, 2.0), "R1"),
            ],
        );

        let (cmp, diagnostics) = compare_grid(&cells(), &reference, &candidate).unwrap();
        assert_eq!(cmp.cells.len(), 3);
        assert!(cmp.cells[0].agrees);
        assert_eq!(cmp.cells[1].reference_id.as_deref(), Some("R2"));
        assert_eq!(cmp.cells[1].candidate_match_id.as_deref(), Some("R1"));
        assert!(!cmp.cells[1].agrees);
        assert_eq!(cmp.cells[2].reference_id, None);
        assert_eq!(
            cmp.summary,
            GridSummary {
                cells: 3,
                agreeing: 1,
                disagreeing: 1,
                unmatched: 1,
            }
        );
        assert_eq!(cmp.summary.agreement_percent(), Some(50.0));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn candidate_without_match_record_is_unmatched() {
        let reference = collection(Role::Reference, vec![rect("R1", 0.0, 0.0, 4.0, 2.0)]);
        let candidate = collection(Role::Candidate, vec![rect("A", 0.0, 0.0, 4.0, 2.0)]);
        let (cmp, _) = compare_grid(&cells(), &reference, &candidate).unwrap();
        assert_eq!(cmp.summary.agreeing, 0);
        assert_eq!(cmp.summary.unmatched, 3);
        assert_eq!(cmp.summary.agreement_percent(), None);
    }

    #[test]
    fn cells_outside_the_footprint_are_not_logged() {
        let log = captured_log();
        let grid = collection(Role::Grid, vec![rect("far-away-cell", 50.0, 50.0, 51.0, 51.0)]);
        let reference = collection(Role::Reference, vec![rect("R1", 0.0, 0.0, 4.0, 2.0)]);
        let candidate = collection(
            Role::Candidate,
            vec![matched(rect("A", 0.0, 0.0, 4.0, 2.0), "R1")],
        );

        let (cmp, diagnostics) = compare_grid(&grid, &reference, &candidate).unwrap();
        assert_eq!(cmp.summary.unmatched, 1);
        assert!(diagnostics.is_empty());
        assert!(
            !log.0.lock().unwrap().iter().any(|m| m.contains("far-away-cell")),
            "unmatched grid cell was logged"
        );
    }
}
