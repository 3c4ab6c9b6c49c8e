// CSV tables: region matches and slivers

use std::path::Path;

use serde::Serialize;

use geobounds_recon::model::{BoundaryCollection, ReconResult, Sliver};

use crate::IoError;

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    region_id: &'a str,
    matched_region_id: Option<&'a str>,
    overlap_fraction: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SliverRow<'a> {
    sliver_id: usize,
    area_km2: f64,
    class: &'static str,
    target_region_id: Option<&'a str>,
}

/// One row per region; unmatched regions have empty match columns.
pub fn write_matches(path: &Path, collection: &BoundaryCollection) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| IoError::write(path, e))?;
    for region in collection.regions() {
        let record = region.match_record.as_ref();
        writer
            .serialize(MatchRow {
                region_id: &region.id,
                matched_region_id: record.map(|m| m.matched_region_id.as_str()),
                overlap_fraction: record.map(|m| m.overlap_fraction),
            })
            .map_err(|e| IoError::write(path, e))?;
    }
    writer.flush().map_err(|e| IoError::write(path, e))
}

/// Small slivers with their targets, then large slivers (never assigned).
pub fn write_slivers(path: &Path, result: &ReconResult) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| IoError::write(path, e))?;
    let rows = result
        .small_slivers
        .iter()
        .map(|s| sliver_row(s, "small", result.target_of(s.id)))
        .chain(result.large_slivers.iter().map(|s| sliver_row(s, "large", None)));
    for row in rows {
        writer.serialize(row).map_err(|e| IoError::write(path, e))?;
    }
    writer.flush().map_err(|e| IoError::write(path, e))
}

fn sliver_row<'a>(sliver: &Sliver, class: &'static str, target: Option<&'a str>) -> SliverRow<'a> {
    SliverRow {
        sliver_id: sliver.id,
        area_km2: sliver.area_km2,
        class,
        target_region_id: target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Rect;
    use geobounds_recon::model::{MatchRecord, Region, Role};
    use geobounds_recon::Crs;
    use tempfile::tempdir;

    #[test]
    fn matches_csv_has_blank_cells_for_unmatched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        let square = |id: &str| Region::new(id, Rect::new((0.0, 0.0), (1.0, 1.0)).to_polygon());
        let c = BoundaryCollection::new(
            Role::Candidate,
            Crs::wgs84(),
            vec![
                square("a").with_match(Some(MatchRecord {
                    matched_region_id: "R1".into(),
                    overlap_fraction: 0.75,
                })),
                square("b"),
            ],
        )
        .unwrap();

        write_matches(&path, &c).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "region_id,matched_region_id,overlap_fraction");
        assert_eq!(lines[1], "a,R1,0.75");
        assert_eq!(lines[2], "b,,");
    }
}
