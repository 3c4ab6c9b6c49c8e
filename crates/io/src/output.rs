// Run output folder

use std::path::{Path, PathBuf};

use geo::MultiPolygon;

use geobounds_recon::config::OutputConfig;
use geobounds_recon::model::{Attributes, ReconInput, ReconResult, Sliver};

use crate::features::{feature, write_collection, write_features};
use crate::IoError;

pub const REFERENCE_BOUNDS: &str = "reference_bounds.geojson";
pub const CANDIDATE_BOUNDS: &str = "candidate_bounds.geojson";
pub const CORRECTED_BOUNDS: &str = "corrected_bounds.geojson";
pub const SLIVERS: &str = "slivers.geojson";
pub const LARGE_SLIVERS: &str = "large_slivers.geojson";
pub const COMPARISON_GRID: &str = "comparison_grid.geojson";
pub const MATCHES_CSV: &str = "matches.csv";
pub const SLIVERS_CSV: &str = "slivers.csv";
pub const SUMMARY_JSON: &str = "summary.json";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Reference, candidate and corrected bounds.
    pub write_base: bool,
    /// Small and large sliver geometries.
    pub write_slivers: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            write_base: true,
            write_slivers: true,
        }
    }
}

impl From<&OutputConfig> for OutputOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            write_base: config.write_base,
            write_slivers: config.write_slivers,
        }
    }
}

/// Write every output of a run into `dir`, creating it if needed.
///
/// Tables and `summary.json` are always written. Returns the paths written, in
/// a fixed order.
pub fn write_outputs(
    dir: &Path,
    input: &ReconInput,
    result: &ReconResult,
    options: OutputOptions,
) -> Result<Vec<PathBuf>, IoError> {
    std::fs::create_dir_all(dir).map_err(|e| IoError::write(dir, e))?;
    let mut written = Vec::new();
    let mut target = |name: &str| {
        let path = dir.join(name);
        written.push(path.clone());
        path
    };

    if options.write_base {
        write_collection(&target(REFERENCE_BOUNDS), &input.reference)?;
        write_collection(&target(CANDIDATE_BOUNDS), &result.matched_candidate)?;
        write_collection(&target(CORRECTED_BOUNDS), &result.corrected)?;
    }

    if options.write_slivers {
        let small = result
            .small_slivers
            .iter()
            .map(|s| sliver_feature(s, result.target_of(s.id)))
            .collect();
        write_features(&target(SLIVERS), small)?;
        let large = result
            .large_slivers
            .iter()
            .map(|s| sliver_feature(s, None))
            .collect();
        write_features(&target(LARGE_SLIVERS), large)?;
    }

    if let (Some(cells), Some(comparison)) = (&input.grid, &result.grid) {
        let features = cells
            .regions()
            .iter()
            .zip(&comparison.cells)
            .map(|(cell, cmp)| {
                let mut properties = Attributes::new();
                properties.insert("cell_id".into(), cmp.cell_id.clone().into());
                properties.insert("reference_id".into(), cmp.reference_id.clone().into());
                properties.insert(
                    "candidate_match_id".into(),
                    cmp.candidate_match_id.clone().into(),
                );
                properties.insert("agrees".into(), cmp.agrees.into());
                feature(Some(cell.id.clone()), &cell.geometry, properties)
            })
            .collect();
        write_features(&target(COMPARISON_GRID), features)?;
    }

    crate::csv::write_matches(&target(MATCHES_CSV), &result.matched_candidate)?;
    crate::csv::write_slivers(&target(SLIVERS_CSV), result)?;
    crate::json::write_summary(&target(SUMMARY_JSON), result)?;

    log::info!("wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}

fn sliver_feature(sliver: &Sliver, target: Option<&str>) -> geojson::Feature {
    let mut properties = Attributes::new();
    properties.insert("sliver_id".into(), sliver.id.into());
    properties.insert("area_km2".into(), sliver.area_km2.into());
    properties.insert("target_id".into(), target.map(str::to_string).into());
    feature(
        None,
        &MultiPolygon::new(vec![sliver.geometry.clone()]),
        properties,
    )
}
