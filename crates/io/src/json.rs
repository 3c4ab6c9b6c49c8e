// JSON run report

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geobounds_recon::model::ReconResult;

use crate::IoError;

/// Write meta, summary, assignments, grid summary and diagnostics.
pub fn write_summary(path: &Path, result: &ReconResult) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &result.report())
        .map_err(|e| IoError::write(path, e))
}

/// The same report as a pretty JSON string, for stdout.
pub fn summary_json(result: &ReconResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&result.report())
}
