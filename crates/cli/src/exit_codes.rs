//! CLI Exit Code Registry
//!
//! Single source of truth for `gbounds` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments)                          |
//! | 3    | Invalid config (parse, validation, unknown CRS)      |
//! | 4    | Input mismatch (CRS differs, empty or duplicate ids) |
//! | 5    | IO error (read, GeoJSON parse, write)                |
//! | 6    | Large slivers left for review (`--strict` only)      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`recon_exit_code`] or the command that raises it

use geobounds_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, e.g. a non-positive `--threshold`.
pub const EXIT_USAGE: u8 = 2;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Inputs cannot be reconciled as given: CRS mismatch, an empty collection,
/// or duplicate region ids.
pub const EXIT_INPUT_MISMATCH: u8 = 4;

/// Input could not be read or output could not be written.
pub const EXIT_IO: u8 = 5;

/// `--strict` run finished but left slivers above the merge threshold.
pub const EXIT_LARGE_SLIVERS: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) | ReconError::InvalidCrs(_) => {
            EXIT_INVALID_CONFIG
        }
        ReconError::CrsMismatch { .. }
        | ReconError::DeclaredCrs { .. }
        | ReconError::EmptyCollection(_)
        | ReconError::DuplicateRegionId { .. } => EXIT_INPUT_MISMATCH,
        ReconError::Io(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobounds_recon::{Crs, Role};

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INVALID_CONFIG,
            EXIT_INPUT_MISMATCH,
            EXIT_IO,
            EXIT_LARGE_SLIVERS,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn engine_errors_map_to_codes() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(recon_exit_code(&ReconError::InvalidCrs("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::EmptyCollection(Role::Candidate)),
            EXIT_INPUT_MISMATCH
        );
        assert_eq!(recon_exit_code(&ReconError::Io("x".into())), EXIT_IO);
        let declared = ReconError::DeclaredCrs {
            role: Role::Candidate,
            file: "c.geojson".into(),
            declared: Crs::parse("EPSG:3857").unwrap(),
            configured: Crs::wgs84(),
        };
        assert_eq!(recon_exit_code(&declared), EXIT_INPUT_MISMATCH);
    }
}
