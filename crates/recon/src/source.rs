//! Seams for boundary data the engine does not produce itself.

use crate::error::ReconError;
use crate::model::{BoundaryCollection, ReconInput};

/// Something that can hand over a country's boundaries, e.g. a file on disk
/// or a download. Implementations tag the collection with its role and CRS.
pub trait BoundarySource {
    fn fetch(&self, country: &str) -> Result<BoundaryCollection, ReconError>;
}

/// An already-loaded collection, returned as-is for any country.
impl BoundarySource for BoundaryCollection {
    fn fetch(&self, _country: &str) -> Result<BoundaryCollection, ReconError> {
        Ok(self.clone())
    }
}

/// Fetch reference, candidate and optional grid for `country`.
pub fn load_input(
    country: &str,
    reference: &dyn BoundarySource,
    candidate: &dyn BoundarySource,
    grid: Option<&dyn BoundarySource>,
) -> Result<ReconInput, ReconError> {
    let reference = reference.fetch(country)?;
    let candidate = candidate.fetch(country)?;
    let grid = grid.map(|g| g.fetch(country)).transpose()?;
    log::debug!(
        "{country}: loaded {} reference, {} candidate, {} grid regions",
        reference.len(),
        candidate.len(),
        grid.as_ref().map_or(0, BoundaryCollection::len)
    );
    Ok(ReconInput {
        reference,
        candidate,
        grid,
    })
}
