use std::collections::HashSet;

use geo::{MultiPolygon, Polygon};
use serde::Serialize;

use crate::crs::Crs;
use crate::diagnostics::Diagnostics;
use crate::error::ReconError;
use crate::grid::{GridComparison, GridSummary};

/// Opaque per-region attribute fields carried through from the source file.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Which part a boundary collection plays in a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The official boundary set everything is reconciled onto.
    Reference,
    /// The independently sourced boundary set being corrected.
    Candidate,
    /// Candidate regions after clipping and sliver merging.
    Corrected,
    /// Auxiliary comparison grid (hex cells).
    Grid,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Candidate => write!(f, "candidate"),
            Self::Corrected => write!(f, "corrected"),
            Self::Grid => write!(f, "grid"),
        }
    }
}

// ---------------------------------------------------------------------------
// Regions + collections
// ---------------------------------------------------------------------------

/// Best-overlapping counterpart of a region in the other collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub matched_region_id: String,
    /// Fraction of this region's own area covered by the counterpart, in `[0, 1]`.
    pub overlap_fraction: f64,
}

/// A single administrative polygon with its identifier and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    pub attributes: Attributes,
    /// Set by the region matcher; `None` before matching or when unmatched.
    pub match_record: Option<MatchRecord>,
}

impl Region {
    pub fn new(id: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.into(),
            attributes: Attributes::new(),
            match_record: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_match(mut self, record: Option<MatchRecord>) -> Self {
        self.match_record = record;
        self
    }

    pub fn with_geometry(mut self, geometry: MultiPolygon<f64>) -> Self {
        self.geometry = geometry;
        self
    }
}

/// Ordered regions sharing one CRS. Region ids are unique within a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCollection {
    role: Role,
    crs: Crs,
    regions: Vec<Region>,
}

impl BoundaryCollection {
    pub fn new(role: Role, crs: Crs, regions: Vec<Region>) -> Result<Self, ReconError> {
        let mut seen = HashSet::with_capacity(regions.len());
        for region in &regions {
            if !seen.insert(region.id.as_str()) {
                return Err(ReconError::DuplicateRegionId {
                    role,
                    id: region.id.clone(),
                });
            }
        }
        Ok(Self { role, crs, regions })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }

    /// Rebuild under another role with new regions, keeping the CRS.
    ///
    /// Ids are not re-checked: callers derive `regions` one-to-one from `self`.
    pub(crate) fn derive(&self, role: Role, regions: Vec<Region>) -> Self {
        Self {
            role,
            crs: self.crs.clone(),
            regions,
        }
    }

    /// Fail with `CrsMismatch` unless `other` shares this collection's CRS.
    pub fn ensure_same_crs(&self, other: &BoundaryCollection) -> Result<(), ReconError> {
        if self.crs == other.crs {
            return Ok(());
        }
        Err(ReconError::CrsMismatch {
            left: self.role,
            left_crs: self.crs.clone(),
            right: other.role,
            right_crs: other.crs.clone(),
        })
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<(), ReconError> {
        if self.regions.is_empty() {
            return Err(ReconError::EmptyCollection(self.role));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Slivers
// ---------------------------------------------------------------------------

/// One connected component of `union(reference) − union(candidate)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sliver {
    pub id: usize,
    /// Stored in the source CRS; only the area is measured in a projection.
    pub geometry: Polygon<f64>,
    pub area_km2: f64,
}

/// Where a mergeable sliver goes. `None` when it touches no candidate region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliverAssignment {
    pub sliver_id: usize,
    pub target_region_id: Option<String>,
}

/// Slivers split by the merge threshold.
#[derive(Debug, Clone, Default)]
pub struct TriagedSlivers {
    /// `area_km2 <= threshold`: merged automatically.
    pub small: Vec<Sliver>,
    /// `area_km2 > threshold`: left for manual review.
    pub large: Vec<Sliver>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceSummary {
    pub reference_features: usize,
    pub candidate_features: usize,
    pub reference_area_km2: f64,
    pub candidate_area_km2: f64,
    /// `reference_area / candidate_area * 100`; `None` when the candidate has no area.
    pub coverage_percent: Option<f64>,
    /// Small and large slivers together.
    pub sliver_area_km2: f64,
    /// Area present in the candidate but absent from the reference.
    pub holes_area_km2: f64,
    pub small_slivers: usize,
    pub large_slivers: usize,
}

/// Pre-loaded collections for one reconciliation run.
pub struct ReconInput {
    pub reference: BoundaryCollection,
    pub candidate: BoundaryCollection,
    pub grid: Option<BoundaryCollection>,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: DifferenceSummary,
    /// Candidate regions with match records against the reference.
    pub matched_candidate: BoundaryCollection,
    pub small_slivers: Vec<Sliver>,
    /// One entry per small sliver, same order.
    pub assignments: Vec<SliverAssignment>,
    pub large_slivers: Vec<Sliver>,
    pub corrected: BoundaryCollection,
    pub grid: Option<GridComparison>,
    pub diagnostics: Diagnostics,
}

impl ReconResult {
    /// Target region for a small sliver, if it was assigned.
    pub fn target_of(&self, sliver_id: usize) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.sliver_id == sliver_id)
            .and_then(|a| a.target_region_id.as_deref())
    }

    /// The geometry-free part of the result, for JSON output.
    pub fn report(&self) -> ReconReport<'_> {
        ReconReport {
            meta: &self.meta,
            summary: &self.summary,
            assignments: &self.assignments,
            grid: self.grid.as_ref().map(|g| &g.summary),
            diagnostics: &self.diagnostics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub country: String,
    pub crs: Crs,
    pub merge_threshold_km2: f64,
    pub area_projection: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Serialize)]
pub struct ReconReport<'a> {
    pub meta: &'a ReconMeta,
    pub summary: &'a DifferenceSummary,
    pub assignments: &'a [SliverAssignment],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<&'a GridSummary>,
    pub diagnostics: &'a Diagnostics,
}
