//! Non-fatal, per-entity problems found during a run.
//!
//! One bad region or sliver never aborts the collection. Each problem is
//! logged once and kept here so callers can count and report it.

use std::fmt;

use serde::Serialize;

use crate::geometry::Degeneracy;
use crate::model::Role;

/// The entity a warning is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Region { role: Role, id: String },
    /// Index of the component in the difference's decomposition.
    SliverComponent { index: usize },
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region { role, id } => write!(f, "{role} region '{id}'"),
            Self::SliverComponent { index } => write!(f, "sliver component {index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconWarning {
    /// A source region intersects nothing in the target collection.
    UnmatchedRegion { role: Role, region_id: String },
    /// A mergeable sliver touches no candidate region; it stays unmerged.
    UnassignedSliver { sliver_id: usize },
    /// Zero or invalid area; skipped from area-based computations.
    DegenerateGeometry { entity: Entity, reason: Degeneracy },
}

impl fmt::Display for ReconWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedRegion { role, region_id } => {
                write!(f, "{role} region '{region_id}' intersects no counterpart region")
            }
            Self::UnassignedSliver { sliver_id } => {
                write!(f, "sliver {sliver_id} does not intersect any candidate region")
            }
            Self::DegenerateGeometry { entity, reason } => {
                write!(f, "{entity} skipped: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub warnings: Vec<ReconWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticCounts {
    pub unmatched_regions: usize,
    pub unassigned_slivers: usize,
    pub degenerate_geometries: usize,
}

impl Diagnostics {
    pub fn push(&mut self, warning: ReconWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn counts(&self) -> DiagnosticCounts {
        let mut counts = DiagnosticCounts::default();
        for w in &self.warnings {
            match w {
                ReconWarning::UnmatchedRegion { .. } => counts.unmatched_regions += 1,
                ReconWarning::UnassignedSliver { .. } => counts.unassigned_slivers += 1,
                ReconWarning::DegenerateGeometry { .. } => counts.degenerate_geometries += 1,
            }
        }
        counts
    }

    pub fn unassigned_sliver_ids(&self) -> Vec<usize> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                ReconWarning::UnassignedSliver { sliver_id } => Some(*sliver_id),
                _ => None,
            })
            .collect()
    }
}
