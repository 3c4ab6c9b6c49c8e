//! `geobounds-recon`: administrative boundary reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded boundary collections, returns matched,
//! triaged and corrected results. No CLI or IO dependencies.

mod batch;

pub mod assign;
pub mod config;
pub mod correct;
pub mod crs;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod index;
pub mod matcher;
pub mod model;
pub mod projection;
pub mod sliver;
pub mod source;
pub mod summary;
pub mod triage;

pub use config::ReconConfig;
pub use crs::Crs;
pub use diagnostics::{Diagnostics, ReconWarning};
pub use engine::run;
pub use error::ReconError;
pub use model::{
    BoundaryCollection, DifferenceSummary, MatchRecord, ReconInput, ReconResult, Region, Role,
    Sliver, SliverAssignment,
};
pub use projection::AreaProjection;
