// File I/O operations

use std::fmt;
use std::path::{Path, PathBuf};

use geobounds_recon::{Crs, ReconError, Role};

pub mod csv;
pub mod features;
pub mod json;
pub mod output;
pub mod source;

pub use features::{load_collection, write_collection};
pub use output::{write_outputs, OutputOptions};
pub use source::GeoJsonFileSource;

#[derive(Debug)]
pub enum IoError {
    /// File could not be read.
    Read { path: PathBuf, source: std::io::Error },
    /// File or directory could not be written.
    Write { path: PathBuf, message: String },
    /// Not a valid GeoJSON FeatureCollection.
    GeoJson { path: PathBuf, message: String },
    /// A feature lacks the configured id property.
    MissingId { path: PathBuf, feature: usize, field: String },
    /// Only Polygon and MultiPolygon features are boundaries.
    UnsupportedGeometry { path: PathBuf, feature: usize, kind: String },
    /// The file declares a CRS other than the configured one.
    DeclaredCrs { path: PathBuf, role: Role, declared: Crs, configured: Crs },
    /// The loaded features don't form a valid collection.
    Collection(ReconError),
}

impl IoError {
    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
            Self::GeoJson { path, message } => {
                write!(f, "{}: invalid GeoJSON: {message}", path.display())
            }
            Self::MissingId { path, feature, field } => write!(
                f,
                "{}: feature {feature} has no '{field}' property",
                path.display()
            ),
            Self::UnsupportedGeometry { path, feature, kind } => write!(
                f,
                "{}: feature {feature} is a {kind}, expected Polygon or MultiPolygon",
                path.display()
            ),
            Self::DeclaredCrs {
                path,
                role,
                declared,
                configured,
            } => write!(
                f,
                "{}: {role} file declares CRS {declared} but config says {configured}",
                path.display()
            ),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Collection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReconError> for IoError {
    fn from(err: ReconError) -> Self {
        Self::Collection(err)
    }
}

impl From<IoError> for ReconError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Collection(inner) => inner,
            IoError::DeclaredCrs {
                path,
                role,
                declared,
                configured,
            } => ReconError::DeclaredCrs {
                role,
                file: path.display().to_string(),
                declared,
                configured,
            },
            other => ReconError::Io(other.to_string()),
        }
    }
}
