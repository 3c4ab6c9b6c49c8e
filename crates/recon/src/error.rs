use std::fmt;

use crate::crs::Crs;
use crate::model::Role;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, missing id field, etc.).
    ConfigValidation(String),
    /// A CRS string that is not `AUTHORITY:CODE` or a known alias.
    InvalidCrs(String),
    /// Two collections compared against each other use different CRSs.
    CrsMismatch {
        left: Role,
        left_crs: Crs,
        right: Role,
        right_crs: Crs,
    },
    /// A boundary file declares a CRS other than the one configured for it.
    DeclaredCrs {
        role: Role,
        file: String,
        declared: Crs,
        configured: Crs,
    },
    /// An input collection has no regions.
    EmptyCollection(Role),
    /// Region identifiers must be unique within a collection.
    DuplicateRegionId { role: Role, id: String },
    /// IO error (file read, GeoJSON parse, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidCrs(value) => {
                write!(f, "invalid CRS '{value}' (expected AUTHORITY:CODE, e.g. EPSG:4326)")
            }
            Self::CrsMismatch {
                left,
                left_crs,
                right,
                right_crs,
            } => write!(
                f,
                "input mismatch: {left} bounds use {left_crs} but {right} bounds use {right_crs}"
            ),
            Self::DeclaredCrs {
                role,
                file,
                declared,
                configured,
            } => write!(
                f,
                "input mismatch: {role} file {file} declares {declared} but the config says {configured}"
            ),
            Self::EmptyCollection(role) => write!(f, "{role} bounds contain no regions"),
            Self::DuplicateRegionId { role, id } => {
                write!(f, "{role} bounds: duplicate region id '{id}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_names_both_sides() {
        let err = ReconError::CrsMismatch {
            left: Role::Reference,
            left_crs: Crs::wgs84(),
            right: Role::Candidate,
            right_crs: "EPSG:3857".parse().unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("reference bounds use EPSG:4326"));
        assert!(msg.contains("candidate bounds use EPSG:3857"));
    }
}
