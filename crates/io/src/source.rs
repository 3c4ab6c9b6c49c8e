// File-backed boundary sources

use std::path::{Path, PathBuf};

use geobounds_recon::config::SourceConfig;
use geobounds_recon::model::{BoundaryCollection, Role};
use geobounds_recon::source::BoundarySource;
use geobounds_recon::{Crs, ReconError};

use crate::features::load_collection;

/// A GeoJSON file on disk. The file name may contain `{iso3}`, replaced with
/// the country being fetched.
#[derive(Debug, Clone)]
pub struct GeoJsonFileSource {
    pub path: PathBuf,
    pub role: Role,
    pub id_field: String,
    pub crs: Crs,
}

impl GeoJsonFileSource {
    /// Source for a config section; relative paths resolve against `base_dir`.
    pub fn from_config(config: &SourceConfig, role: Role, base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(&config.file),
            role,
            id_field: config.id_field.clone(),
            crs: config.crs.clone(),
        }
    }

    fn path_for(&self, country: &str) -> PathBuf {
        PathBuf::from(self.path.to_string_lossy().replace("{iso3}", country))
    }
}

impl BoundarySource for GeoJsonFileSource {
    fn fetch(&self, country: &str) -> Result<BoundaryCollection, ReconError> {
        Ok(load_collection(
            &self.path_for(country),
            self.role,
            &self.id_field,
            &self.crs,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SQUARE: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"shapeID":"KEN-1"},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}]}"#;

    #[test]
    fn expands_country_in_file_name() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("KEN_adm2.geojson"), SQUARE).unwrap();

        let config = SourceConfig {
            file: "{iso3}_adm2.geojson".into(),
            id_field: "shapeID".into(),
            crs: Crs::wgs84(),
        };
        let source = GeoJsonFileSource::from_config(&config, Role::Candidate, dir.path());
        let c = source.fetch("KEN").unwrap();
        assert_eq!(c.role(), Role::Candidate);
        assert_eq!(c.regions()[0].id, "KEN-1");

        let err = source.fetch("UGA").unwrap_err();
        assert!(matches!(err, ReconError::Io(_)));
    }

    #[test]
    fn declared_crs_conflict_is_an_input_mismatch() {
        let dir = tempdir().unwrap();
        let declared = SQUARE.replacen(
            r#""type":"FeatureCollection","#,
            r#""type":"FeatureCollection","crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::3857"}},"#,
            1,
        );
        std::fs::write(dir.path().join("KEN.geojson"), declared).unwrap();

        let config = SourceConfig {
            file: "{iso3}.geojson".into(),
            id_field: "shapeID".into(),
            crs: Crs::wgs84(),
        };
        let source = GeoJsonFileSource::from_config(&config, Role::Candidate, dir.path());
        match source.fetch("KEN").unwrap_err() {
            ReconError::DeclaredCrs {
                role,
                declared,
                configured,
                ..
            } => {
                assert_eq!(role, Role::Candidate);
                assert_eq!(declared.as_str(), "EPSG:3857");
                assert_eq!(configured, Crs::wgs84());
            }
            other => panic!("expected DeclaredCrs, got {other:?}"),
        }
    }
}
