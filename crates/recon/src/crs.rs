use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Coordinate reference system, identified by a normalized `AUTHORITY:CODE` string.
///
/// No reprojection happens anywhere in the engine. Two collections are comparable
/// only when their `Crs` values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs(String);

const WGS84: &str = "EPSG:4326";

/// Geographic (lon/lat degree) systems commonly seen in boundary files.
const GEOGRAPHIC: &[&str] = &["EPSG:4326", "EPSG:4269", "EPSG:4258", "EPSG:4674"];

impl Crs {
    pub fn wgs84() -> Self {
        Self(WGS84.to_string())
    }

    pub fn parse(input: &str) -> Result<Self, ReconError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReconError::InvalidCrs(input.to_string()));
        }

        // OGC URNs: urn:ogc:def:crs:EPSG::4326, urn:ogc:def:crs:OGC:1.3:CRS84
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("urn:ogc:def:crs:") {
            let parts: Vec<&str> = trimmed.split(':').collect();
            let authority = parts.get(4).copied().unwrap_or("");
            let code = parts.last().copied().unwrap_or("");
            return Self::from_parts(authority, code, input);
        }

        match trimmed.split_once(':') {
            Some((authority, code)) => Self::from_parts(authority, code, input),
            None if lowered == "crs84" => Ok(Self::wgs84()),
            None => Err(ReconError::InvalidCrs(input.to_string())),
        }
    }

    fn from_parts(authority: &str, code: &str, original: &str) -> Result<Self, ReconError> {
        let authority = authority.trim().to_ascii_uppercase();
        let code = code.trim();
        if authority.is_empty()
            || code.is_empty()
            || !authority.chars().all(|c| c.is_ascii_alphanumeric())
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ReconError::InvalidCrs(original.to_string()));
        }
        if authority == "OGC" && code.eq_ignore_ascii_case("CRS84") {
            return Ok(Self::wgs84());
        }
        Ok(Self(format!("{authority}:{}", code.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for lon/lat systems whose units are degrees.
    pub fn is_geographic(&self) -> bool {
        GEOGRAPHIC.contains(&self.0.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Crs {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Crs {
    type Error = ReconError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let crs = Crs::parse(" epsg:4326 ").unwrap();
        assert_eq!(crs.as_str(), "EPSG:4326");
        assert!(crs.is_geographic());
    }

    #[test]
    fn crs84_aliases_resolve_to_wgs84() {
        assert_eq!(Crs::parse("OGC:CRS84").unwrap(), Crs::wgs84());
        assert_eq!(Crs::parse("CRS84").unwrap(), Crs::wgs84());
        assert_eq!(
            Crs::parse("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            Crs::wgs84()
        );
    }

    #[test]
    fn ogc_urn_with_epsg_code() {
        let crs = Crs::parse("urn:ogc:def:crs:EPSG::3857").unwrap();
        assert_eq!(crs.as_str(), "EPSG:3857");
        assert!(!crs.is_geographic());
    }

    #[test]
    fn esri_codes_are_kept() {
        let crs = Crs::parse("esri:54009").unwrap();
        assert_eq!(crs.to_string(), "ESRI:54009");
    }

    #[test]
    fn rejects_malformed() {
        assert!(Crs::parse("").is_err());
        assert!(Crs::parse("4326").is_err());
        assert!(Crs::parse("EPSG:").is_err());
        assert!(Crs::parse("EPSG:43 26").is_err());
    }

    #[test]
    fn deserializes_from_string() {
        #[derive(Deserialize)]
        struct Probe {
            crs: Crs,
        }
        let probe: Probe = toml::from_str(r#"crs = "epsg:32637""#).unwrap();
        assert_eq!(probe.crs.as_str(), "EPSG:32637");

        let bad = toml::from_str::<Probe>(r#"crs = "nonsense""#);
        assert!(bad.is_err());
    }
}
