use serde::Deserialize;

use crate::assign::DEFAULT_SLIVER_BUFFER;
use crate::correct::DEFAULT_SEAM_BUFFER;
use crate::crs::Crs;
use crate::error::ReconError;
use crate::projection::{AreaProjection, ProjectionKind};
use crate::triage::DEFAULT_MERGE_THRESHOLD_KM2;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    /// ISO3 code. Used for labels and the `{iso3}` output template.
    pub country: String,
    pub reference: SourceConfig,
    pub candidate: SourceConfig,
    #[serde(default)]
    pub triage: TriageConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub area: AreaConfig,
    /// Optional comparison grid (hex cells).
    #[serde(default)]
    pub grid: Option<SourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where one boundary collection comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Feature property holding the region identifier.
    pub id_field: String,
    /// Required. Collections are never assumed to be WGS84.
    pub crs: Crs,
}

// ---------------------------------------------------------------------------
// Triage + Tolerance + Area
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    #[serde(default = "default_threshold")]
    pub merge_threshold_km2: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_MERGE_THRESHOLD_KM2
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            merge_threshold_km2: DEFAULT_MERGE_THRESHOLD_KM2,
        }
    }
}

/// Buffers, in CRS units (degrees for geographic input).
#[derive(Debug, Clone, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_sliver_buffer")]
    pub sliver_buffer: f64,
    #[serde(default = "default_seam_buffer")]
    pub seam_buffer: f64,
}

fn default_sliver_buffer() -> f64 {
    DEFAULT_SLIVER_BUFFER
}

fn default_seam_buffer() -> f64 {
    DEFAULT_SEAM_BUFFER
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            sliver_buffer: DEFAULT_SLIVER_BUFFER,
            seam_buffer: DEFAULT_SEAM_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaConfig {
    #[serde(default)]
    pub projection: ProjectionKind,
    /// Required for `planar`, ignored otherwise.
    #[serde(default)]
    pub metres_per_unit: Option<f64>,
}

impl AreaConfig {
    pub fn projection(&self) -> Result<AreaProjection, ReconError> {
        Ok(match self.projection {
            ProjectionKind::Mollweide => AreaProjection::Mollweide,
            ProjectionKind::CylindricalEqualArea => AreaProjection::CylindricalEqualArea,
            ProjectionKind::WebMercator => AreaProjection::WebMercator,
            ProjectionKind::Planar => match self.metres_per_unit {
                Some(m) if m.is_finite() && m > 0.0 => AreaProjection::Planar { metres_per_unit: m },
                _ => {
                    return Err(ReconError::ConfigValidation(
                        "area.projection = \"planar\" requires a positive metres_per_unit".into(),
                    ))
                }
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output folder; `{iso3}` is replaced with the country code.
    #[serde(default)]
    pub dir: Option<String>,
    /// Write reference / candidate / corrected bounds.
    #[serde(default = "yes")]
    pub write_base: bool,
    /// Write small and large sliver files.
    #[serde(default = "yes")]
    pub write_slivers: bool,
}

fn yes() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            write_base: true,
            write_slivers: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }
        if self.country.trim().is_empty() {
            return Err(ReconError::ConfigValidation("country must not be empty".into()));
        }

        let mut sources = vec![("reference", &self.reference), ("candidate", &self.candidate)];
        if let Some(grid) = &self.grid {
            sources.push(("grid", grid));
        }
        for (section, source) in sources {
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[{section}] file must not be empty"
                )));
            }
            if source.id_field.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[{section}] id_field must not be empty"
                )));
            }
        }

        positive("triage.merge_threshold_km2", self.triage.merge_threshold_km2)?;
        positive("tolerance.sliver_buffer", self.tolerance.sliver_buffer)?;
        // Zero disables seam closing.
        if !(self.tolerance.seam_buffer.is_finite() && self.tolerance.seam_buffer >= 0.0) {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.seam_buffer must be >= 0, got {}",
                self.tolerance.seam_buffer
            )));
        }

        self.area.projection()?;
        Ok(())
    }

    /// Output folder with `{iso3}` expanded, if one is configured.
    pub fn output_dir(&self) -> Option<String> {
        self.output
            .dir
            .as_ref()
            .map(|dir| dir.replace("{iso3}", &self.country))
    }
}

fn positive(key: &str, value: f64) -> Result<(), ReconError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReconError::ConfigValidation(format!(
            "{key} must be a positive number, got {value}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
