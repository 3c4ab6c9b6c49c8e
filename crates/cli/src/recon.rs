//! `gbounds` subcommands: config-driven boundary reconciliation.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use geobounds_io::json::summary_json;
use geobounds_io::{write_outputs, GeoJsonFileSource, OutputOptions};
use geobounds_recon::source::{load_input, BoundarySource};
use geobounds_recon::{ReconConfig, ReconInput, ReconResult, Role};

use crate::exit_codes::{EXIT_ERROR, EXIT_LARGE_SLIVERS};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile the candidate bounds of a config onto its reference bounds
    #[command(after_help = "\
Examples:
  gbounds run ken.recon.toml
  gbounds run ken.recon.toml --threshold 50 --out build/KEN
  gbounds run ken.recon.toml --json > summary.json
  gbounds run ken.recon.toml --strict")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Merge threshold in km² (overrides triage.merge_threshold_km2)
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<f64>,

        /// Output folder (overrides output.dir)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the JSON summary to stdout
        #[arg(long)]
        json: bool,

        /// Exit 6 when slivers above the threshold are left for review
        #[arg(long)]
        strict: bool,
    },

    /// Validate a config without loading any boundaries
    #[command(after_help = "\
Examples:
  gbounds validate ken.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },

    /// Run without writing any files and print the difference summary
    #[command(after_help = "\
Examples:
  gbounds summary ken.recon.toml
  gbounds summary ken.recon.toml --threshold 10 --json")]
    Summary {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Merge threshold in km² (overrides triage.merge_threshold_km2)
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<f64>,

        /// Print the JSON summary to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, threshold, out, json, strict } => {
            cmd_run(config, threshold, out, json, strict)
        }
        ReconCommands::Validate { config } => cmd_validate(config),
        ReconCommands::Summary { config, threshold, json } => cmd_summary(config, threshold, json),
    }
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(
    config_path: PathBuf,
    threshold: Option<f64>,
    out: Option<PathBuf>,
    json_output: bool,
    strict: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path, threshold)?;
    let base_dir = base_dir(&config_path);

    let input = load_boundaries(&config, base_dir)?;
    let result = geobounds_recon::run(&config, &input)?;

    let out_dir = out.unwrap_or_else(|| default_out_dir(&config, base_dir));
    let written = write_outputs(&out_dir, &input, &result, OutputOptions::from(&config.output))?;

    if json_output {
        print_json(&result)?;
    }

    print_human_summary(&result);
    eprintln!("wrote {} files to {}", written.len(), out_dir.display());

    if strict && result.summary.large_slivers > 0 {
        return Err(CliError::new(
            EXIT_LARGE_SLIVERS,
            format!(
                "{} slivers above {} km² need manual review",
                result.summary.large_slivers, config.triage.merge_threshold_km2
            ),
        )
        .with_hint(format!(
            "see {} or raise --threshold",
            out_dir.join(geobounds_io::output::LARGE_SLIVERS).display()
        )));
    }

    Ok(())
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path, None)?;
    eprintln!(
        "config '{}' is valid ({}: reference {}, candidate {}{})",
        config.name,
        config.country,
        config.reference.crs,
        config.candidate.crs,
        if config.grid.is_some() { ", with grid" } else { "" },
    );
    Ok(())
}

// ============================================================================
// summary
// ============================================================================

fn cmd_summary(config_path: PathBuf, threshold: Option<f64>, json_output: bool) -> Result<(), CliError> {
    let config = load_config(&config_path, threshold)?;
    let input = load_boundaries(&config, base_dir(&config_path))?;
    let result = geobounds_recon::run(&config, &input)?;

    if json_output {
        return print_json(&result);
    }

    let s = &result.summary;
    println!("country:            {}", result.meta.country);
    println!("reference regions:  {}", s.reference_features);
    println!("candidate regions:  {}", s.candidate_features);
    println!("reference area:     {:.3} km²", s.reference_area_km2);
    println!("candidate area:     {:.3} km²", s.candidate_area_km2);
    match s.coverage_percent {
        Some(pct) => println!("coverage:           {pct:.2}%"),
        None => println!("coverage:           n/a"),
    }
    println!("sliver area:        {:.3} km²", s.sliver_area_km2);
    println!("holes area:         {:.3} km²", s.holes_area_km2);
    println!("small slivers:      {}", s.small_slivers);
    println!("large slivers:      {}", s.large_slivers);
    if let Some(grid) = &result.grid {
        println!(
            "grid cells:         {} ({} agree, {} disagree, {} unmatched)",
            grid.summary.cells, grid.summary.agreeing, grid.summary.disagreeing, grid.summary.unmatched
        );
    }
    Ok(())
}

// ============================================================================
// Shared
// ============================================================================

fn load_config(path: &Path, threshold: Option<f64>) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let mut config = ReconConfig::from_toml(&text)?;

    if let Some(threshold) = threshold {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(CliError::args(format!(
                "--threshold must be a positive number of km², got {threshold}"
            )));
        }
        config.triage.merge_threshold_km2 = threshold;
    }
    Ok(config)
}

/// Relative paths in a config resolve against the config file's folder.
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

fn load_boundaries(config: &ReconConfig, base_dir: &Path) -> Result<ReconInput, CliError> {
    let reference = GeoJsonFileSource::from_config(&config.reference, Role::Reference, base_dir);
    let candidate = GeoJsonFileSource::from_config(&config.candidate, Role::Candidate, base_dir);
    let grid = config
        .grid
        .as_ref()
        .map(|g| GeoJsonFileSource::from_config(g, Role::Grid, base_dir));

    Ok(load_input(
        &config.country,
        &reference,
        &candidate,
        grid.as_ref().map(|g| g as &dyn BoundarySource),
    )?)
}

/// `output.dir` from the config, else `out/<country>` next to the config.
fn default_out_dir(config: &ReconConfig, base_dir: &Path) -> PathBuf {
    match config.output_dir() {
        Some(dir) => base_dir.join(dir),
        None => base_dir.join("out").join(&config.country),
    }
}

fn print_json(result: &ReconResult) -> Result<(), CliError> {
    let json = summary_json(result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

fn print_human_summary(result: &ReconResult) {
    let s = &result.summary;
    let coverage = s
        .coverage_percent
        .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:.2}%"));
    eprintln!(
        "{}: {} reference / {} candidate regions, coverage {}",
        result.meta.country, s.reference_features, s.candidate_features, coverage,
    );

    let assigned = result
        .assignments
        .iter()
        .filter(|a| a.target_region_id.is_some())
        .count();
    eprintln!(
        "slivers: {} small ({} merged), {} large, {:.3} km² total; holes {:.3} km²",
        s.small_slivers, assigned, s.large_slivers, s.sliver_area_km2, s.holes_area_km2,
    );

    if let Some(grid) = &result.grid {
        let agreement = grid
            .summary
            .agreement_percent()
            .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:.1}%"));
        eprintln!(
            "grid: {} cells, {} agree, {} disagree, {} unmatched ({} agreement)",
            grid.summary.cells,
            grid.summary.agreeing,
            grid.summary.disagreeing,
            grid.summary.unmatched,
            agreement,
        );
    }

    let counts = result.diagnostics.counts();
    if !result.diagnostics.is_empty() {
        eprintln!(
            "warnings: {} unmatched regions, {} unassigned slivers, {} degenerate geometries",
            counts.unmatched_regions, counts.unassigned_slivers, counts.degenerate_geometries,
        );
    }
}
