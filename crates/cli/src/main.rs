// gbounds - administrative boundary reconciliation from the command line

mod exit_codes;
mod logging;
mod recon;

use std::process::ExitCode;

use clap::Parser;

use exit_codes::{recon_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use recon::ReconCommands;

#[derive(Parser)]
#[command(name = "gbounds")]
#[command(about = "Reconcile a candidate boundary set against a reference set")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: ReconCommands,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\nengine:  geobounds-recon ",
        env!("CARGO_PKG_VERSION"),
        "\ntarget:  ",
        env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match recon::cmd_recon(cli.command) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    /// Error from the engine, with the registry exit code and a hint where
    /// the fix is usually the same.
    pub fn recon(err: geobounds_recon::ReconError) -> Self {
        use geobounds_recon::ReconError;

        let hint = match &err {
            ReconError::CrsMismatch { .. } => {
                Some("reproject one input so both use the same CRS; gbounds does not reproject")
            }
            ReconError::DeclaredCrs { .. } => {
                Some("set crs in the config to what the file declares, or re-export the file")
            }
            ReconError::InvalidCrs(_) => Some("use an authority code such as EPSG:4326 or ESRI:54009"),
            ReconError::DuplicateRegionId { .. } => {
                Some("check that id_field names a property unique to each feature")
            }
            _ => None,
        };
        let code = recon_exit_code(&err);
        let error = Self::new(code, err.to_string());
        match hint {
            Some(hint) => error.with_hint(hint),
            None => error,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<geobounds_recon::ReconError> for CliError {
    fn from(err: geobounds_recon::ReconError) -> Self {
        Self::recon(err)
    }
}

impl From<geobounds_io::IoError> for CliError {
    fn from(err: geobounds_io::IoError) -> Self {
        Self::recon(err.into())
    }
}
