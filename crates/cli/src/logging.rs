//! Logging setup.
//!
//! The engine and IO crates log through the `log` facade. The subscriber
//! installed here bridges those records into tracing and writes them to
//! stderr, leaving stdout free for `--json` output.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `info`, or `debug` with `--verbose`,
/// and `warn` with `--quiet`.
pub fn init(verbose: bool, quiet: bool) {
    let default = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
