//! Logging setup
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG` wins
//! over the command-line flags.

use tracing_subscriber::EnvFilter;

/// Default filter for the given verbosity
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "ouoctl=debug,info"
    } else {
        "warn"
    }
}

/// Initialize the global subscriber
pub fn init(verbose: bool, json_output: bool, no_color: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json_output {
        builder.json().try_init()
    } else {
        builder.with_ansi(!no_color).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("{}", e))
}
