//! depot-extract binary entry point.
//!
//! Thin wrapper around the depot-extract library that initializes logging,
//! parses arguments and runs the selected command.

use anyhow::Result;
use depot_extract::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::from_args();
    tracing::debug!("Parsed arguments: {:?}", cli);

    let mut stdout = std::io::stdout().lock();
    depot_extract::run(&cli, &mut stdout)
}
