//! Binary crate for the `shortfall` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Log setup and output formatting

use clap::Parser;
use shortfall_core::Config;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let config_path = match &cmd.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    init_logging(cmd.verbose, config.log_level.as_deref());

    let stdout = std::io::stdout();
    cmd.run(&mut config, &config_path, &mut stdout.lock())
}

/// `RUST_LOG` wins; otherwise `-v` flags, then the configured level.
fn init_logging(verbose: u8, configured: Option<&str>) {
    let fallback = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
