//! api-governance-lsp binary
//!
//! Starts the language server on stdio by default; `lint` and `doctor`
//! run once from the command line.

use anyhow::Result;
use api_governance_lsp::cli::{self, Cli};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the LSP stream, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(filter)
        .init();

    cli::run(cli)
}
