//! CLI command definitions and handlers

mod doctor;
mod lint;
mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Postman API governance diagnostics for OpenAPI and Swagger documents
#[derive(Parser, Debug)]
#[command(name = "api-governance-lsp")]
#[command(
    version,
    about = "Language server that runs `postman api lint` and publishes governance issues as diagnostics",
    long_about = "Runs the Postman CLI governance linter against OpenAPI/Swagger documents \
and reports the issues it finds, either as LSP diagnostics for an editor or \
once from the command line.\n\n\
Run without a subcommand to start the language server on stdio:\n  \
api-governance-lsp",
    after_help = "\
Examples:
  api-governance-lsp                              Start the language server on stdio
  api-governance-lsp lint openapi.yaml            Lint a file once
  api-governance-lsp lint api.json --format json  JSON output for scripting
  api-governance-lsp lint api.yaml --fail-on warn Exit code 1 on warnings (CI mode)
  api-governance-lsp doctor                       Check credentials and the Postman CLI"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the language server over stdio (default)
    Serve,

    /// Lint a single document and print the result
    #[command(after_help = "\
Examples:
  api-governance-lsp lint openapi.yaml
  api-governance-lsp lint openapi.yaml --cli-path ~/bin/postman
  api-governance-lsp lint openapi.yaml --format json --fail-on error")]
    Lint {
        /// OpenAPI/Swagger document (.yaml, .yml or .json)
        file: PathBuf,

        /// Postman CLI executable (overrides the user config)
        #[arg(long, env = "POSTMAN_CLI_PATH")]
        cli_path: Option<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Exit with code 1 if issues at this severity or higher exist
        #[arg(long, value_parser = ["error", "warn", "info", "hint"])]
        fail_on: Option<String>,
    },

    /// Check the Postman credential and CLI installation
    Doctor {
        /// Postman CLI executable (overrides the user config)
        #[arg(long, env = "POSTMAN_CLI_PATH")]
        cli_path: Option<String>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Serve) => serve::run(),

        Some(Commands::Lint {
            file,
            cli_path,
            format,
            fail_on,
        }) => lint::run(&file, cli_path, &format, fail_on),

        Some(Commands::Doctor { cli_path }) => doctor::run(cli_path),
    }
}
