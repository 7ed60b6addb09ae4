//! Postman CLI integration
//!
//! Everything that touches the external governance tool lives here:
//! running it, checking that it is installed, and turning its text
//! output into [`Issue`](crate::models::Issue) records.
//!
//! # Architecture
//!
//! 1. [`GovernanceLinter`] writes the document to a temporary artifact
//! 2. [`ProcessInvoker`] runs `<cliPath> api lint <artifact>` with output captured to a file
//! 3. [`parse_output`] reads tables (or the summary sentence) into issues
//! 4. [`LintResult`](crate::models::LintResult) carries the issues, summary and score

mod availability;
mod linter;
mod output_parser;
mod process;

pub use availability::{CliChecker, CliInfo, SystemCliChecker};
pub use linter::{GovernanceLinter, Linter};
pub use output_parser::{parse_output, ParsedOutput};
pub use process::{ProcessInvoker, ProcessOutput, API_KEY_ENV, DEFAULT_TIMEOUT};

use thiserror::Error;

/// Errors from running the governance tool
#[derive(Error, Debug)]
pub enum LintError {
    #[error("{program} not found. Install the Postman CLI or set cliPath")]
    NotFound { program: String },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("{program} exited with {status}: {output}")]
    NonZeroExit {
        program: String,
        status: String,
        output: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LintOutcome<T> = Result<T, LintError>;
