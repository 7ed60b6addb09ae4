//! Checks that the Postman CLI is installed and supports `api lint`

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tower_lsp::async_trait;
use tracing::debug;

use super::ProcessInvoker;

const CHECK_TIMEOUT: Duration = Duration::from_secs(15);

static VERSION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn version_pattern() -> &'static Regex {
    VERSION_PATTERN.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.\-]+)?").unwrap())
}

/// What we know about the configured CLI binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliInfo {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CliInfo {
    pub fn unavailable(path: &str, error: impl Into<String>) -> Self {
        Self {
            available: false,
            version: None,
            path: path.to_string(),
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait CliChecker: Send + Sync {
    /// Check that `cli_path` runs and report its version
    async fn validate_cli(&self, cli_path: &str) -> CliInfo;

    /// Check that `cli_path` understands `api lint`
    async fn validate_lint_command(&self, cli_path: &str) -> bool;
}

/// Checks the CLI by running it
#[derive(Debug, Clone, Copy)]
pub struct SystemCliChecker {
    invoker: ProcessInvoker,
}

impl Default for SystemCliChecker {
    fn default() -> Self {
        Self {
            invoker: ProcessInvoker::with_timeout(CHECK_TIMEOUT),
        }
    }
}

/// Pull a version string out of `--version` output
fn extract_version(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(
        version_pattern()
            .find(line)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| line.to_string()),
    )
}

#[async_trait]
impl CliChecker for SystemCliChecker {
    async fn validate_cli(&self, cli_path: &str) -> CliInfo {
        match self
            .invoker
            .run(cli_path, &["--version".to_string()], None)
            .await
        {
            Ok(out) if out.success() => CliInfo {
                available: true,
                version: extract_version(&out.output),
                path: cli_path.to_string(),
                error: None,
            },
            Ok(out) => CliInfo::unavailable(
                cli_path,
                format!(
                    "{} --version exited with {:?}: {}",
                    cli_path,
                    out.exit_code,
                    out.output.trim()
                ),
            ),
            Err(e) => CliInfo::unavailable(cli_path, e.to_string()),
        }
    }

    async fn validate_lint_command(&self, cli_path: &str) -> bool {
        let args = ["api", "lint", "--help"].map(String::from);
        match self.invoker.run(cli_path, &args, None).await {
            Ok(out) => out.success() && out.output.to_lowercase().contains("lint"),
            Err(e) => {
                debug!("{} api lint --help failed: {}", cli_path, e);
                false
            }
        }
    }
}
