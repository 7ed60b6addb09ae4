//! Lint command - run the governance linter once against a file

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tower_lsp::lsp_types::Url;
use tracing::{debug, info};

use crate::auth::{AuthProvider, ProfileStore};
use crate::config::UserConfig;
use crate::external::{GovernanceLinter, Linter};
use crate::models::{LintResult, Severity};
use crate::orchestrator::{gate, GateDecision};
use crate::reporters;
use crate::scoring::normalize_severity;

pub fn run(
    file: &Path,
    cli_path: Option<String>,
    format: &str,
    fail_on: Option<String>,
) -> Result<()> {
    let mut settings = UserConfig::load()?.settings;
    if let Some(path) = cli_path {
        settings.cli_path = path;
    }
    debug!("Lint settings: {:?}", settings);

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let absolute = std::fs::canonicalize(file)
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    let uri = Url::from_file_path(&absolute)
        .map_err(|_| anyhow!("Cannot build a file URI for {}", absolute.display()))?;

    let decision = gate(&settings, &uri, &content);
    if decision != GateDecision::Run {
        eprintln!("Skipping {}: {}", file.display(), skip_reason(decision));
        return Ok(());
    }

    let auth = ProfileStore::from_home().auth_status();
    if !auth.is_authenticated {
        bail!(
            "{}",
            auth.error
                .unwrap_or_else(|| "Postman API key not found".to_string())
        );
    }

    let linter = GovernanceLinter::new(settings.cli_path.clone(), auth.api_key);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let result = runtime
        .block_on(linter.lint(&uri, &content))
        .unwrap_or_else(|e| LintResult::failure(e.to_string()));
    info!(
        "Linted {} ({} issues, score {:.2})",
        file.display(),
        result.summary.total,
        result.score
    );

    println!("{}", reporters::report(&result, format)?);

    check_fail_threshold(fail_on.as_deref(), &result);
    Ok(())
}

fn skip_reason(decision: GateDecision) -> &'static str {
    match decision {
        GateDecision::Run => "ready to lint",
        GateDecision::Disabled => "linting is disabled in the user config",
        GateDecision::TooLarge => "file exceeds maxFileSize",
        GateDecision::UnsupportedType => "only .yaml, .yml and .json files are linted",
        GateDecision::NotApiSpec => "not an OpenAPI or Swagger document",
    }
}

fn should_fail(fail_on: Option<&str>, result: &LintResult) -> bool {
    if !result.success {
        return true;
    }
    fail_on
        .map(|threshold| {
            let severity: Severity = normalize_severity(threshold);
            result.summary.at_or_above(severity) > 0
        })
        .unwrap_or(false)
}

/// Exit with code 1 when the run failed or the fail threshold is met
fn check_fail_threshold(fail_on: Option<&str>, result: &LintResult) {
    if should_fail(fail_on, result) {
        match fail_on {
            Some(threshold) if result.success => {
                eprintln!("Failing due to --fail-on={} threshold", threshold)
            }
            _ => eprintln!("Lint run failed"),
        }
        std::process::exit(1);
    }
}
