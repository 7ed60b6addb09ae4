//! JSON reporter
//!
//! Outputs the full LintResult as pretty-printed JSON, camelCase like the
//! `postmanGovernance/lintDocument` response.

use crate::models::LintResult;
use anyhow::Result;

/// Render result as JSON
pub fn render(result: &LintResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
