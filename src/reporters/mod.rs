//! Output reporters for one-shot lint results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (same shape as the `lintDocument` response)

mod json;
mod text;

use crate::models::LintResult;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a lint result in the specified format
pub fn report(result: &LintResult, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(result, fmt)
}

/// Render a lint result using an OutputFormat enum
pub fn report_with_format(result: &LintResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result),
        OutputFormat::Json => json::render(result),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Create a small LintResult for testing
    pub(crate) fn test_result() -> LintResult {
        use crate::models::{Issue, ParseConfidence, Severity};

        let issues = vec![
            Issue {
                severity: Severity::Error,
                line: 4,
                column: 12,
                message: "Missing description".into(),
                rule: "governance-rule".into(),
                path: "#/paths/~1pets/get".into(),
            },
            Issue {
                severity: Severity::Warn,
                line: 7,
                column: 3,
                message: "Operation id is missing".into(),
                rule: "governance-rule".into(),
                path: String::new(),
            },
        ];
        LintResult::from_issues(issues, ParseConfidence::Table)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_report_by_name() {
        let out = report(&test_result(), "json").unwrap();
        assert!(out.starts_with('{'));
    }
}
