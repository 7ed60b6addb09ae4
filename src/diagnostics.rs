//! Mapping governance issues onto LSP diagnostics

use serde_json::json;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

use crate::models::{Issue, Severity};

/// `source` tag on every diagnostic this server publishes.
///
/// Hosts filter on this value to tell our diagnostics apart from others.
pub const DIAGNOSTIC_SOURCE: &str = "postman-governance";

/// Code attached to the synthetic diagnostic published when linting fails
pub const FAILURE_CODE: &str = "lint-failure";

fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warn => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

/// One-character range at the tool's 1-based `line`/`column`, converted to 0-based
fn issue_range(line: u32, column: u32) -> Range {
    let line = line.saturating_sub(1);
    let character = column.saturating_sub(1);
    Range::new(
        Position::new(line, character),
        Position::new(line, character + 1),
    )
}

pub fn to_diagnostic(issue: &Issue) -> Diagnostic {
    Diagnostic {
        range: issue_range(issue.line, issue.column),
        severity: Some(to_lsp_severity(issue.severity)),
        code: Some(NumberOrString::String(issue.rule.clone())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: issue.message.clone(),
        data: (!issue.path.is_empty()).then(|| json!({ "path": issue.path })),
        ..Default::default()
    }
}

/// Single diagnostic at the top of the document describing why linting failed
pub fn failure_diagnostic(message: &str) -> Diagnostic {
    Diagnostic {
        range: issue_range(0, 0),
        severity: Some(DiagnosticSeverity::ERROR),
        code: Some(NumberOrString::String(FAILURE_CODE.to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: format!("Postman governance lint failed: {message}"),
        ..Default::default()
    }
}
