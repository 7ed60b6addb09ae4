//! Core data models for api-governance-lsp
//!
//! These models are used throughout the codebase for representing
//! governance issues reported by the Postman CLI and the results of a
//! single lint run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity levels for governance issues
///
/// Ordered so that `Error > Warn > Info > Hint`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Hint,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// One governance violation reported by the external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Issue {
    #[serde(default)]
    pub severity: Severity,
    /// 1-based line as reported by the tool (0 when unknown)
    #[serde(default)]
    pub line: u32,
    /// 1-based column as reported by the tool (0 when unknown)
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub rule: String,
    /// JSON-pointer-like locator into the document, may be empty
    #[serde(default)]
    pub path: String,
}

/// Summary of issues by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub error: usize,
    pub warn: usize,
    pub info: usize,
    pub hint: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut summary = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => summary.error += 1,
                Severity::Warn => summary.warn += 1,
                Severity::Info => summary.info += 1,
                Severity::Hint => summary.hint += 1,
            }
            summary.total += 1;
        }
        summary
    }

    /// Number of issues at `severity` or above
    pub fn at_or_above(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error,
            Severity::Warn => self.error + self.warn,
            Severity::Info => self.error + self.warn + self.info,
            Severity::Hint => self.total,
        }
    }
}

/// Which path of the output parser produced the issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseConfidence {
    /// Issues were read from table rows
    Table,
    /// Issues were synthesized from the summary sentence
    Summary,
    /// Nothing recognizable in the output
    #[default]
    None,
}

/// Outcome of one lint run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub success: bool,
    pub issues: Vec<Issue>,
    pub summary: IssueSummary,
    pub score: f64,
    pub confidence: ParseConfidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LintResult {
    /// Build a successful result, re-counting the summary from `issues`
    pub fn from_issues(issues: Vec<Issue>, confidence: ParseConfidence) -> Self {
        let summary = IssueSummary::from_issues(&issues);
        let score = crate::scoring::compute_score(&issues);
        Self {
            success: true,
            issues,
            summary,
            score,
            confidence,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Build a failed result carrying `error`
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            issues: Vec::new(),
            summary: IssueSummary::default(),
            score: 100.0,
            confidence: ParseConfidence::None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> Issue {
        Issue {
            severity,
            message: "m".into(),
            rule: "governance-rule".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);
        assert!(Severity::Info > Severity::Hint);
    }

    #[test]
    fn test_summary_counts_every_issue() {
        let issues = vec![
            issue(Severity::Error),
            issue(Severity::Error),
            issue(Severity::Warn),
            issue(Severity::Hint),
        ];
        let summary = IssueSummary::from_issues(&issues);
        assert_eq!(summary.total, issues.len());
        assert_eq!(summary.error, 2);
        assert_eq!(summary.warn, 1);
        assert_eq!(summary.info, 0);
        assert_eq!(summary.hint, 1);
        assert_eq!(
            summary.error + summary.warn + summary.info + summary.hint,
            summary.total
        );
    }

    #[test]
    fn test_at_or_above() {
        let issues = vec![issue(Severity::Warn), issue(Severity::Info)];
        let summary = IssueSummary::from_issues(&issues);
        assert_eq!(summary.at_or_above(Severity::Error), 0);
        assert_eq!(summary.at_or_above(Severity::Warn), 1);
        assert_eq!(summary.at_or_above(Severity::Hint), 2);
    }

    #[test]
    fn test_lint_result_serializes_camel_case() {
        let result = LintResult::from_issues(vec![issue(Severity::Error)], ParseConfidence::Table);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["confidence"], "table");
        assert_eq!(json["issues"][0]["severity"], "error");
        assert!(json.get("error").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_failure_result() {
        let result = LintResult::failure("boom");
        assert!(!result.success);
        assert!(result.issues.is_empty());
        assert_eq!(result.summary.total, 0);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
