//! Severity normalization and governance scoring
//!
//! # Scoring Formula
//!
//! ```text
//! Score = clamp(100 - Σ weight(severity), 0, 100), rounded to 2 decimals
//!
//! Where weight:
//!   error: 10.0
//!   warn:   2.5
//!   info:   0.5
//!   hint:   0.05
//! ```
//!
//! The score is a sum of per-issue deductions, so it does not depend on
//! the order in which issues were reported.

use crate::models::{Issue, Severity};

const MAX_SCORE: f64 = 100.0;

/// Deduction applied per issue of the given severity
pub fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Error => 10.0,
        Severity::Warn => 2.5,
        Severity::Info => 0.5,
        Severity::Hint => 0.05,
    }
}

/// Map a raw severity label from the tool onto the four canonical levels.
///
/// Unknown, empty or garbage labels fall through to `Hint`.
pub fn normalize_severity(raw: &str) -> Severity {
    match raw.trim().to_lowercase().as_str() {
        "error" | "errors" => Severity::Error,
        "warn" | "warning" | "warnings" => Severity::Warn,
        "info" | "information" => Severity::Info,
        _ => Severity::Hint,
    }
}

/// Compute the aggregate governance score for a set of issues
pub fn compute_score(issues: &[Issue]) -> f64 {
    let deduction: f64 = issues.iter().map(|i| severity_weight(i.severity)).sum();
    let score = (MAX_SCORE - deduction).max(0.0);
    (score * 100.0).round() / 100.0
}

/// Calculate letter grade from score
pub fn grade_from_score(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "A",
        s if s >= 80.0 => "B",
        s if s >= 70.0 => "C",
        s if s >= 60.0 => "D",
        _ => "F",
    }
}
