//! Parser for `postman api lint` text output
//!
//! The CLI prints one box-drawn table per validation type:
//!
//! ```text
//! Validation Type: Governance
//! ┌───────┬──────────┬──────────────────────┬────────────────────┐
//! │ Range │ Severity │ Description          │ Path               │
//! ├───────┼──────────┼──────────────────────┼────────────────────┤
//! │ 4:12  │ error    │ Missing description  │ #/paths/~1foo/get  │
//! └───────┴──────────┴──────────────────────┴────────────────────┘
//! 1 problem (1 error, 0 warnings, 0 infos, 0 hints)
//! ```
//!
//! The format is not a stable contract, so parsing never fails. When no
//! table row is recognized the summary sentence is used to synthesize
//! position-less issues, keeping the aggregate counts right.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::models::{Issue, IssueSummary, ParseConfidence, Severity};
use crate::scoring::normalize_severity;

const DEFAULT_CATEGORY: &str = "governance";

/// Rule id given to issues synthesized from the summary sentence
pub const SUMMARY_RULE: &str = "governance";

/// Most issues synthesized per severity from one summary sentence
pub const MAX_SUMMARY_ISSUES: usize = 10_000;

const CELL_DELIMITERS: [char; 3] = ['│', '┃', '|'];

const SEPARATOR_CHARS: &str = "-─━═┄┈╌+┼┬┴├┤┌┐└┘╞╡╪╤╧╋┣┫┳┻:= ";

static ANSI_PATTERN: OnceLock<Regex> = OnceLock::new();
static VALIDATION_TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();
static RANGE_PATTERN: OnceLock<Regex> = OnceLock::new();
static SUMMARY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn ansi_pattern() -> &'static Regex {
    ANSI_PATTERN.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
            .unwrap()
    })
}

fn validation_type_pattern() -> &'static Regex {
    VALIDATION_TYPE_PATTERN
        .get_or_init(|| Regex::new(r"(?i)Validation\s+Type:\s*([A-Za-z][\w-]*)").unwrap())
}

fn range_pattern() -> &'static Regex {
    RANGE_PATTERN.get_or_init(|| Regex::new(r"^(\d+):(\d+)").unwrap())
}

fn summary_pattern() -> &'static Regex {
    SUMMARY_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(\d+)\s+problems?\s*\(\s*(\d+)\s+errors?\s*,\s*(\d+)\s+warnings?\s*,\s*(\d+)\s+infos?\s*,\s*(\d+)\s+hints?\s*\)",
        )
        .unwrap()
    })
}

/// Best-effort structured view of one tool run
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    pub issues: Vec<Issue>,
    pub summary: IssueSummary,
    pub confidence: ParseConfidence,
}

/// Remove ANSI color and cursor escape sequences
pub fn strip_ansi(raw: &str) -> String {
    ansi_pattern().replace_all(raw, "").into_owned()
}

/// Parse raw tool output into issues. Never fails.
pub fn parse_output(raw: &str) -> ParsedOutput {
    let text = strip_ansi(raw);

    let mut issues = parse_tables(&text);
    let confidence = if !issues.is_empty() {
        ParseConfidence::Table
    } else if let Some(synthesized) = parse_summary_sentence(&text) {
        issues = synthesized;
        ParseConfidence::Summary
    } else {
        ParseConfidence::None
    };

    ParsedOutput {
        summary: IssueSummary::from_issues(&issues),
        issues,
        confidence,
    }
}

fn parse_tables(text: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut category = DEFAULT_CATEGORY.to_string();

    for line in text.lines() {
        let Some(cells) = split_cells(line) else {
            if let Some(caps) = validation_type_pattern().captures(line) {
                category = caps[1].to_lowercase();
            }
            continue;
        };
        if is_header_row(&cells) || is_separator_row(&cells) {
            continue;
        }
        if let Some(issue) = issue_from_row(&cells, &category) {
            issues.push(issue);
        }
    }

    issues
}

fn split_cells(line: &str) -> Option<Vec<&str>> {
    let delimiter = CELL_DELIMITERS.iter().copied().find(|&d| line.contains(d))?;
    Some(
        line.split(delimiter)
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect(),
    )
}

fn is_header_row(cells: &[&str]) -> bool {
    cells
        .iter()
        .any(|c| c.eq_ignore_ascii_case("range") || c.eq_ignore_ascii_case("severity"))
}

fn is_separator_row(cells: &[&str]) -> bool {
    !cells.is_empty()
        && cells
            .iter()
            .all(|c| c.chars().all(|ch| SEPARATOR_CHARS.contains(ch)))
}

fn issue_from_row(cells: &[&str], category: &str) -> Option<Issue> {
    let [range, severity, description, rest @ ..] = cells else {
        return None;
    };

    let (line, column) = range_pattern()
        .captures(range)
        .and_then(|caps| Some((caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?)))
        .unwrap_or((0, 0));

    Some(Issue {
        severity: normalize_severity(severity),
        line,
        column,
        message: description.to_string(),
        rule: format!("{category}-rule"),
        path: rest.first().map(|p| p.to_string()).unwrap_or_default(),
    })
}

fn parse_summary_sentence(text: &str) -> Option<Vec<Issue>> {
    let caps = summary_pattern().captures(text)?;
    // Counts that overflow still stand for issues, so they clamp instead of vanishing
    let count = |i: usize| {
        let raw = &caps[i];
        match raw.parse::<usize>() {
            Ok(n) if n <= MAX_SUMMARY_ISSUES => n,
            _ => {
                warn!(
                    "Summary count {} exceeds {}; clamping",
                    raw, MAX_SUMMARY_ISSUES
                );
                MAX_SUMMARY_ISSUES
            }
        }
    };

    let buckets = [
        (Severity::Error, count(2), "Governance error"),
        (Severity::Warn, count(3), "Governance warning"),
        (Severity::Info, count(4), "Governance info"),
        (Severity::Hint, count(5), "Governance hint"),
    ];

    let issues = buckets
        .iter()
        .flat_map(|&(severity, n, message)| {
            std::iter::repeat_with(move || Issue {
                severity,
                line: 0,
                column: 0,
                message: message.to_string(),
                rule: SUMMARY_RULE.to_string(),
                path: String::new(),
            })
            .take(n)
        })
        .collect();

    Some(issues)
}
