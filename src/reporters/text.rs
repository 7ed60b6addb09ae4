//! Text (terminal) reporter with colors and formatting

use crate::models::{LintResult, Severity};
use crate::scoring::grade_from_score;
use anyhow::Result;
use console::{style, StyledObject};

fn severity_label(severity: Severity) -> StyledObject<String> {
    let label = format!("{:<5}", severity.to_string());
    match severity {
        Severity::Error => style(label).red().bold(),
        Severity::Warn => style(label).yellow(),
        Severity::Info => style(label).blue(),
        Severity::Hint => style(label).dim(),
    }
}

fn grade_label(grade: &'static str) -> StyledObject<&'static str> {
    match grade {
        "A" | "B" => style(grade).green().bold(),
        "C" => style(grade).yellow().bold(),
        _ => style(grade).red().bold(),
    }
}

/// Render result as formatted terminal output
pub fn render(result: &LintResult) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", style("Postman Governance Lint").bold()));
    out.push_str(&format!(
        "{}\n",
        style("──────────────────────────────────────").dim()
    ));

    if let Some(error) = &result.error {
        out.push_str(&format!("{} {}\n", style("Lint failed:").red().bold(), error));
        return Ok(out);
    }

    out.push_str(&format!(
        "Score: {}  Grade: {}\n\n",
        style(format!("{:.2}/100", result.score)).bold(),
        grade_label(grade_from_score(result.score))
    ));

    let s = &result.summary;
    if s.total == 0 {
        out.push_str(&format!("{}\n", style("No governance issues found").green()));
        return Ok(out);
    }

    out.push_str(&format!(
        "{} ({} total)  {} error, {} warn, {} info, {} hint\n\n",
        style("ISSUES").bold(),
        s.total,
        s.error,
        s.warn,
        s.info,
        s.hint
    ));

    for issue in &result.issues {
        out.push_str(&format!(
            "  {:>4}:{:<4} {}  {}\n",
            issue.line,
            issue.column,
            severity_label(issue.severity),
            issue.message
        ));
        if !issue.path.is_empty() {
            out.push_str(&format!("             {}\n", style(&issue.path).dim()));
        }
    }

    Ok(out)
}
