//! Running `postman api lint` against document content

use std::io::Write;
use std::path::Path;
use tower_lsp::async_trait;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

use super::{parse_output, LintError, LintOutcome, ProcessInvoker};
use crate::models::{LintResult, ParseConfidence};

const DEFAULT_EXTENSION: &str = "yaml";

/// Something that can lint the content of a document
#[async_trait]
pub trait Linter: Send + Sync {
    async fn lint(&self, uri: &Url, content: &str) -> LintOutcome<LintResult>;
}

/// Lints through the Postman CLI
#[derive(Debug, Clone)]
pub struct GovernanceLinter {
    cli_path: String,
    api_key: Option<String>,
    invoker: ProcessInvoker,
}

impl GovernanceLinter {
    pub fn new(cli_path: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
            api_key,
            invoker: ProcessInvoker::default(),
        }
    }

    pub fn with_invoker(mut self, invoker: ProcessInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn cli_path(&self) -> &str {
        &self.cli_path
    }
}

/// Extension the temporary artifact should carry so the CLI picks the right format
fn artifact_extension(uri: &Url) -> String {
    Path::new(uri.path())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Write `content` to a uniquely named temporary file, removed on drop
fn materialize(uri: &Url, content: &str) -> LintOutcome<tempfile::NamedTempFile> {
    let mut artifact = tempfile::Builder::new()
        .prefix("governance-")
        .suffix(&format!(".{}", artifact_extension(uri)))
        .tempfile()?;
    artifact.write_all(content.as_bytes())?;
    artifact.flush()?;
    Ok(artifact)
}

#[async_trait]
impl Linter for GovernanceLinter {
    async fn lint(&self, uri: &Url, content: &str) -> LintOutcome<LintResult> {
        let artifact = materialize(uri, content)?;
        let args = vec![
            "api".to_string(),
            "lint".to_string(),
            artifact.path().to_string_lossy().into_owned(),
        ];

        debug!("Linting {} via {}", uri, artifact.path().display());

        let out = self
            .invoker
            .run(&self.cli_path, &args, self.api_key.as_deref())
            .await?;

        let artifact_path = artifact.path().to_path_buf();
        if let Err(e) = artifact.close() {
            warn!("Failed to remove {}: {}", artifact_path.display(), e);
        }

        let parsed = parse_output(&out.output);

        // The CLI exits non-zero whenever it finds violations, so a failing
        // status only counts when nothing in the output was recognized.
        if !out.success()
            && parsed.confidence == ParseConfidence::None
            && !out.output.trim().is_empty()
        {
            return Err(LintError::NonZeroExit {
                program: self.cli_path.clone(),
                status: out
                    .exit_code
                    .map_or_else(|| "signal".to_string(), |c| format!("status {c}")),
                output: out.output.trim().to_string(),
            });
        }

        debug!(
            "{}: {} issues ({:?})",
            uri,
            parsed.summary.total,
            parsed.confidence
        );

        Ok(LintResult::from_issues(parsed.issues, parsed.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file:///workspace/{path}")).unwrap()
    }

    #[test]
    fn test_artifact_extension_follows_document() {
        assert_eq!(artifact_extension(&uri("api.yaml")), "yaml");
        assert_eq!(artifact_extension(&uri("spec.JSON")), "json");
        assert_eq!(artifact_extension(&uri("noext")), "yaml");
    }

    #[test]
    fn test_materialize_writes_content() {
        let artifact = materialize(&uri("api.yml"), "openapi: 3.0.0\n").unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.to_string_lossy().ends_with(".yml"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "openapi: 3.0.0\n");
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_artifacts_are_unique() {
        let a = materialize(&uri("api.yaml"), "a").unwrap();
        let b = materialize(&uri("api.yaml"), "b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_missing_cli_is_an_error() {
        let linter = GovernanceLinter::new("definitely-not-a-real-postman-binary", None);
        let err = linter.lint(&uri("api.yaml"), "openapi: 3.0.0").await.unwrap_err();
        assert!(matches!(err, LintError::NotFound { .. }));
    }
}
