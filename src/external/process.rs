//! Running the external governance tool
//!
//! Combined stdout/stderr go to a temporary file instead of a pipe so that
//! very large reports are never truncated by pipe back-pressure. The file
//! is read once the child has exited and removed afterwards, including on
//! the timeout path.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::{LintError, LintOutcome};

/// Hard limit for a single tool invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Environment variable carrying the Postman API key to the child
pub const API_KEY_ENV: &str = "POSTMAN_API_KEY";

/// Captured output of a finished invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Combined stdout and stderr
    pub output: String,
    /// Process exit code (`None` if killed by a signal)
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a program with captured output and a hard timeout
#[derive(Debug, Clone, Copy)]
pub struct ProcessInvoker {
    timeout: Duration,
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProcessInvoker {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args`, passing `credential` through [`API_KEY_ENV`].
    pub async fn run(
        &self,
        program: &str,
        args: &[String],
        credential: Option<&str>,
    ) -> LintOutcome<ProcessOutput> {
        let capture = tempfile::Builder::new()
            .prefix("governance-output-")
            .suffix(".log")
            .tempfile()?;
        let stdout = capture.as_file().try_clone()?;
        let stderr = stdout.try_clone()?;

        debug!("Running {} {:?}", program, args);

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        if let Some(key) = credential {
            command.env(API_KEY_ENV, key);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LintError::NotFound {
                    program: program.to_string(),
                });
            }
            Err(e) => {
                return Err(LintError::Spawn {
                    program: program.to_string(),
                    source: e,
                });
            }
        };
        // The parent's copies of the capture handle are no longer needed.
        drop(command);

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {} after timeout: {}", program, e);
                }
                warn!("{} timed out after {}s", program, self.timeout.as_secs());
                return Err(LintError::Timeout {
                    program: program.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let bytes = tokio::fs::read(capture.path()).await?;
        let output = String::from_utf8_lossy(&bytes).into_owned();

        let capture_path = capture.path().to_path_buf();
        if let Err(e) = capture.close() {
            warn!(
                "Failed to remove capture file {}: {}",
                capture_path.display(),
                e
            );
        }

        debug!(
            "{} exited with {:?} ({} bytes of output)",
            program,
            status.code(),
            output.len()
        );

        Ok(ProcessOutput {
            output,
            exit_code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let invoker = ProcessInvoker::default();
        let result = invoker
            .run("sh", &sh("echo out; echo err 1>&2"), None)
            .await
            .unwrap();
        assert!(result.success());
        assert!(result.output.contains("out"));
        assert!(result.output.contains("err"));
    }

    #[tokio::test]
    async fn test_large_output_is_not_truncated() {
        let invoker = ProcessInvoker::default();
        // ~1.3 MB, well past any pipe buffer
        let result = invoker
            .run(
                "sh",
                &sh("i=0; while [ $i -lt 20000 ]; do echo \"line $i ──────────────────────────────────────────────\"; i=$((i+1)); done"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(result.output.lines().count(), 20000);
        assert!(result.output.contains("line 19999"));
    }

    #[tokio::test]
    async fn test_credential_goes_through_env() {
        let invoker = ProcessInvoker::default();
        let result = invoker
            .run("sh", &sh("printf %s \"$POSTMAN_API_KEY\""), Some("PMAK-test"))
            .await
            .unwrap();
        assert_eq!(result.output, "PMAK-test");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let invoker = ProcessInvoker::default();
        let result = invoker.run("sh", &sh("echo nope; exit 3"), None).await.unwrap();
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_silent_crash_yields_empty_output() {
        let invoker = ProcessInvoker::default();
        let result = invoker.run("sh", &sh("exit 1"), None).await.unwrap();
        assert_eq!(result.output, "");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let invoker = ProcessInvoker::default();
        let err = invoker
            .run("definitely-not-a-real-postman-binary", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, LintError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_the_child() {
        let invoker = ProcessInvoker::with_timeout(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let err = invoker.run("sleep", &["30".to_string()], None).await.unwrap_err();
        assert!(matches!(err, LintError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
