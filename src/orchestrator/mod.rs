//! Deciding when to lint an open document
//!
//! Per document the flow is:
//!
//! ```text
//! Idle ──save──────────────────────────────┐
//!      ──change──▶ Queued (debounce timer) ─┴─▶ gate ─▶ Running ─▶ Published ─▶ Idle
//!                                                │
//!                                                └─▶ Gated-Out (maybe clear) ─▶ Idle
//! ```
//!
//! Two invariants keep this well-behaved under rapid editing:
//!
//! - A document has at most one pending debounce timer. Arming a new one
//!   cancels the previous one.
//! - Every validation takes a fresh number from one global sequence and
//!   records it for its document. A finished run only publishes if its number
//!   is still the recorded one; close drops the record, so late runs never
//!   publish after it. Checking and publishing happen under one lock.

mod gate;

pub use gate::{gate, has_api_spec_marker, is_supported_document, GateDecision, SUPPORTED_EXTENSIONS};

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tower_lsp::async_trait;
use tower_lsp::lsp_types::{Diagnostic, Url};
use tracing::{debug, info, trace, warn};

use crate::auth::AuthProvider;
use crate::config::SettingsStore;
use crate::diagnostics::{failure_diagnostic, to_diagnostic};
use crate::external::{CliChecker, GovernanceLinter, Linter};
use crate::models::LintResult;

/// Receives the diagnostics for a document, replacing any previous set
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>);
}

/// Reasons the linter could not be set up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Postman governance linting is disabled: not authenticated. {0}")]
    AuthMissing(String),

    #[error("Postman governance linting is disabled: CLI '{path}' is unavailable. {reason}")]
    CliUnavailable { path: String, reason: String },
}

struct PendingRun {
    id: u64,
    token: CancellationToken,
}

pub struct Orchestrator {
    settings: SettingsStore,
    sink: Arc<dyn DiagnosticSink>,
    linter: RwLock<Option<Arc<dyn Linter>>>,
    documents: DashMap<Url, String>,
    pending: DashMap<Url, PendingRun>,
    sequence: DashMap<Url, u64>,
    sequence_counter: AtomicU64,
    publish_lock: Mutex<()>,
    next_timer_id: AtomicU64,
}

impl Orchestrator {
    pub fn new(settings: SettingsStore, sink: Arc<dyn DiagnosticSink>) -> Arc<Self> {
        Arc::new(Self {
            settings,
            sink,
            linter: RwLock::new(None),
            documents: DashMap::new(),
            pending: DashMap::new(),
            sequence: DashMap::new(),
            sequence_counter: AtomicU64::new(0),
            publish_lock: Mutex::new(()),
            next_timer_id: AtomicU64::new(0),
        })
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub async fn set_linter(&self, linter: Option<Arc<dyn Linter>>) {
        *self.linter.write().await = linter;
    }

    pub async fn has_linter(&self) -> bool {
        self.linter.read().await.is_some()
    }

    /// (Re)build the linter from the current settings.
    ///
    /// On error the linter is left unset and validation is skipped until the
    /// next successful call.
    pub async fn configure(
        &self,
        auth: &dyn AuthProvider,
        checker: &dyn CliChecker,
    ) -> Result<(), SetupError> {
        let settings = self.settings.current();

        let status = auth.auth_status();
        let api_key = match status.api_key {
            Some(key) if status.is_authenticated => key,
            _ => {
                self.set_linter(None).await;
                return Err(SetupError::AuthMissing(status.error.unwrap_or_default()));
            }
        };

        let info = checker.validate_cli(&settings.cli_path).await;
        if !info.available {
            self.set_linter(None).await;
            return Err(SetupError::CliUnavailable {
                path: settings.cli_path.clone(),
                reason: info.error.unwrap_or_default(),
            });
        }
        if !checker.validate_lint_command(&settings.cli_path).await {
            warn!(
                "{} does not advertise `api lint`; linting may fail",
                settings.cli_path
            );
        }

        info!(
            "Governance linting ready ({} {})",
            settings.cli_path,
            info.version.as_deref().unwrap_or("unknown version")
        );
        let linter = GovernanceLinter::new(settings.cli_path.clone(), Some(api_key));
        self.set_linter(Some(Arc::new(linter))).await;
        Ok(())
    }

    pub fn document(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|d| d.value().clone())
    }

    pub fn has_pending(&self, uri: &Url) -> bool {
        self.pending.contains_key(uri)
    }

    /// Track a newly opened document; lints it right away when `lintOnSave` is set
    pub fn open(self: &Arc<Self>, uri: Url, text: String) {
        self.documents.insert(uri.clone(), text);
        if self.settings.current().lint_on_save {
            self.spawn_validation(uri);
        }
    }

    pub fn change(self: &Arc<Self>, uri: Url, text: String) {
        self.documents.insert(uri.clone(), text);
        let settings = self.settings.current();
        if settings.lint_on_change {
            self.schedule(uri, Duration::from_millis(settings.lint_on_change_delay));
        }
    }

    pub fn save(self: &Arc<Self>, uri: Url, text: Option<String>) {
        if let Some(text) = text {
            self.documents.insert(uri.clone(), text);
        }
        if self.settings.current().lint_on_save {
            self.spawn_validation(uri);
        }
    }

    /// Forget the document and clear its diagnostics
    pub async fn close(&self, uri: &Url) {
        if let Some((_, pending)) = self.pending.remove(uri) {
            pending.token.cancel();
        }
        self.documents.remove(uri);

        let _guard = self.publish_lock.lock().await;
        if let Some((_, sequence)) = self.sequence.remove(uri) {
            trace!("Closed {} after run {}", uri, sequence);
        }
        self.sink.publish(uri.clone(), Vec::new()).await;
    }

    /// Arm the debounce timer for `uri`, replacing any pending one
    pub fn schedule(self: &Arc<Self>, uri: Url, delay: Duration) {
        let id = self.next_timer_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let pending = PendingRun {
            id,
            token: token.clone(),
        };
        if let Some(previous) = self.pending.insert(uri.clone(), pending) {
            previous.token.cancel();
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("Debounce timer {} for {} replaced", id, uri);
                }
                _ = tokio::time::sleep(delay) => {
                    this.pending.remove_if(&uri, |_, p| p.id == id);
                    this.validate(&uri).await;
                }
            }
        });
    }

    fn spawn_validation(self: &Arc<Self>, uri: Url) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.validate(&uri).await;
        });
    }

    fn next_sequence(&self, uri: &Url) -> u64 {
        let sequence = self.sequence_counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.sequence.insert(uri.clone(), sequence);
        sequence
    }

    fn is_latest(&self, uri: &Url, sequence: u64) -> bool {
        self.sequence.get(uri).is_some_and(|s| *s == sequence)
    }

    async fn publish_if_latest(&self, uri: &Url, sequence: u64, diagnostics: Vec<Diagnostic>) {
        let _guard = self.publish_lock.lock().await;
        if self.is_latest(uri, sequence) {
            self.sink.publish(uri.clone(), diagnostics).await;
        } else {
            debug!("Discarding stale diagnostics for {} (run {})", uri, sequence);
        }
    }

    /// Lint the current content of `uri` and publish the outcome.
    ///
    /// Returns `None` when the document is unknown, gated out, or no linter is
    /// configured. Failures come back as an unsuccessful [`LintResult`].
    pub async fn validate(&self, uri: &Url) -> Option<LintResult> {
        let content = self.document(uri)?;
        let settings = self.settings.current();
        let sequence = self.next_sequence(uri);

        let decision = gate(&settings, uri, &content);
        if decision != GateDecision::Run {
            debug!("Skipping {}: {:?}", uri, decision);
            if decision.clears_diagnostics() {
                self.publish_if_latest(uri, sequence, Vec::new()).await;
            }
            return None;
        }

        let linter = self.linter.read().await.clone();
        let Some(linter) = linter else {
            debug!("Skipping {}: linter not configured", uri);
            return None;
        };

        let result = match linter.lint(uri, &content).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Linting {} failed: {}", uri, e);
                LintResult::failure(e.to_string())
            }
        };

        let diagnostics = match &result.error {
            None => result.issues.iter().map(to_diagnostic).collect(),
            Some(message) => vec![failure_diagnostic(message)],
        };
        self.publish_if_latest(uri, sequence, diagnostics).await;

        Some(result)
    }
}
