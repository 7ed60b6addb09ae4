//! `LanguageServer` implementation wiring editor events to the orchestrator

use serde_json::Value;
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{async_trait, Client, LanguageServer};
use tracing::{debug, info, warn};

use super::params::LintDocumentParams;
use crate::auth::{AuthProvider, AuthStatus, ProfileStore};
use crate::config::{Settings, SettingsStore};
use crate::external::{CliChecker, CliInfo, SystemCliChecker};
use crate::models::LintResult;
use crate::orchestrator::{DiagnosticSink, Orchestrator};

#[async_trait]
impl DiagnosticSink for Client {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        self.publish_diagnostics(uri, diagnostics, None).await;
    }
}

pub struct Backend {
    client: Client,
    orchestrator: Arc<Orchestrator>,
    auth: Arc<dyn AuthProvider>,
    cli: Arc<dyn CliChecker>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self::with_collaborators(
            client,
            Arc::new(ProfileStore::from_home()),
            Arc::new(SystemCliChecker::default()),
        )
    }

    pub fn with_collaborators(
        client: Client,
        auth: Arc<dyn AuthProvider>,
        cli: Arc<dyn CliChecker>,
    ) -> Self {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(client.clone());
        let orchestrator = Orchestrator::new(SettingsStore::default(), sink);
        Self {
            client,
            orchestrator,
            auth,
            cli,
        }
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.orchestrator.settings().current()
    }

    /// Replace the settings snapshot; a payload that does not parse keeps the current one
    fn apply_configuration(&self, value: &Value) {
        match Settings::from_configuration(value) {
            Ok(settings) => {
                debug!("Settings updated: {:?}", settings);
                self.orchestrator.settings().replace(settings);
            }
            Err(e) => warn!("Ignoring invalid settings: {}", e),
        }
    }

    /// Rebuild the linter and tell the user if linting is unavailable
    async fn reload(&self) {
        if let Err(e) = self
            .orchestrator
            .configure(self.auth.as_ref(), self.cli.as_ref())
            .await
        {
            warn!("{}", e);
            self.client
                .show_message(MessageType::WARNING, e.to_string())
                .await;
        }
    }

    pub async fn lint_document(&self, params: LintDocumentParams) -> Result<Option<LintResult>> {
        Ok(self.orchestrator.validate(&params.uri).await)
    }

    pub async fn check_auth_status(&self) -> Result<AuthStatus> {
        Ok(self.auth.auth_status())
    }

    pub async fn get_cli_info(&self) -> Result<CliInfo> {
        let settings = self.settings();
        Ok(self.cli.validate_cli(&settings.cli_path).await)
    }
}

#[async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options.as_ref() {
            self.apply_configuration(options);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Client initialized");
        self.reload().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutdown requested");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.orchestrator.open(doc.uri, doc.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.orchestrator
                .change(params.text_document.uri, change.text);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.orchestrator
            .save(params.text_document.uri, params.text);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.orchestrator.close(&params.text_document.uri).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_configuration(&params.settings);
        self.reload().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tower_lsp::LspService;

    struct FixedAuth;

    impl AuthProvider for FixedAuth {
        fn auth_status(&self) -> AuthStatus {
            AuthStatus::authenticated("PMAK-test".into(), Some("default".into()))
        }
    }

    struct FixedCli;

    #[async_trait]
    impl CliChecker for FixedCli {
        async fn validate_cli(&self, cli_path: &str) -> CliInfo {
            CliInfo {
                available: true,
                version: Some("1.2.3".into()),
                path: cli_path.to_string(),
                error: None,
            }
        }

        async fn validate_lint_command(&self, _cli_path: &str) -> bool {
            true
        }
    }

    fn service() -> LspService<Backend> {
        let (service, _socket) = LspService::new(|client| {
            Backend::with_collaborators(client, Arc::new(FixedAuth), Arc::new(FixedCli))
        });
        service
    }

    #[tokio::test]
    async fn test_initialize_advertises_full_sync() {
        let service = service();
        let result = service
            .inner()
            .initialize(InitializeParams::default())
            .await
            .unwrap();

        let Some(TextDocumentSyncCapability::Options(sync)) = result.capabilities.text_document_sync
        else {
            panic!("expected sync options");
        };
        assert_eq!(sync.change, Some(TextDocumentSyncKind::FULL));
        assert_eq!(sync.open_close, Some(true));
        assert_eq!(result.server_info.unwrap().name, "api-governance-lsp");
    }

    #[tokio::test]
    async fn test_initialization_options_become_settings() {
        let service = service();
        let params = InitializeParams {
            initialization_options: Some(json!({
                "postmanGovernance": { "cliPath": "/opt/postman", "lintOnChange": true }
            })),
            ..Default::default()
        };
        service.inner().initialize(params).await.unwrap();

        let settings = service.inner().settings();
        assert_eq!(settings.cli_path, "/opt/postman");
        assert!(settings.lint_on_change);
        assert!(settings.lint_on_save);
    }

    #[tokio::test]
    async fn test_configuration_change_reconfigures() {
        let service = service();
        let backend = service.inner();
        backend
            .did_change_configuration(DidChangeConfigurationParams {
                settings: json!({ "postmanGovernance": { "maxFileSize": 10 } }),
            })
            .await;
        assert_eq!(backend.settings().max_file_size, 10);
        assert!(backend.orchestrator.has_linter().await);

        // Invalid payloads keep the previous snapshot
        backend
            .did_change_configuration(DidChangeConfigurationParams {
                settings: json!({ "postmanGovernance": { "maxFileSize": "huge" } }),
            })
            .await;
        assert_eq!(backend.settings().max_file_size, 10);
    }

    #[tokio::test]
    async fn test_custom_requests() {
        let service = service();
        let backend = service.inner();

        let auth = backend.check_auth_status().await.unwrap();
        assert!(auth.is_authenticated);
        assert_eq!(auth.profile.as_deref(), Some("default"));

        let cli = backend.get_cli_info().await.unwrap();
        assert!(cli.available);
        assert_eq!(cli.path, "postman");
        assert_eq!(cli.version.as_deref(), Some("1.2.3"));

        let unknown = LintDocumentParams {
            uri: Url::parse("file:///nowhere/api.yaml").unwrap(),
        };
        assert!(backend.lint_document(unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_lifecycle_tracks_text() {
        let service = service();
        let backend = service.inner();
        backend
            .did_change_configuration(DidChangeConfigurationParams {
                settings: json!({ "lintOnSave": false }),
            })
            .await;

        let uri = Url::parse("file:///work/api.yaml").unwrap();
        backend
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem::new(uri.clone(), "yaml".into(), 1, "a".into()),
            })
            .await;
        backend
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier::new(uri.clone(), 2),
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "openapi: 3.0.0\n".into(),
                }],
            })
            .await;
        assert_eq!(
            backend.orchestrator.document(&uri).as_deref(),
            Some("openapi: 3.0.0\n")
        );

        backend
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier::new(uri.clone()),
            })
            .await;
        assert!(backend.orchestrator.document(&uri).is_none());
    }
}
