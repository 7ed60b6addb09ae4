//! Language server over stdio
//!
//! Publishes Postman governance issues as diagnostics for OpenAPI/Swagger
//! documents and exposes a few custom requests for the editor extension.
//!
//! # Usage
//!
//! ```bash
//! api-governance-lsp serve
//! ```
//!
//! # Custom requests
//!
//! - `postmanGovernance/lintDocument` `{uri}` - Lint an open document now
//! - `postmanGovernance/checkAuthStatus` - Report whether a Postman API key is available
//! - `postmanGovernance/getCliInfo` - Report the configured CLI and its version

mod backend;
pub mod params;

pub use backend::Backend;

use tower_lsp::{LspService, Server};
use tracing::info;

/// Run the language server until the client disconnects
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(params::LINT_DOCUMENT, Backend::lint_document)
        .custom_method(params::CHECK_AUTH_STATUS, Backend::check_auth_status)
        .custom_method(params::GET_CLI_INFO, Backend::get_cli_info)
        .finish();

    info!("api-governance-lsp {} listening on stdio", env!("CARGO_PKG_VERSION"));
    Server::new(stdin, stdout, socket).serve(service).await;
}
