//! Custom request names and parameters exposed to the editor extension

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;

pub const LINT_DOCUMENT: &str = "postmanGovernance/lintDocument";
pub const CHECK_AUTH_STATUS: &str = "postmanGovernance/checkAuthStatus";
pub const GET_CLI_INFO: &str = "postmanGovernance/getCliInfo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintDocumentParams {
    pub uri: Url,
}
