//! LSP server command handler

use anyhow::{Context, Result};

/// Run the language server on stdio until the client disconnects
pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(crate::lsp::run_server());
    Ok(())
}
