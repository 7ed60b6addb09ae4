//! api-governance-lsp - Postman API governance diagnostics for editors
//!
//! Runs `postman api lint` against OpenAPI/Swagger documents, parses the
//! tool's table output, scores the issues and publishes them as LSP
//! diagnostics.

pub mod auth;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod external;
pub mod lsp;
pub mod models;
pub mod orchestrator;
pub mod reporters;
pub mod scoring;
