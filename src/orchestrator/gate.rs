//! Pre-flight checks deciding whether a document is worth linting

use memchr::memmem;
use std::path::Path;
use tower_lsp::lsp_types::Url;

use crate::config::Settings;

/// Extensions the Postman CLI can lint
pub const SUPPORTED_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Substrings that mark a document as an OpenAPI/Swagger definition
const API_SPEC_MARKERS: &[&str] = &["openapi:", "\"openapi\"", "swagger:", "\"swagger\""];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Run,
    Disabled,
    TooLarge,
    UnsupportedType,
    NotApiSpec,
}

impl GateDecision {
    /// Whether skipping should also clear stale diagnostics
    pub fn clears_diagnostics(self) -> bool {
        matches!(self, GateDecision::TooLarge | GateDecision::NotApiSpec)
    }
}

pub fn is_supported_document(uri: &Url) -> bool {
    Path::new(uri.path())
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

pub fn has_api_spec_marker(content: &str) -> bool {
    let haystack = content.as_bytes();
    API_SPEC_MARKERS
        .iter()
        .any(|m| memmem::find(haystack, m.as_bytes()).is_some())
}

pub fn gate(settings: &Settings, uri: &Url, content: &str) -> GateDecision {
    if !settings.enable {
        GateDecision::Disabled
    } else if content.len() > settings.max_file_size {
        GateDecision::TooLarge
    } else if !is_supported_document(uri) {
        GateDecision::UnsupportedType
    } else if !has_api_spec_marker(content) {
        GateDecision::NotApiSpec
    } else {
        GateDecision::Run
    }
}
