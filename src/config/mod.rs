//! Configuration module for api-governance-lsp
//!
//! This module handles:
//! - Validation settings pushed by the editor (`postmanGovernance` section)
//! - The process-wide settings snapshot read by the orchestrator
//! - User-level defaults for the one-shot `lint` command

mod settings;
mod user_config;

pub use settings::{Settings, SettingsStore, SETTINGS_SECTION};
pub use user_config::UserConfig;
