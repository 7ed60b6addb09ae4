//! User-level configuration for api-governance-lsp
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/api-governance-lsp/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Settings;

/// Overrides `cliPath` for the `lint` and `doctor` commands; editors send their own settings
pub const CLI_PATH_ENV: &str = "POSTMAN_CLI_PATH";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub settings: Settings,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/api-governance-lsp/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
            .unwrap_or_default();

        if let Ok(path) = std::env::var(CLI_PATH_ENV) {
            if !path.trim().is_empty() {
                config.settings.cli_path = path;
            }
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("api-governance-lsp").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[settings]
cliPath = "/usr/local/bin/postman"
maxFileSize = 2048
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.settings.cli_path, "/usr/local/bin/postman");
        assert_eq!(config.settings.max_file_size, 2048);
        assert!(config.settings.lint_on_save);
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_invalid_toml_does_not_crash() {
        let result = toml::from_str::<UserConfig>("this is [[ not valid toml {{{}}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_user_config_path() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("api-governance-lsp/config.toml"));
        }
    }
}
