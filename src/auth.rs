//! Postman authentication lookup
//!
//! The Postman CLI keeps logged-in profiles in `~/.postman/postmanrc`:
//!
//! ```json
//! {
//!   "login": {
//!     "_defaultProfile": "default",
//!     "_profiles": [
//!       { "alias": "default", "username": "jane", "postmanApiKey": "PMAK-..." }
//!     ]
//!   }
//! }
//! ```
//!
//! `POSTMAN_API_KEY` in the server's environment takes priority over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::external::API_KEY_ENV;

const DEFAULT_ALIAS: &str = "default";

/// Authentication state as reported to the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    /// Never sent back to the editor
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn authenticated(api_key: String, profile: Option<String>) -> Self {
        Self {
            is_authenticated: true,
            api_key: Some(api_key),
            profile,
            error: None,
        }
    }

    pub fn missing(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

pub trait AuthProvider: Send + Sync {
    fn auth_status(&self) -> AuthStatus;
}

#[derive(Debug, Deserialize)]
struct PostmanRc {
    #[serde(default)]
    login: Option<Login>,
}

#[derive(Debug, Deserialize)]
struct Login {
    #[serde(rename = "_defaultProfile", default)]
    default_profile: Option<String>,
    #[serde(rename = "_profiles", default)]
    profiles: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    alias: Option<String>,
    #[serde(rename = "postmanApiKey", default)]
    api_key: Option<String>,
}

/// Reads credentials from the Postman CLI profile store
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    read_env: bool,
}

impl ProfileStore {
    /// Profile store in the user's home directory, with env override
    pub fn from_home() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".postman")
            .join("postmanrc");
        Self {
            path,
            read_env: true,
        }
    }

    /// Profile store at an explicit path, ignoring the environment
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_env: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_profile(&self) -> Result<(String, String), String> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            format!(
                "Not logged in: cannot read {} ({}). Run `postman login`.",
                self.path.display(),
                e
            )
        })?;
        let rc: PostmanRc = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid profile store {}: {}", self.path.display(), e))?;
        let login = rc
            .login
            .ok_or_else(|| "Not logged in. Run `postman login`.".to_string())?;

        let wanted = login.default_profile.as_deref().unwrap_or(DEFAULT_ALIAS);
        let with_key = |p: &&Profile| p.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());

        let profile = login
            .profiles
            .iter()
            .filter(with_key)
            .find(|p| p.alias.as_deref() == Some(wanted))
            .or_else(|| login.profiles.iter().find(with_key))
            .ok_or_else(|| "No API key found in profile store. Run `postman login`.".to_string())?;

        Ok((
            profile.alias.clone().unwrap_or_else(|| DEFAULT_ALIAS.to_string()),
            profile.api_key.clone().unwrap_or_default(),
        ))
    }
}

impl AuthProvider for ProfileStore {
    fn auth_status(&self) -> AuthStatus {
        if self.read_env {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                if !key.trim().is_empty() {
                    return AuthStatus::authenticated(key, Some("environment".to_string()));
                }
            }
        }

        match self.read_profile() {
            Ok((alias, key)) => AuthStatus::authenticated(key, Some(alias)),
            Err(e) => AuthStatus::missing(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(content: &str) -> (tempfile::TempDir, ProfileStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("postmanrc");
        std::fs::write(&path, content).unwrap();
        (dir, ProfileStore::at(path))
    }

    #[test]
    fn test_default_profile_is_preferred() {
        let (_dir, store) = store_with(
            r#"{"login":{"_defaultProfile":"work","_profiles":[
                {"alias":"personal","postmanApiKey":"PMAK-personal"},
                {"alias":"work","postmanApiKey":"PMAK-work"}
            ]}}"#,
        );
        let status = store.auth_status();
        assert!(status.is_authenticated);
        assert_eq!(status.api_key.as_deref(), Some("PMAK-work"));
        assert_eq!(status.profile.as_deref(), Some("work"));
    }

    #[test]
    fn test_falls_back_to_first_profile_with_key() {
        let (_dir, store) = store_with(
            r#"{"login":{"_profiles":[
                {"alias":"empty","postmanApiKey":""},
                {"alias":"other","postmanApiKey":"PMAK-other"}
            ]}}"#,
        );
        let status = store.auth_status();
        assert_eq!(status.api_key.as_deref(), Some("PMAK-other"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let status = ProfileStore::at(dir.path().join("nope")).auth_status();
        assert!(!status.is_authenticated);
        assert!(status.api_key.is_none());
        assert!(status.error.unwrap().contains("Not logged in"));
    }

    #[test]
    fn test_no_profiles() {
        let (_dir, store) = store_with(r#"{"login":{"_profiles":[]}}"#);
        let status = store.auth_status();
        assert!(!status.is_authenticated);
        assert!(status.error.unwrap().contains("No API key"));
    }

    #[test]
    fn test_garbage_file() {
        let (_dir, store) = store_with("not json");
        let status = store.auth_status();
        assert!(!status.is_authenticated);
        assert!(status.error.unwrap().contains("Invalid profile store"));
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let status = AuthStatus::authenticated("PMAK-secret".into(), Some("default".into()));
        let json = serde_json::to_string(&status).unwrap();
        assert!(!json.contains("PMAK-secret"));
        assert!(json.contains("\"isAuthenticated\":true"));
    }
}
