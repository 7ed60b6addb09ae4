//! Validation settings and their shared snapshot

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Key under which editors nest our settings in `workspace/didChangeConfiguration`
pub const SETTINGS_SECTION: &str = "postmanGovernance";

/// Validation settings
///
/// Missing fields take their defaults, so a partial object from the editor
/// is overlaid onto [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enable: bool,
    pub cli_path: String,
    pub lint_on_save: bool,
    pub lint_on_change: bool,
    /// Debounce delay in milliseconds
    pub lint_on_change_delay: u64,
    /// Largest document, in bytes, that will be linted
    pub max_file_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable: true,
            cli_path: "postman".to_string(),
            lint_on_save: true,
            lint_on_change: false,
            lint_on_change_delay: 500,
            max_file_size: 1_048_576,
        }
    }
}

impl Settings {
    /// Read settings from a configuration payload.
    ///
    /// Accepts either `{"postmanGovernance": {...}}` or the bare settings
    /// object; `null` yields the defaults.
    pub fn from_configuration(value: &Value) -> Result<Self, serde_json::Error> {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        if section.is_null() {
            return Ok(Self::default());
        }
        Settings::deserialize(section)
    }
}

/// Process-wide settings snapshot.
///
/// Writers replace the whole value; readers get an `Arc` to one complete
/// snapshot and never observe a partial update.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    tx: Arc<watch::Sender<Arc<Settings>>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Arc<Settings> {
        Arc::clone(&*self.tx.borrow())
    }

    pub fn replace(&self, settings: Settings) {
        self.tx.send_replace(Arc::new(settings));
    }
}
