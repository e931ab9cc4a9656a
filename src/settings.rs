use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const APP_DIR: &str = "quant_dashboard";
pub const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Location of the key-value storage file. When absent the file lives
    /// under the user's config directory.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Storage key of the main dashboard layout.
    #[serde(default = "default_dashboard_key")]
    pub dashboard_key: String,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(i32, i32)>,
}

fn default_dashboard_key() -> String {
    crate::dashboard::DEFAULT_STORAGE_KEY.to_string()
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_path: None,
            dashboard_key: default_dashboard_key(),
            debug_logging: false,
            log_file: None,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            window_size: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Storage file to open: the configured path, else
    /// `<config dir>/quant_dashboard/storage.json`, else a file in the
    /// working directory.
    pub fn storage_file(&self) -> PathBuf {
        if let Some(path) = &self.storage_path {
            return path.clone();
        }
        dirs_next::config_dir()
            .map(|dir| dir.join(APP_DIR).join(STORAGE_FILE))
            .unwrap_or_else(|| PathBuf::from(STORAGE_FILE))
    }
}
