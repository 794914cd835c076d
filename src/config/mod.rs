//! Configuration module for HID Console
//!
//! User preferences persisted between runs: the last session settings, the
//! device list filters, log display options and the UI theme.
//!
//! # App Data Location
//!
//! Preferences are stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.hidconsole.hid-console/`
//! - **macOS**: `~/Library/Application Support/dev.hidconsole.hid-console/`
//! - **Windows**: `%APPDATA%\dev.hidconsole.hid-console\`
//!
//! # Files
//!
//! - `config.json` - the serialized [`AppConfig`]
//!
//! # Example
//!
//! ```ignore
//! use hid_console::config::AppConfig;
//!
//! let mut config = AppConfig::load_or_default();
//! config.session.frame_size = 64;
//! config.save()?;
//! ```

use crate::backend::registry::DeviceFilter;
use crate::error::{HidConsoleError, Result, ResultExt};
use crate::types::{DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE, MIN_FRAME_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hidconsole.hid-console";

/// Config filename
pub const CONFIG_FILE: &str = "config.json";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        HidConsoleError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            HidConsoleError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Sections ====================

/// Settings used for the next open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Report length in bytes
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Device selected when the app last closed
    #[serde(default)]
    pub last_device_path: Option<String>,
}

fn default_frame_size() -> usize {
    DEFAULT_FRAME_SIZE
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            last_device_path: None,
        }
    }
}

/// Response log display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Prefix entries with their receipt time
    #[serde(default)]
    pub show_timestamp: bool,
    /// Oldest entries are dropped past this count; unbounded when unset
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// UI preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default)]
    pub dark_mode: bool,
}

// ==================== App Config ====================

/// Everything persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub devices: DeviceFilter,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub ui: UiPreferences,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            HidConsoleError::Config("Could not determine config path".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            HidConsoleError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;

        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            HidConsoleError::Config(format!("Failed to parse config {:?}: {}", path, e))
        })?;
        config.sanitize();
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir().context("Failed to save config")?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    /// Save config to `path` as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HidConsoleError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| HidConsoleError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            HidConsoleError::Config(format!("Failed to write config {:?}: {}", path, e))
        })
    }

    /// Clamp values a hand-edited file may have put out of range
    fn sanitize(&mut self) {
        let clamped = self.session.frame_size.clamp(MIN_FRAME_SIZE, MAX_FRAME_SIZE);
        if clamped != self.session.frame_size {
            tracing::warn!(
                "Configured frame size {} out of range, using {}",
                self.session.frame_size,
                clamped
            );
            self.session.frame_size = clamped;
        }
        if self.log.max_entries == Some(0) {
            self.log.max_entries = None;
        }
    }
}
