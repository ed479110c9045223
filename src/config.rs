//! Configuration file support for stagehand.
//!
//! Settings are stored as versioned JSON: under the user config directory on
//! native targets and in `localStorage` in the browser.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_HISTORY_DEPTH, MAX_PLAYBACK_SPEED, MAX_SUGGESTION_REFRESH_SECS, MIN_PLAYBACK_SPEED,
    SUGGESTION_REFRESH_INTERVAL, TICK_INTERVAL,
};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub services: ServicesConfig,
}

fn default_app_name() -> String {
    "Stagehand".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Folder merged keyframe exports are written to; empty means the
    /// working directory
    #[serde(default)]
    pub export_folder: String,
}

/// Preview playback section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Wall-clock milliseconds between preview ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Speed multiplier the preview starts at
    #[serde(default = "default_speed")]
    pub default_speed: f64,
}

fn default_tick_interval_ms() -> u64 {
    TICK_INTERVAL.as_millis() as u64
}

fn default_speed() -> f64 {
    1.0
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            default_speed: default_speed(),
        }
    }
}

/// Undo history section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of undo steps kept
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    MAX_HISTORY_DEPTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Backend services section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Minimum seconds between automatic suggestion refreshes
    #[serde(default = "default_suggestion_refresh_secs")]
    pub suggestion_refresh_secs: u64,
}

fn default_suggestion_refresh_secs() -> u64 {
    SUGGESTION_REFRESH_INTERVAL.as_secs()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            suggestion_refresh_secs: default_suggestion_refresh_secs(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            playback: PlaybackConfig::default(),
            history: HistoryConfig::default(),
            services: ServicesConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the editor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playback.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "playback.tick_interval_ms must be positive".to_string(),
            ));
        }
        let speed = self.playback.default_speed;
        if !(MIN_PLAYBACK_SPEED..=MAX_PLAYBACK_SPEED).contains(&speed) {
            return Err(ConfigError::Invalid(format!(
                "playback.default_speed must be within {MIN_PLAYBACK_SPEED}..={MAX_PLAYBACK_SPEED}, got {speed}"
            )));
        }
        if self.history.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "history.max_depth must be at least 1".to_string(),
            ));
        }
        let refresh = self.services.suggestion_refresh_secs;
        if refresh > MAX_SUGGESTION_REFRESH_SECS {
            return Err(ConfigError::Invalid(format!(
                "services.suggestion_refresh_secs must be at most {MAX_SUGGESTION_REFRESH_SECS}, got {refresh}"
            )));
        }
        Ok(())
    }

    /// Preview tick interval as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.playback.tick_interval_ms)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "stagehand-config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("stagehand").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("stagehand")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from an explicit file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to an explicit file, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }

    /// LocalStorage key for WASM config persistence.
    #[cfg(target_arch = "wasm32")]
    const LOCALSTORAGE_KEY: &'static str = "stagehand-config";

    /// Try to load configuration from localStorage (WASM only).
    /// Returns None if not found or can't be parsed.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;

        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {:?}", e);
                None
            }
        }
    }

    /// Save configuration to localStorage (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn save_to_local_storage(&self) -> Result<(), ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))?;

        let json = self.to_json()?;

        storage
            .set_item(Self::LOCALSTORAGE_KEY, &json)
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;

        log::info!("Saved configuration to localStorage");
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let config = AppConfig::new();
        let json = config.to_json().expect("serialize");
        assert_eq!(AppConfig::from_json(&json).expect("parse"), config);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.history.max_depth, 50);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1, "playback": {"default_speed": 2.0}}"#)
            .expect("parse");
        assert_eq!(config.app_name, "Stagehand");
        assert_eq!(config.playback.default_speed, 2.0);
        assert_eq!(config.playback.tick_interval_ms, 100);
        assert_eq!(config.services.suggestion_refresh_secs, 5);
        assert_eq!(config.preferences.log_level, LogLevel::Info);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let err = AppConfig::from_json(r#"{"version": 1, "playback": {"default_speed": 5.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AppConfig::from_json(r#"{"version": 1, "history": {"max_depth": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_service_keys_ignored() {
        let config = AppConfig::from_json(
            r#"{"version": 1, "services": {"api_base_url": "http://localhost:8000", "suggestion_refresh_secs": 9}}"#,
        )
        .expect("parse");
        assert_eq!(config.services, ServicesConfig { suggestion_refresh_secs: 9 });
    }

    #[test]
    fn test_refresh_interval_bounded() {
        let err = AppConfig::from_json(
            r#"{"version": 1, "services": {"suggestion_refresh_secs": 18446744073709551615}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let config =
            AppConfig::from_json(r#"{"version": 1, "services": {"suggestion_refresh_secs": 3600}}"#)
                .unwrap();
        assert_eq!(config.services.suggestion_refresh_secs, 3600);
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::all().len(), 5);
        assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
        let level: LogLevel = serde_json::from_str(r#""trace""#).expect("parse");
        assert_eq!(level, LogLevel::Trace);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.save_to(&path).expect("save");
        assert_eq!(AppConfig::load_from(&path).expect("load"), config);
    }
}
