//! TOML-based configuration for the provisioning station.
//!
//! The file is optional.  When present it is read from:
//! - Windows:  `%APPDATA%\qrtag\config.toml`
//! - Linux:    `~/.config/qrtag/config.toml`
//! - macOS:    `~/Library/Application Support/qrtag/config.toml`
//!
//! or from the path given with `--config`.  Example:
//!
//! ```toml
//! [camera]
//! index = 1
//!
//! [nfc]
//! reader = "ACR122"
//!
//! [workflow]
//! verify_after_write = false
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "some_fn")]` and every section is
//! `#[serde(default)]`, so a file only needs the settings it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::preview::DEFAULT_WINDOW_TITLE;

/// Why a configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `APPDATA`, `HOME` nor `XDG_CONFIG_HOME` points anywhere.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// Reading the file failed for a reason other than "not found".
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has a field of the wrong type.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Top-level station configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub nfc: NfcConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    /// Capture device index as enumerated by the OS.
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewConfig {
    /// Show the live preview window while scanning.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_window_title")]
    pub window_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NfcConfig {
    /// Substring of the PC/SC reader name.  Empty selects the first reader.
    #[serde(default)]
    pub reader: String,
    /// How often a waiting reader checks for Ctrl-C, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    /// Read each tag back after writing it.
    #[serde(default = "default_true")]
    pub verify_after_write: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_window_title() -> String {
    DEFAULT_WINDOW_TITLE.to_string()
}
fn default_poll_interval_ms() -> u64 {
    250
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            window_title: default_window_title(),
        }
    }
}

impl Default for NfcConfig {
    fn default() -> Self {
        Self {
            reader: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            verify_after_write: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Resolves the full path of the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the platform config file, or defaults when there is none.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    match config_file_path() {
        Ok(path) => load_config_from(&path),
        Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
        Err(e) => Err(e),
    }
}

/// Loads `path`, returning `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config base directory plus the `qrtag` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("qrtag"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("qrtag"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("qrtag")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.camera.index, 0);
        assert!(cfg.preview.enabled);
        assert_eq!(cfg.preview.window_title, "QR Code Detector (Press q to exit)");
        assert_eq!(cfg.nfc.reader, "");
        assert_eq!(cfg.nfc.poll_interval_ms, 250);
        assert!(cfg.workflow.verify_after_write);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_fields() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [camera]
            index = 2

            [nfc]
            reader = "ACR122"
            "#,
        )
        .expect("deserialize");

        assert_eq!(cfg.camera.index, 2);
        assert_eq!(cfg.nfc.reader, "ACR122");
        assert_eq!(cfg.nfc.poll_interval_ms, 250);
        assert!(cfg.preview.enabled);
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        let mut cfg = AppConfig::default();
        cfg.workflow.verify_after_write = false;
        cfg.logging.level = "debug".to_string();

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("qrtag-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[camera\nindex = ").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("qrtag-definitely-missing/config.toml");

        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }
}
