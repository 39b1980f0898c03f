//! Command-line interface.
//!
//! ```text
//! qrtag [--config PATH] [--camera-index N] [--reader NAME] [--no-preview] <COMMAND>
//!
//! Commands:
//!   scan-write    [--uri-pattern REGEX] [--skip-test-after-write]
//!   show-records
//! ```
//!
//! Global options override the config file; each also reads an environment
//! variable (`QRTAG_CONFIG`, `QRTAG_CAMERA_INDEX`, `QRTAG_READER`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qrtag_core::UriPattern;

use crate::infrastructure::storage::config::{load_config, load_config_from, AppConfig, ConfigError};

/// Provisioning station: scan a QR code, write its URI onto an NFC tag.
#[derive(Debug, Parser)]
#[command(
    name = "qrtag",
    about = "Scan QR codes with a camera and write their URIs onto NFC tags",
    version
)]
pub struct Cli {
    /// Configuration file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "QRTAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Camera device index.
    #[arg(long, global = true, env = "QRTAG_CAMERA_INDEX")]
    pub camera_index: Option<u32>,

    /// Use the first PC/SC reader whose name contains NAME.
    #[arg(long, global = true, env = "QRTAG_READER", value_name = "NAME")]
    pub reader: Option<String>,

    /// Scan without opening the preview window (stop with Ctrl-C).
    #[arg(long, global = true)]
    pub no_preview: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Scan QR codes and write each URI onto a touched tag, until stopped.
    ScanWrite {
        /// Only accept URIs that fully match this regular expression.
        #[arg(long, value_name = "REGEX", value_parser = parse_uri_pattern)]
        uri_pattern: Option<UriPattern>,

        /// Do not read the tag back after writing.
        #[arg(long)]
        skip_test_after_write: bool,
    },
    /// Print every NDEF record on a touched tag.
    ShowRecords,
}

impl Cli {
    /// Loads the config file (explicit path or platform default) and applies
    /// the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        };
        Ok(self.apply_overrides(config))
    }

    /// Layers the command-line flags over `config`.
    pub fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(index) = self.camera_index {
            config.camera.index = index;
        }
        if let Some(reader) = &self.reader {
            config.nfc.reader = reader.clone();
        }
        if self.no_preview {
            config.preview.enabled = false;
        }
        if let Command::ScanWrite {
            skip_test_after_write: true,
            ..
        } = self.command
        {
            config.workflow.verify_after_write = false;
        }
        config
    }
}

fn parse_uri_pattern(s: &str) -> Result<UriPattern, String> {
    UriPattern::new(s).map_err(|e| e.to_string())
}
