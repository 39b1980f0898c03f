//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module handles:
//!
//! - Reading the optional TOML configuration file from the
//!   platform-appropriate directory (or an explicit path).
//! - Providing sensible defaults when the file does not exist.
//!
//! Command-line flags are layered on top in `crate::cli`.

pub mod config;
