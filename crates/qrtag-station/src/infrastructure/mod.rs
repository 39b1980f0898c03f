//! Infrastructure layer for the provisioning station.
//!
//! Contains the device-facing adapters: camera capture, QR decoding, the
//! preview window, the NFC reader, the config file, the console reporter,
//! and the Ctrl-C hook.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `qrtag_core`, but MUST NOT be imported by the `application` layer.
//!
//! Adapters that link native libraries are compiled only with the
//! `hardware` feature; each has a mock or headless sibling that is always
//! available.

pub mod camera;
pub mod console;
pub mod nfc;
pub mod preview;
pub mod qr_decode;
pub mod signal;
pub mod storage;
