//! Application layer use cases for the provisioning station.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (`qrtag_core`: frames, patterns, NDEF records) and the infrastructure
//! (camera, preview window, NFC reader, config file).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "turn the QR
//!   code in front of the camera into a URI record on the tag being touched").
//! - **Depend on abstractions** (traits) rather than concrete devices, so the
//!   workflow runs unchanged against a webcam or against a scripted mock.
//! - **Contain no device calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`detect_qr`**     – Pulls frames until one holds an acceptable URI.
//! - **`tag_io`**        – The [`tag_io::TagStation`] abstraction over the NFC reader.
//! - **`provision`**     – The SCAN → WRITE → VERIFY → DONE state machine.
//! - **`show_records`**  – One-shot "print what is on this tag".
//! - **`events`**        – Progress events reported to the operator.
//! - **`stop_signal`**   – Shared cancellation flag (Ctrl-C, preview `q`).

pub mod detect_qr;
pub mod events;
pub mod provision;
pub mod show_records;
pub mod stop_signal;
pub mod tag_io;
