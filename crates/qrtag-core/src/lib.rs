//! # qrtag-core
//!
//! Shared library for qrtag containing the camera frame type, the
//! newest-wins frame slot, URI pattern matching, and the NDEF codec.
//!
//! It has zero dependencies on cameras, windows, or smart-card readers.
//!
//! # Architecture overview (for beginners)
//!
//! qrtag is a provisioning station: point a camera at a QR code, touch an NFC
//! tag to the reader, and the URI from the QR code is written onto the tag.
//!
//! This crate is the device-free foundation:
//!
//! - **`domain`** – [`Frame`] and the [`UriPattern`] rules that decide which
//!   decoded QR payloads are acceptable.
//!
//! - **`buffer`** – [`LatestSlot`], the single-slot handoff between the
//!   camera thread and the detector: a new frame overwrites an unread one.
//!
//! - **`ndef`** – how a URI becomes bytes on a tag: NDEF records and
//!   messages, Type 2 TLV blocks, and the capability container.

pub mod buffer;
pub mod domain;
pub mod ndef;

pub use buffer::{LatestSlot, PutOutcome};
pub use domain::frame::{Frame, FrameSizeError};
pub use domain::pattern::{select_candidate, PatternError, UriPattern};
pub use ndef::{NdefError, Record, Tnf};
