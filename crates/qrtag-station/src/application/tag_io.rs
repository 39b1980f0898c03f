//! The NFC tag operations the use cases rely on.

use qrtag_core::{NdefError, Record};
use thiserror::Error;

/// Error type for tag operations.
#[derive(Debug, Error)]
pub enum TagError {
    /// No reader, reader unplugged, or the smart-card service is down.
    #[error("NFC reader unavailable: {0}")]
    DeviceUnavailable(String),

    /// The touched tag has no usable NDEF area, or its contents are malformed.
    #[error("tag holds no usable NDEF data: {0}")]
    StructuredData(#[from] NdefError),

    /// The exchange with the tag failed part-way (tag pulled away, bad status).
    #[error("tag communication failed: {0}")]
    Transport(String),

    /// The wait for a tag was interrupted by the stop signal.
    #[error("waiting for a tag was cancelled")]
    Cancelled,
}

impl TagError {
    /// `true` for failures tied to the tag that was touched; another tag (or
    /// another touch) may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StructuredData(_) | Self::Transport(_))
    }
}

/// Blocking tag operations.  Each call waits for the operator to touch a tag.
pub trait TagStation {
    /// Writes `uri` as the sole NDEF record on the next touched tag, replacing
    /// whatever it held, then waits for the tag to be taken away.
    fn write_uri(&mut self, uri: &str) -> Result<(), TagError>;

    /// Reads every NDEF record from the next touched tag.
    fn get_records(&mut self) -> Result<Vec<Record>, TagError>;

    /// `true` iff the next touched tag holds a URI record that expands to
    /// `uri`, whichever prefix code it was stored with.
    fn test_uri(&mut self, uri: &str) -> Result<bool, TagError> {
        Ok(self
            .get_records()?
            .iter()
            .any(|r| r.to_uri().ok().flatten().as_deref() == Some(uri)))
    }
}
