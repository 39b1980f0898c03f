//! Progress events the use cases emit for the operator.
//!
//! The use cases never print. They hand a [`StationEvent`] to a
//! [`StatusReporter`]; the console adapter turns it into coloured text and
//! tests record it for assertions.

use qrtag_core::Record;

/// Why a verification pass did not confirm the written URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyFailure {
    /// The tag was read but does not hold the expected URI record.
    Mismatch,
    /// The tag could not be read.
    ReadError(String),
}

/// Something the operator should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationEvent {
    /// The camera is running and waiting for a QR code.
    AwaitingQr,
    /// An acceptable URI was decoded from the camera feed.
    UriDetected(String),
    /// Waiting for a tag to be touched so `uri` can be written.
    AwaitingWriteTouch(String),
    WriteSucceeded(String),
    WriteFailed { uri: String, reason: String },
    /// Waiting for the tag to be touched again for read-back.
    AwaitingVerifyTouch(String),
    VerifySucceeded(String),
    VerifyFailed { uri: String, reason: VerifyFailure },
    /// One tag completed the whole cycle.
    Provisioned(String),
    /// Waiting for a tag to be touched so its records can be listed.
    AwaitingReadTouch,
    RecordsRead(Vec<Record>),
    /// The touched tag holds no readable NDEF data.
    NoStructuredData(String),
    /// The operator asked to stop.
    Cancelled,
}

/// Receives progress events from the use cases.
pub trait StatusReporter {
    fn report(&mut self, event: StationEvent);
}

/// Keeps every event in memory, in order. Used by tests and by callers that
/// want a transcript of a session.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Vec<StationEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[StationEvent] {
        &self.events
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&mut self, event: StationEvent) {
        self.events.push(event);
    }
}
