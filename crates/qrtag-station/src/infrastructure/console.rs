//! Operator-facing console output.

use colored::Colorize;
use qrtag_core::Record;

use crate::application::events::{StationEvent, StatusReporter, VerifyFailure};

/// How a message should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Prompt,
    Success,
    Failure,
    Info,
}

/// Prints station events to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl StatusReporter for ConsoleReporter {
    fn report(&mut self, event: StationEvent) {
        let (tone, text) = render(&event);
        let line = match tone {
            Tone::Prompt => text.cyan().bold(),
            Tone::Success => text.green(),
            Tone::Failure => text.red().bold(),
            Tone::Info => text.normal(),
        };
        println!("{line}");
    }
}

/// Plain-text rendering of `event`.
pub fn render(event: &StationEvent) -> (Tone, String) {
    match event {
        StationEvent::AwaitingQr => (
            Tone::Prompt,
            "Show a QR code to the camera (press q in the preview or Ctrl-C to quit)".to_string(),
        ),
        StationEvent::UriDetected(uri) => (Tone::Success, format!("QR code detected: {uri}")),
        StationEvent::AwaitingWriteTouch(uri) => (
            Tone::Prompt,
            format!("Touch a tag to the reader to write {uri}"),
        ),
        StationEvent::WriteSucceeded(uri) => (Tone::Success, format!("Wrote {uri}")),
        StationEvent::WriteFailed { uri, reason } => {
            (Tone::Failure, format!("Could not write {uri}: {reason}"))
        }
        StationEvent::AwaitingVerifyTouch(_) => (
            Tone::Prompt,
            "Touch the tag again to check what was written".to_string(),
        ),
        StationEvent::VerifySucceeded(uri) => (Tone::Success, format!("Verified {uri}")),
        StationEvent::VerifyFailed { uri, reason } => {
            let why = match reason {
                VerifyFailure::Mismatch => "the tag does not hold it".to_string(),
                VerifyFailure::ReadError(e) => e.clone(),
            };
            (Tone::Failure, format!("Verification of {uri} failed: {why}"))
        }
        StationEvent::Provisioned(uri) => (Tone::Success, format!("Tag ready: {uri}")),
        StationEvent::AwaitingReadTouch => (
            Tone::Prompt,
            "Touch a tag to the reader to list its records".to_string(),
        ),
        StationEvent::RecordsRead(records) => (Tone::Info, render_records(records)),
        StationEvent::NoStructuredData(reason) => {
            (Tone::Failure, format!("No NDEF data on this tag: {reason}"))
        }
        StationEvent::Cancelled => (Tone::Info, "Stopped.".to_string()),
    }
}

fn render_records(records: &[Record]) -> String {
    if records.is_empty() {
        return "The tag holds an empty NDEF message".to_string();
    }
    records
        .iter()
        .enumerate()
        .map(|(i, record)| format!("[{}] {record}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
