//! ProvisioningWorkflow: the scan → write → verify loop that provisions one
//! tag after another.
//!
//! # State machine (for beginners)
//!
//! ```text
//!            cancelled
//!   ┌──────────────────────────────────────────────► EXIT
//!   │
//! SCAN ──uri──► WRITE ──ok──► VERIFY ──match──► DONE ──┐
//!   ▲             │             │                      │
//!   │             │ failed      │ mismatch / failed    │
//!   └─────────────┴─────────────┴──────────────────────┘
//! ```
//!
//! With verification turned off, WRITE goes straight to DONE.  A cancelled
//! tag wait (Ctrl-C) in WRITE or VERIFY also leads to EXIT.  Errors that make
//! further progress impossible (camera gone, reader gone) end the run with a
//! [`WorkflowError`].

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    detect_qr::{ScanError, UriScanner},
    events::{StationEvent, StatusReporter, VerifyFailure},
    tag_io::{TagError, TagStation},
};

/// The workflow's position.  Every state except `Scan` and `Exit` carries the
/// URI being provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionState {
    Scan,
    Write(String),
    Verify(String),
    Done(String),
    Exit,
}

/// A failure that ends the provisioning session.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("QR scanning stopped: {0}")]
    Scan(ScanError),
    #[error("NFC reader failed: {0}")]
    Tag(TagError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Read the tag back after each write.
    pub verify_after_write: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            verify_after_write: true,
        }
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub provisioned: u32,
    pub failed_writes: u32,
    pub failed_verifications: u32,
}

/// Drives the provisioning state machine.
pub struct ProvisioningWorkflow<S, T, R> {
    scanner: S,
    tags: T,
    reporter: R,
    options: WorkflowOptions,
    summary: SessionSummary,
}

impl<S, T, R> ProvisioningWorkflow<S, T, R>
where
    S: UriScanner,
    T: TagStation,
    R: StatusReporter,
{
    pub fn new(scanner: S, tags: T, reporter: R, options: WorkflowOptions) -> Self {
        Self {
            scanner,
            tags,
            reporter,
            options,
            summary: SessionSummary::default(),
        }
    }

    /// Runs from SCAN until EXIT.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the camera or the reader fails in a way
    /// no further touch can fix.
    pub fn run(&mut self) -> Result<SessionSummary, WorkflowError> {
        let mut state = ProvisionState::Scan;
        while state != ProvisionState::Exit {
            let next = self.step(state)?;
            debug!(?next, "provisioning state transition");
            state = next;
        }
        info!(
            provisioned = self.summary.provisioned,
            failed_writes = self.summary.failed_writes,
            failed_verifications = self.summary.failed_verifications,
            "provisioning session ended"
        );
        Ok(self.summary)
    }

    /// Performs the work of `state` and returns the state to move to.
    pub fn step(&mut self, state: ProvisionState) -> Result<ProvisionState, WorkflowError> {
        match state {
            ProvisionState::Scan => self.on_scan(),
            ProvisionState::Write(uri) => self.on_write(uri),
            ProvisionState::Verify(uri) => self.on_verify(uri),
            ProvisionState::Done(uri) => Ok(self.on_done(uri)),
            ProvisionState::Exit => Ok(ProvisionState::Exit),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_parts(self) -> (S, T, R) {
        (self.scanner, self.tags, self.reporter)
    }

    fn on_scan(&mut self) -> Result<ProvisionState, WorkflowError> {
        self.reporter.report(StationEvent::AwaitingQr);
        match self.scanner.scan() {
            Ok(uri) => {
                self.reporter.report(StationEvent::UriDetected(uri.clone()));
                Ok(ProvisionState::Write(uri))
            }
            Err(ScanError::Cancelled) => {
                self.reporter.report(StationEvent::Cancelled);
                Ok(ProvisionState::Exit)
            }
            Err(e) => Err(WorkflowError::Scan(e)),
        }
    }

    fn on_write(&mut self, uri: String) -> Result<ProvisionState, WorkflowError> {
        self.reporter
            .report(StationEvent::AwaitingWriteTouch(uri.clone()));
        match self.tags.write_uri(&uri) {
            Ok(()) => {
                info!(%uri, "URI written to tag");
                self.reporter.report(StationEvent::WriteSucceeded(uri.clone()));
                if self.options.verify_after_write {
                    Ok(ProvisionState::Verify(uri))
                } else {
                    Ok(ProvisionState::Done(uri))
                }
            }
            Err(TagError::Cancelled) => {
                self.reporter.report(StationEvent::Cancelled);
                Ok(ProvisionState::Exit)
            }
            Err(e) if e.is_recoverable() => {
                warn!(%uri, error = %e, "write failed, back to scanning");
                self.summary.failed_writes += 1;
                self.reporter.report(StationEvent::WriteFailed {
                    uri,
                    reason: e.to_string(),
                });
                Ok(ProvisionState::Scan)
            }
            Err(e) => Err(WorkflowError::Tag(e)),
        }
    }

    fn on_verify(&mut self, uri: String) -> Result<ProvisionState, WorkflowError> {
        self.reporter
            .report(StationEvent::AwaitingVerifyTouch(uri.clone()));
        let failure = match self.tags.test_uri(&uri) {
            Ok(true) => {
                self.reporter
                    .report(StationEvent::VerifySucceeded(uri.clone()));
                return Ok(ProvisionState::Done(uri));
            }
            Ok(false) => VerifyFailure::Mismatch,
            Err(TagError::Cancelled) => {
                self.reporter.report(StationEvent::Cancelled);
                return Ok(ProvisionState::Exit);
            }
            Err(e) => VerifyFailure::ReadError(e.to_string()),
        };

        warn!(%uri, reason = ?failure, "verification failed, back to scanning");
        self.summary.failed_verifications += 1;
        self.reporter.report(StationEvent::VerifyFailed {
            uri,
            reason: failure,
        });
        Ok(ProvisionState::Scan)
    }

    fn on_done(&mut self, uri: String) -> ProvisionState {
        self.summary.provisioned += 1;
        self.reporter.report(StationEvent::Provisioned(uri));
        ProvisionState::Scan
    }
}
