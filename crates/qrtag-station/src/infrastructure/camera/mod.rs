//! Camera capture infrastructure.
//!
//! A [`FrameGrabber`] pulls one frame at a time from a device.  The
//! [`frame_source::ThreadedFrameSource`] runs a grabber on a dedicated
//! thread and hands frames to the detector through a newest-wins slot, so a
//! slow detector always sees the most recent image instead of a backlog.
//!
//! # Testability
//!
//! The `FrameGrabber` trait lets tests feed scripted frames
//! ([`mock::ScriptedGrabber`]) without a webcam.

use qrtag_core::{Frame, FrameSizeError};
use thiserror::Error;

pub mod frame_source;
pub mod mock;

#[cfg(feature = "hardware")]
pub mod nokhwa;

/// Error type for camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The device could not be opened (absent, busy, or permission denied).
    #[error("camera {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    /// The device stopped delivering frames.
    #[error("frame capture failed: {0}")]
    Capture(String),

    /// One frame could not be decoded (a damaged MJPEG frame, say); the
    /// device itself is still streaming.
    #[error("frame could not be decoded: {0}")]
    CorruptFrame(String),

    #[error("camera returned a malformed frame: {0}")]
    BadFrame(#[from] FrameSizeError),

    /// The OS refused to start the capture thread.
    #[error("failed to start capture thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

impl CameraError {
    /// `true` when only the current frame is lost and the next grab may
    /// succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CorruptFrame(_) | Self::BadFrame(_))
    }
}

/// Pulls frames from one capture device.
///
/// Implementations release the device when dropped.
pub trait FrameGrabber {
    /// Blocks until the device produces the next frame.
    fn grab(&mut self) -> Result<Frame, CameraError>;

    /// Human-readable device name for logs.
    fn describe(&self) -> String;
}
