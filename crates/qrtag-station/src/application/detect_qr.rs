//! Use case: watch the camera until a QR code yields an acceptable URI.
//!
//! # How detection works (for beginners)
//!
//! The camera delivers frames far faster than a QR decoder can process them,
//! so the detector always works on the *newest* frame (see
//! `qrtag_core::LatestSlot`).  For each frame it:
//!
//! 1. Checks whether the operator asked to stop (Ctrl-C).
//! 2. Asks the [`QrDecoder`] for every QR payload in the frame.
//! 3. Returns the first payload that is a URI accepted by the optional
//!    [`UriPattern`].
//! 4. Otherwise shows the frame in the [`Preview`] and checks whether the
//!    operator pressed the quit key.
//!
//! The preview is closed on every exit path, success or not.

use qrtag_core::{select_candidate, Frame, UriPattern};
use thiserror::Error;
use tracing::{debug, info};

use super::stop_signal::StopSignal;

/// Why detection ended without a URI.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The operator pressed the quit key or sent Ctrl-C.
    #[error("QR scan cancelled by the operator")]
    Cancelled,
    /// The frame source stopped delivering frames (camera unplugged or failed).
    #[error("camera stopped delivering frames")]
    SourceClosed,
}

/// A stream of camera frames.
pub trait FrameFeed {
    /// Blocks until the next frame is available.
    ///
    /// Returns `None` once the source has closed and will never deliver again.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Finds and decodes QR codes in a frame.
pub trait QrDecoder {
    /// Returns the payload of every QR code found in `frame`, in detection
    /// order.  Codes that were located but failed to decode are reported as
    /// empty strings.
    fn decode_multi(&self, frame: &Frame) -> Vec<String>;
}

/// Live preview shown to the operator while scanning.
pub trait Preview {
    fn show(&mut self, frame: &Frame);
    /// `true` once the operator asked to quit through the preview.
    fn stop_requested(&mut self) -> bool;
    fn close(&mut self);
}

/// Something that produces one URI per call.  The provisioning workflow only
/// sees this trait.
pub trait UriScanner {
    fn scan(&mut self) -> Result<String, ScanError>;
}

/// Camera-backed QR detector.
pub struct QrDetector {
    feed: Box<dyn FrameFeed>,
    decoder: Box<dyn QrDecoder>,
    preview: Box<dyn Preview>,
    stop: StopSignal,
}

impl QrDetector {
    pub fn new(
        feed: Box<dyn FrameFeed>,
        decoder: Box<dyn QrDecoder>,
        preview: Box<dyn Preview>,
        stop: StopSignal,
    ) -> Self {
        Self {
            feed,
            decoder,
            preview,
            stop,
        }
    }

    /// Blocks until a frame contains a URI accepted by `pattern` (any URI when
    /// `None`) and returns it.
    ///
    /// Non-matching payloads are ignored and scanning continues, so a pattern
    /// that nothing matches keeps scanning until the operator stops it.
    ///
    /// # Errors
    ///
    /// [`ScanError::Cancelled`] when the operator quits through the preview or
    /// the stop signal; [`ScanError::SourceClosed`] when the camera is gone.
    pub fn detect(&mut self, pattern: Option<&UriPattern>) -> Result<String, ScanError> {
        let result = self.detect_loop(pattern);
        self.preview.close();
        result
    }

    fn detect_loop(&mut self, pattern: Option<&UriPattern>) -> Result<String, ScanError> {
        loop {
            if self.stop.is_requested() {
                return Err(ScanError::Cancelled);
            }

            let frame = self.feed.next_frame().ok_or(ScanError::SourceClosed)?;
            let decoded = self.decoder.decode_multi(&frame);

            if let Some(uri) = select_candidate(&decoded, pattern) {
                info!(frame = frame.seq(), %uri, "QR code accepted");
                return Ok(uri);
            }
            if decoded.iter().any(|s| !s.is_empty()) {
                debug!(
                    frame = frame.seq(),
                    count = decoded.len(),
                    "ignoring QR payloads that are not acceptable URIs"
                );
            }

            self.preview.show(&frame);
            if self.preview.stop_requested() {
                info!("quit requested from the preview window");
                return Err(ScanError::Cancelled);
            }
        }
    }
}

/// [`UriScanner`] that runs a [`QrDetector`] with a fixed pattern.
pub struct CameraScanner {
    detector: QrDetector,
    pattern: Option<UriPattern>,
}

impl CameraScanner {
    pub fn new(detector: QrDetector, pattern: Option<UriPattern>) -> Self {
        Self { detector, pattern }
    }
}

impl UriScanner for CameraScanner {
    fn scan(&mut self) -> Result<String, ScanError> {
        self.detector.detect(self.pattern.as_ref())
    }
}
