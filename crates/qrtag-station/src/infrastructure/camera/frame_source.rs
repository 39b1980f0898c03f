//! Background frame capture with newest-wins delivery.
//!
//! # Threading model
//!
//! The grabber is opened *on* the capture thread, because some camera
//! backends hand out handles that must stay on the thread that created them.
//! The thread reports whether opening worked through a one-shot channel, so
//! [`ThreadedFrameSource::start`] still fails synchronously when the device
//! cannot be opened.
//!
//! After that the thread loops `grab → put` into a [`LatestSlot`] until the
//! stop flag is set or the device fails.  A frame that fails to decode is
//! skipped; only a run of [`MAX_CONSECUTIVE_CORRUPT_FRAMES`] of them counts as
//! a device failure.  Either way it closes the slot on
//! exit, which wakes a consumer blocked in [`ThreadedFrameSource::read`].

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    thread::JoinHandle,
};

use qrtag_core::{Frame, LatestSlot, PutOutcome};
use tracing::{debug, error, info, warn};

use super::{CameraError, FrameGrabber};
use crate::application::detect_qr::FrameFeed;

/// Name given to the capture thread.
pub const CAPTURE_THREAD_NAME: &str = "qrtag-capture";

/// Undecodable frames in a row after which the camera is treated as failed.
pub const MAX_CONSECUTIVE_CORRUPT_FRAMES: u32 = 30;

/// A camera running on its own thread.  Dropping it stops the thread and
/// releases the device.
pub struct ThreadedFrameSource {
    slot: Arc<LatestSlot<Frame>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedFrameSource {
    /// Opens a grabber with `open` on a new capture thread and starts
    /// capturing.
    ///
    /// # Errors
    ///
    /// Returns the error from `open` when the device cannot be opened, or
    /// [`CameraError::ThreadSpawn`] if the thread cannot be created.
    pub fn start<G, F>(open: F) -> Result<Self, CameraError>
    where
        G: FrameGrabber,
        F: FnOnce() -> Result<G, CameraError> + Send + 'static,
    {
        let slot = Arc::new(LatestSlot::new());
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<String, CameraError>>(1);

        let thread_slot = Arc::clone(&slot);
        let thread_running = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name(CAPTURE_THREAD_NAME.to_string())
            .spawn(move || {
                let grabber = match open() {
                    Ok(grabber) => {
                        let _ = ready_tx.send(Ok(grabber.describe()));
                        grabber
                    }
                    Err(e) => {
                        thread_slot.close();
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                capture_loop(grabber, &thread_slot, &thread_running);
            })
            .map_err(CameraError::ThreadSpawn)?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(CameraError::Capture(
                "capture thread exited while opening the camera".to_string(),
            ))
        });

        let mut source = Self {
            slot,
            running,
            handle: Some(handle),
        };
        match opened {
            Ok(name) => {
                info!(camera = %name, "camera capture started");
                Ok(source)
            }
            Err(e) => {
                source.stop();
                Err(e)
            }
        }
    }

    /// Blocks until a frame newer than the last one read is available.
    ///
    /// Returns `None` once capture has ended and no unread frame is left.
    pub fn read(&self) -> Option<Frame> {
        self.slot.take()
    }

    /// Number of frames overwritten before the detector read them.
    pub fn discarded_frames(&self) -> u64 {
        self.slot.discarded()
    }

    /// Stops capture, waits for the thread to exit, and releases the device.
    ///
    /// Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.slot.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("capture thread panicked");
            }
            debug!(discarded = self.slot.discarded(), "camera capture stopped");
        }
    }
}

impl FrameFeed for ThreadedFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.read()
    }
}

impl Drop for ThreadedFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The receive loop executed on the capture thread.
///
/// The grabber is dropped (releasing the device) when this returns.
fn capture_loop<G: FrameGrabber>(mut grabber: G, slot: &LatestSlot<Frame>, running: &AtomicBool) {
    let mut seq = 0u64;
    let mut corrupt_in_row = 0u32;
    while running.load(Ordering::SeqCst) {
        match grabber.grab() {
            Ok(frame) => {
                corrupt_in_row = 0;
                if slot.put(frame.with_seq(seq)) == PutOutcome::Closed {
                    break;
                }
                seq += 1;
            }
            Err(e) if e.is_transient() && corrupt_in_row + 1 < MAX_CONSECUTIVE_CORRUPT_FRAMES => {
                corrupt_in_row += 1;
                warn!(error = %e, "skipping undecodable frame");
            }
            Err(e) => {
                error!(error = %e, "camera capture failed, closing frame source");
                break;
            }
        }
    }
    slot.close();
    debug!(frames = seq, "capture loop exited");
}
