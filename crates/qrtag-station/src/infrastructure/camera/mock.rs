//! Scripted frame grabber for unit and integration testing.
//!
//! Plays back a fixed list of frames without a capture device.  Once the
//! script runs out it either repeats the last frame forever (a camera that
//! keeps pointing at the same scene) or fails like an unplugged camera.
//! Undecodable frames can be scripted ahead of the real ones.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use qrtag_core::Frame;

use super::{CameraError, FrameGrabber};

/// A [`FrameGrabber`] that replays scripted frames.
pub struct ScriptedGrabber {
    frames: VecDeque<Frame>,
    last: Option<Frame>,
    repeat_last: bool,
    corrupt_ahead: usize,
    delay: Option<Duration>,
    released: Arc<AtomicBool>,
}

impl ScriptedGrabber {
    /// Plays `frames` once, then fails every further grab.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            last: None,
            repeat_last: false,
            corrupt_ahead: 0,
            delay: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Plays `frames`, then keeps returning the last one.
    pub fn looping_tail(frames: Vec<Frame>) -> Self {
        let mut grabber = Self::new(frames);
        grabber.repeat_last = true;
        grabber
    }

    /// Returns `frame` on every grab.
    pub fn repeating(frame: Frame) -> Self {
        Self::looping_tail(vec![frame])
    }

    /// Sleeps `delay` before each grab, like a camera's frame interval.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails the first `count` grabs with [`CameraError::CorruptFrame`].
    pub fn with_corrupt_frames(mut self, count: usize) -> Self {
        self.corrupt_ahead = count;
        self
    }

    /// Flag that becomes `true` when the grabber is dropped (device released).
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameGrabber for ScriptedGrabber {
    fn grab(&mut self) -> Result<Frame, CameraError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.corrupt_ahead > 0 {
            self.corrupt_ahead -= 1;
            return Err(CameraError::CorruptFrame("scripted corrupt frame".to_string()));
        }
        if let Some(frame) = self.frames.pop_front() {
            self.last = Some(frame.clone());
            return Ok(frame);
        }
        match (&self.last, self.repeat_last) {
            (Some(frame), true) => Ok(frame.clone()),
            _ => Err(CameraError::Capture("scripted camera has no more frames".to_string())),
        }
    }

    fn describe(&self) -> String {
        "scripted camera".to_string()
    }
}

impl Drop for ScriptedGrabber {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
