//! Live camera preview in a `minifb` window.
//!
//! The window is created lazily on the first frame (so its size matches the
//! camera) and destroyed by [`Preview::close`].  Pressing `q` or Escape, or
//! closing the window, asks the detector to stop.

use minifb::{Key, Window, WindowOptions};
use qrtag_core::Frame;
use tracing::warn;

use crate::application::detect_qr::Preview;

pub struct MinifbPreview {
    title: String,
    window: Option<Window>,
    size: (usize, usize),
    /// Set when the window cannot be created, so we stop retrying every frame.
    unavailable: bool,
}

impl MinifbPreview {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
            size: (0, 0),
            unavailable: false,
        }
    }

    fn window_for(&mut self, width: usize, height: usize) -> Option<&mut Window> {
        if self.unavailable {
            return None;
        }
        if self.window.is_none() || self.size != (width, height) {
            let options = WindowOptions {
                resize: true,
                ..WindowOptions::default()
            };
            match Window::new(&self.title, width, height, options) {
                Ok(mut window) => {
                    window.set_target_fps(60);
                    self.window = Some(window);
                    self.size = (width, height);
                }
                Err(e) => {
                    warn!(error = %e, "cannot open preview window, continuing without it");
                    self.unavailable = true;
                    return None;
                }
            }
        }
        self.window.as_mut()
    }
}

impl Preview for MinifbPreview {
    fn show(&mut self, frame: &Frame) {
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        let pixels = frame.to_xrgb();
        if let Some(window) = self.window_for(width, height) {
            if let Err(e) = window.update_with_buffer(&pixels, width, height) {
                warn!(error = %e, "preview update failed");
            }
        }
    }

    fn stop_requested(&mut self) -> bool {
        self.window.as_ref().is_some_and(|w| {
            !w.is_open() || w.is_key_down(Key::Q) || w.is_key_down(Key::Escape)
        })
    }

    fn close(&mut self) {
        self.window = None;
    }
}
