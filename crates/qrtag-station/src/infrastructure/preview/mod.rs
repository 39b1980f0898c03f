//! Preview adapters: a desktop window (`hardware` feature) and a headless
//! stand-in for kiosks, CI, and SSH sessions.

#[cfg(feature = "hardware")]
pub mod minifb;

use qrtag_core::Frame;

use crate::application::detect_qr::Preview;

/// Default window title.
pub const DEFAULT_WINDOW_TITLE: &str = "QR Code Detector (Press q to exit)";

/// Shows nothing and never asks to stop.  Ctrl-C is the only way out.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPreview;

impl Preview for HeadlessPreview {
    fn show(&mut self, _frame: &Frame) {}

    fn stop_requested(&mut self) -> bool {
        false
    }

    fn close(&mut self) {}
}
