//! Camera frame: the unit of data handed from the capture thread to the
//! QR detector.
//!
//! A [`Frame`] is ephemeral.  The capture thread produces it, the newest-wins
//! slot holds at most one of them, and the detector consumes it exactly once.
//! Nothing is persisted.
//!
//! # Pixel layout
//!
//! ```text
//! data = [R G B][R G B][R G B] ...   row-major, 3 bytes per pixel
//! ```
//!
//! The QR decoder only needs luminance, so [`Frame::luma`] converts a pixel on
//! demand using the ITU-R BT.601 integer weights.

use thiserror::Error;

/// Bytes per RGB8 pixel.
pub const RGB_CHANNELS: usize = 3;

/// Error returned when a pixel buffer does not match the declared dimensions.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("frame buffer has {actual} bytes, expected {expected} for {width}x{height} RGB8")]
pub struct FrameSizeError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

/// A single RGB8 camera frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
    /// Capture sequence number assigned by the frame source (0, 1, 2, ...).
    seq: u64,
}

impl Frame {
    /// Wraps an RGB8 buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSizeError`] if `data.len() != width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameSizeError> {
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if data.len() != expected {
            return Err(FrameSizeError {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            seq: 0,
        })
    }

    /// Creates a uniformly coloured frame.  Handy for mocks and tests.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * RGB_CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
            seq: 0,
        }
    }

    /// Returns a copy of this frame tagged with the given sequence number.
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Raw RGB8 bytes, row-major.
    pub fn as_rgb(&self) -> &[u8] {
        &self.data
    }

    /// Returns the 8-bit luminance of the pixel at (`x`, `y`).
    ///
    /// Out-of-range coordinates return 255 (white), which the QR decoder
    /// treats as quiet zone.
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        if x >= self.width as usize || y >= self.height as usize {
            return u8::MAX;
        }
        let idx = (y * self.width as usize + x) * RGB_CHANNELS;
        let r = self.data[idx] as u32;
        let g = self.data[idx + 1] as u32;
        let b = self.data[idx + 2] as u32;
        // 0.299 R + 0.587 G + 0.114 B, scaled by 1000.
        ((r * 299 + g * 587 + b * 114) / 1000) as u8
    }

    /// Packs the frame into `0x00RRGGBB` words, the layout expected by
    /// framebuffer-style preview windows.
    pub fn to_xrgb(&self) -> Vec<u32> {
        self.data
            .chunks_exact(RGB_CHANNELS)
            .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
            .collect()
    }
}
