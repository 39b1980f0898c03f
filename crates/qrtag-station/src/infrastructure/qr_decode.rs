//! QR decoding with `rqrr`.

use qrtag_core::Frame;
use tracing::trace;

use crate::application::detect_qr::QrDecoder;

/// Finds every QR code in a frame's luma channel and decodes it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode_multi(&self, frame: &Frame) -> Vec<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width() as usize,
            frame.height() as usize,
            |x, y| frame.luma(x, y),
        );
        prepared
            .detect_grids()
            .into_iter()
            .map(|grid| match grid.decode() {
                Ok((_meta, content)) => content,
                Err(e) => {
                    trace!(frame = frame.seq(), error = %e, "QR grid found but not decodable");
                    String::new()
                }
            })
            .collect()
    }
}
