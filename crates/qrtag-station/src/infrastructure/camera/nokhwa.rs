//! Webcam capture through `nokhwa` (V4L2 on Linux, AVFoundation on macOS,
//! Media Foundation on Windows).

use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};
use qrtag_core::Frame;
use tracing::{info, warn};

use super::{CameraError, FrameGrabber};

/// An open webcam stream.  The stream is stopped when dropped.
pub struct NokhwaGrabber {
    camera: Camera,
}

impl NokhwaGrabber {
    /// Opens camera `index` at its highest frame rate and starts streaming.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::DeviceUnavailable`] if the camera is absent,
    /// busy, or not permitted.
    pub fn open(index: u32) -> Result<Self, CameraError> {
        let unavailable = |e: nokhwa::NokhwaError| CameraError::DeviceUnavailable {
            index,
            reason: e.to_string(),
        };

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(unavailable)?;
        camera.open_stream().map_err(unavailable)?;

        info!(
            camera = %camera.info().human_name(),
            format = %camera.camera_format(),
            "camera opened"
        );
        Ok(Self { camera })
    }
}

impl FrameGrabber for NokhwaGrabber {
    fn grab(&mut self) -> Result<Frame, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Capture(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CorruptFrame(e.to_string()))?;
        let (width, height) = (image.width(), image.height());
        Ok(Frame::from_rgb(width, height, image.into_raw())?)
    }

    fn describe(&self) -> String {
        self.camera.info().human_name()
    }
}

impl Drop for NokhwaGrabber {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            warn!(error = %e, "failed to stop camera stream");
        }
    }
}
