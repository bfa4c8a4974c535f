//! Native camera backed by the `nokhwa` crate.

use super::camera::{encode_jpeg, CameraDevice, CameraError};
use super::{CaptureConfig, Image};
use image::imageops::FilterType;
use image::{ExtendedColorType, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType};

/// A physical camera opened through the platform's native backend.
///
/// The device is opened on `activate` and released on `deactivate`, so
/// another application may use it while no session holds it.
pub struct NokhwaCamera {
    config: CaptureConfig,
    inner: Option<nokhwa::Camera>,
}

impl NokhwaCamera {
    /// Creates a handle for the configured device without opening it.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            inner: None,
        }
    }
}

impl CameraDevice for NokhwaCamera {
    fn activate(&mut self) -> Result<(), CameraError> {
        if self.inner.is_some() {
            return Ok(());
        }

        let format = CameraFormat::new_from(
            self.config.width,
            self.config.height,
            FrameFormat::MJPEG,
            30,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));
        let index = CameraIndex::Index(self.config.device_id);

        let mut camera = nokhwa::Camera::new(index, requested)
            .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        tracing::info!(
            device = self.config.device_id,
            resolution = %camera.resolution(),
            "Camera activated"
        );
        self.inner = Some(camera);
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Image, CameraError> {
        let camera = self.inner.as_mut().ok_or(CameraError::NotActive)?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        let rgb = RgbImage::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            CameraError::CaptureFailed("decoded frame size mismatch".to_string())
        })?;

        let rgb = if (width, height) != (self.config.width, self.config.height) {
            tracing::trace!(width, height, "Resizing frame to configured dimensions");
            image::imageops::resize(
                &rgb,
                self.config.width,
                self.config.height,
                FilterType::Triangle,
            )
        } else {
            rgb
        };

        encode_jpeg(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
            self.config.jpeg_quality,
        )
    }

    fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    fn deactivate(&mut self) {
        if let Some(mut camera) = self.inner.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
            tracing::info!(device = self.config.device_id, "Camera deactivated");
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.deactivate();
    }
}
