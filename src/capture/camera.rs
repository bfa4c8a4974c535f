//! Camera abstraction for still-frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::{CaptureConfig, Image};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No device matches the configured index.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// The device exists but could not be opened.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// The device did not deliver a frame.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// JPEG encoding failed.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
    /// Snapshot requested before activation.
    #[error("camera not active")]
    NotActive,
}

/// A live video source that can produce still frames on demand.
///
/// Implementations own the underlying device. A snapshot is only valid
/// between `activate` and `deactivate`.
pub trait CameraDevice {
    /// Engages the device. Activating an active device is a no-op.
    fn activate(&mut self) -> Result<(), CameraError>;

    /// Samples the device once and returns the encoded frame.
    fn snapshot(&mut self) -> Result<Image, CameraError>;

    /// Checks if the device is currently engaged.
    fn is_active(&self) -> bool;

    /// Releases the device. Deactivating an inactive device is a no-op.
    fn deactivate(&mut self);
}

impl<T: CameraDevice + ?Sized> CameraDevice for Box<T> {
    fn activate(&mut self) -> Result<(), CameraError> {
        (**self).activate()
    }

    fn snapshot(&mut self) -> Result<Image, CameraError> {
        (**self).snapshot()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}

/// Encodes raw pixels as a JPEG image.
pub(crate) fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
    quality: u8,
) -> Result<Image, CameraError> {
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality).write_image(
        pixels, width, height, color,
    )?;
    Ok(Image::jpeg(encoded))
}

/// Mock camera that generates synthetic grayscale frames.
#[derive(Debug)]
pub struct MockCamera {
    config: CaptureConfig,
    active: bool,
    available: bool,
    sequence: u64,
}

impl MockCamera {
    /// Creates a mock camera producing frames of the configured size.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            active: false,
            available: true,
            sequence: 0,
        }
    }

    /// Creates a mock camera whose activation always fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Returns the number of frames produced so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

impl CameraDevice for MockCamera {
    fn activate(&mut self) -> Result<(), CameraError> {
        if !self.available {
            return Err(CameraError::DeviceNotFound(format!(
                "mock device {}",
                self.config.device_id
            )));
        }
        if !self.active {
            self.active = true;
            tracing::debug!(
                width = self.config.width,
                height = self.config.height,
                "MockCamera activated"
            );
        }
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Image, CameraError> {
        if !self.active {
            return Err(CameraError::NotActive);
        }

        let (width, height) = (self.config.width, self.config.height);
        let shift = self.sequence.wrapping_mul(16);
        // Horizontal gradient shifted per frame so successive snapshots differ
        let pixels: Vec<u8> = (0..height)
            .flat_map(|_| (0..width).map(move |x| ((u64::from(x) + shift) % 256) as u8))
            .collect();

        self.sequence += 1;
        encode_jpeg(
            &pixels,
            width,
            height,
            ExtendedColorType::L8,
            self.config.jpeg_quality,
        )
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        if self.active {
            self.active = false;
            tracing::debug!("MockCamera deactivated");
        }
    }
}
