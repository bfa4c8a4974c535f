//! Camera input and capture sessions.
//!
//! This module provides the camera device abstraction, the encoded
//! still-image type sent to the authentication service, and the
//! capture session state machine that governs when a frame may be taken.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;
mod session;

pub use camera::{CameraDevice, CameraError, MockCamera};
pub use config::CaptureConfig;
pub use frame::{Image, ImageError, JPEG_MIME};
#[cfg(feature = "camera")]
pub use native::NokhwaCamera;
pub use session::{CaptureError, CaptureSession, SessionState, SessionStateKind};
