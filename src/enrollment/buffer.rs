//! Append-only image buffer for sign-up.

use crate::capture::{CameraDevice, CaptureError, CaptureSession, Image};

/// Ordered collection of enrollment images.
///
/// Images are only ever appended. There is no removal or reordering;
/// starting over means dropping the buffer with its flow. An empty
/// buffer is valid and means "no biometric enrollment".
#[derive(Debug, Clone, Default)]
pub struct EnrollmentBuffer {
    frames: Vec<Image>,
}

impl EnrollmentBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the session's captured frame to the end of the buffer.
    ///
    /// Returns the new length. Fails with `NoFrame` if the session is not
    /// holding a capture, leaving the buffer unchanged. The caller is
    /// expected to re-arm the session before the next capture.
    pub fn append<C: CameraDevice>(
        &mut self,
        session: &CaptureSession<C>,
    ) -> Result<usize, CaptureError> {
        let frame = session.current_frame().ok_or(CaptureError::NoFrame)?;
        self.frames.push(frame.clone());

        tracing::debug!(
            images = self.frames.len(),
            bytes = frame.len(),
            "Appended enrollment image"
        );
        Ok(self.frames.len())
    }

    /// Returns the images in capture order.
    pub fn snapshot(&self) -> &[Image] {
        &self.frames
    }

    /// Returns the number of images.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no image has been appended.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, MockCamera};
    use proptest::prelude::*;

    fn session() -> CaptureSession<MockCamera> {
        CaptureSession::enabled(MockCamera::new(CaptureConfig::with_dimensions(16, 16)))
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = EnrollmentBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
    }

    #[test]
    fn test_append_requires_captured_frame() {
        let mut session = session();
        let mut buffer = EnrollmentBuffer::new();

        assert!(matches!(
            buffer.append(&session),
            Err(CaptureError::NoFrame)
        ));

        session.start_camera().unwrap();
        assert!(matches!(
            buffer.append(&session),
            Err(CaptureError::NoFrame)
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_append_copies_current_frame() {
        let mut session = session();
        let mut buffer = EnrollmentBuffer::new();

        session.start_camera().unwrap();
        let frame = session.capture().unwrap().clone();

        assert_eq!(buffer.append(&session).unwrap(), 1);
        assert_eq!(buffer.snapshot(), &[frame.clone()]);

        // Re-arming the session leaves the buffered copy intact
        session.start_camera().unwrap();
        assert!(session.current_frame().is_none());
        assert_eq!(buffer.snapshot(), &[frame]);
    }

    proptest! {
        #[test]
        fn prop_append_preserves_order(shots in 1usize..12) {
            let mut session = session();
            let mut buffer = EnrollmentBuffer::new();
            let mut captured = Vec::new();

            for i in 0..shots {
                session.start_camera().unwrap();
                captured.push(session.capture().unwrap().clone());

                let len = buffer.append(&session).unwrap();
                prop_assert_eq!(len, i + 1);
                prop_assert_eq!(buffer.snapshot().len(), i + 1);
            }

            prop_assert_eq!(buffer.snapshot(), captured.as_slice());
        }
    }
}
