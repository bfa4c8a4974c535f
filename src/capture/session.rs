//! Capture session state machine.
//!
//! A session owns the camera device and at most one captured frame.
//! Activating the camera always discards the held frame, which gives
//! "recapture" its meaning: starting the camera again supersedes the
//! previous shot.

use super::{CameraDevice, CameraError, Image};
use thiserror::Error;

/// Errors raised by invalid capture requests.
///
/// Apart from `Camera`, these are caller contract violations: the
/// orchestration layer should only expose an action when the session
/// is in a state that accepts it.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The session is `Disabled`.
    #[error("face authentication is not enabled")]
    SessionDisabled,
    /// The session is enabled but not `Active`.
    #[error("camera is not active")]
    CameraInactive,
    /// No frame has been captured since the camera started.
    #[error("no captured frame")]
    NoFrame,
    /// Device failure.
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Session state with its associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Face authentication is off; the camera is released.
    Disabled,
    /// Face authentication is on but the camera has not been started.
    Idle,
    /// Camera engaged, waiting for a capture.
    Active,
    /// Camera engaged and holding the most recent frame.
    Captured(Image),
}

/// Discriminant of [`SessionState`] without the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStateKind {
    /// See [`SessionState::Disabled`].
    Disabled,
    /// See [`SessionState::Idle`].
    Idle,
    /// See [`SessionState::Active`].
    Active,
    /// See [`SessionState::Captured`].
    Captured,
}

impl SessionState {
    /// Returns the state discriminant.
    pub fn kind(&self) -> SessionStateKind {
        match self {
            SessionState::Disabled => SessionStateKind::Disabled,
            SessionState::Idle => SessionStateKind::Idle,
            SessionState::Active => SessionStateKind::Active,
            SessionState::Captured(_) => SessionStateKind::Captured,
        }
    }
}

/// Camera lifecycle and single-frame capture.
pub struct CaptureSession<C: CameraDevice> {
    camera: C,
    state: SessionState,
}

impl<C: CameraDevice> CaptureSession<C> {
    /// Creates a session in the `Disabled` state.
    pub fn new(camera: C) -> Self {
        Self {
            camera,
            state: SessionState::Disabled,
        }
    }

    /// Creates a session that starts `Idle`, for flows without an opt-out.
    pub fn enabled(camera: C) -> Self {
        let mut session = Self::new(camera);
        session.enable_face_auth();
        session
    }

    /// Opens the session without starting the camera.
    ///
    /// Has no effect if the session is already enabled.
    pub fn enable_face_auth(&mut self) {
        if self.state == SessionState::Disabled {
            self.state = SessionState::Idle;
            tracing::info!("Face authentication enabled");
        }
    }

    /// Starts (or re-arms) the camera, discarding any held frame.
    pub fn start_camera(&mut self) -> Result<(), CaptureError> {
        match self.state {
            SessionState::Disabled => Err(CaptureError::SessionDisabled),
            SessionState::Active => Ok(()),
            SessionState::Idle | SessionState::Captured(_) => {
                self.camera.activate()?;
                if matches!(self.state, SessionState::Captured(_)) {
                    tracing::debug!("Re-arming camera, discarding captured frame");
                } else {
                    tracing::info!("Camera started");
                }
                self.state = SessionState::Active;
                Ok(())
            }
        }
    }

    /// Samples one frame from the camera.
    ///
    /// Only valid while `Active`. In any other state the session is left
    /// unchanged and `CameraInactive` (or `SessionDisabled`) is returned.
    pub fn capture(&mut self) -> Result<&Image, CaptureError> {
        match self.state {
            SessionState::Active => {}
            SessionState::Disabled => return Err(CaptureError::SessionDisabled),
            SessionState::Idle | SessionState::Captured(_) => {
                return Err(CaptureError::CameraInactive)
            }
        }

        let image = self.camera.snapshot()?;
        tracing::debug!(bytes = image.len(), "Captured frame");
        self.state = SessionState::Captured(image);
        self.current_frame().ok_or(CaptureError::NoFrame)
    }

    /// Tears the session down: camera released, frame discarded.
    pub fn disable_face_auth(&mut self) {
        if self.camera.is_active() {
            self.camera.deactivate();
        }
        if self.state != SessionState::Disabled {
            self.state = SessionState::Disabled;
            tracing::info!("Face authentication disabled");
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the current state discriminant.
    pub fn kind(&self) -> SessionStateKind {
        self.state.kind()
    }

    /// Returns the held frame, if a capture happened since the last start.
    pub fn current_frame(&self) -> Option<&Image> {
        match &self.state {
            SessionState::Captured(image) => Some(image),
            _ => None,
        }
    }

    /// Returns true unless the session is `Disabled`.
    pub fn is_enabled(&self) -> bool {
        self.state != SessionState::Disabled
    }

    /// Returns true while the camera is engaged.
    pub fn is_camera_active(&self) -> bool {
        matches!(
            self.state,
            SessionState::Active | SessionState::Captured(_)
        )
    }

    /// Returns true if `capture` would be accepted.
    pub fn can_capture(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Returns the underlying camera device.
    pub fn camera(&self) -> &C {
        &self.camera
    }
}

impl<C: CameraDevice> Drop for CaptureSession<C> {
    fn drop(&mut self) {
        if self.camera.is_active() {
            self.camera.deactivate();
        }
    }
}

impl<C: CameraDevice> std::fmt::Debug for CaptureSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("camera_active", &self.camera.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, MockCamera};
    use proptest::prelude::*;

    fn session() -> CaptureSession<MockCamera> {
        CaptureSession::new(MockCamera::new(CaptureConfig::with_dimensions(16, 16)))
    }

    #[test]
    fn test_enable_does_not_start_camera() {
        let mut session = session();
        assert_eq!(session.kind(), SessionStateKind::Disabled);

        session.enable_face_auth();
        assert_eq!(session.kind(), SessionStateKind::Idle);
        assert!(!session.camera().is_active());
        assert!(!session.can_capture());
    }

    #[test]
    fn test_start_capture_recapture() {
        let mut session = session();
        session.enable_face_auth();

        session.start_camera().unwrap();
        assert_eq!(session.kind(), SessionStateKind::Active);
        assert!(session.camera().is_active());

        let first = session.capture().unwrap().clone();
        assert_eq!(session.kind(), SessionStateKind::Captured);
        assert_eq!(session.current_frame(), Some(&first));

        session.start_camera().unwrap();
        assert_eq!(session.kind(), SessionStateKind::Active);
        assert!(session.current_frame().is_none());

        let second = session.capture().unwrap().clone();
        assert_ne!(first, second);
    }

    #[test]
    fn test_capture_outside_active_is_rejected() {
        let mut session = session();
        assert!(matches!(
            session.capture(),
            Err(CaptureError::SessionDisabled)
        ));

        session.enable_face_auth();
        assert!(matches!(
            session.capture(),
            Err(CaptureError::CameraInactive)
        ));

        session.start_camera().unwrap();
        let held = session.capture().unwrap().clone();
        assert!(matches!(
            session.capture(),
            Err(CaptureError::CameraInactive)
        ));
        assert_eq!(session.current_frame(), Some(&held));
    }

    #[test]
    fn test_start_camera_requires_enabled_session() {
        let mut session = session();
        assert!(matches!(
            session.start_camera(),
            Err(CaptureError::SessionDisabled)
        ));
        assert!(!session.camera().is_active());
    }

    #[test]
    fn test_activation_failure_leaves_idle() {
        let mut session = CaptureSession::enabled(MockCamera::unavailable());
        assert!(matches!(
            session.start_camera(),
            Err(CaptureError::Camera(CameraError::DeviceNotFound(_)))
        ));
        assert_eq!(session.kind(), SessionStateKind::Idle);
    }

    #[test]
    fn test_disable_tears_down() {
        let mut session = session();
        session.enable_face_auth();
        session.start_camera().unwrap();
        session.capture().unwrap();

        session.disable_face_auth();
        assert_eq!(session.kind(), SessionStateKind::Disabled);
        assert!(!session.camera().is_active());
        assert!(session.current_frame().is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Enable,
        Start,
        Capture,
        Disable,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Enable),
            Just(Op::Start),
            Just(Op::Capture),
            Just(Op::Disable),
        ]
    }

    proptest! {
        #[test]
        fn prop_session_invariants(ops in proptest::collection::vec(op(), 0..40)) {
            let mut session = session();

            for op in ops {
                let before = session.current_frame().cloned();
                let was_active = session.can_capture();

                match op {
                    Op::Enable => session.enable_face_auth(),
                    Op::Start => {
                        if session.start_camera().is_ok() {
                            prop_assert!(session.current_frame().is_none());
                            prop_assert!(session.camera().is_active());
                        }
                    }
                    Op::Capture => {
                        let result = session.capture().map(|_| ());
                        if was_active {
                            prop_assert!(result.is_ok());
                            prop_assert!(session.current_frame().is_some());
                        } else {
                            prop_assert!(result.is_err());
                            prop_assert_eq!(session.current_frame().cloned(), before);
                        }
                    }
                    Op::Disable => {
                        session.disable_face_auth();
                        prop_assert_eq!(session.kind(), SessionStateKind::Disabled);
                        prop_assert!(!session.camera().is_active());
                    }
                }

                // A held frame implies an engaged camera
                if session.current_frame().is_some() {
                    prop_assert!(session.camera().is_active());
                }
                prop_assert_eq!(session.is_camera_active(), session.camera().is_active());
            }
        }
    }
}
