//! Sign-in orchestration.

use super::{FlowError, InFlight, PendingRequest, Submission};
use crate::capture::{CameraDevice, CaptureSession, Image};
use crate::client::{AuthenticationClient, AuthenticationOutcome, SigninRequest};
use std::sync::Arc;

/// Verification flow with an optional face image.
///
/// Face authentication is opt-in. The toggle is the capture session's
/// enabled state: switching it off tears the session down, so a frame
/// captured before the opt-out can never leak into a request.
pub struct SigninFlow<C: CameraDevice> {
    username: String,
    session: CaptureSession<C>,
    client: Arc<AuthenticationClient>,
    in_flight: InFlight,
}

impl<C: CameraDevice> SigninFlow<C> {
    /// Creates a flow with face authentication off.
    pub fn new(client: Arc<AuthenticationClient>, camera: C) -> Self {
        Self {
            username: String::new(),
            session: CaptureSession::new(camera),
            client,
            in_flight: InFlight::default(),
        }
    }

    /// Sets the claimed username.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// Returns the claimed username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Turns face authentication on or off.
    pub fn set_use_face_auth(&mut self, enabled: bool) {
        if enabled {
            self.session.enable_face_auth();
        } else {
            self.session.disable_face_auth();
        }
    }

    /// Returns true if face authentication is on.
    pub fn use_face_auth(&self) -> bool {
        self.session.is_enabled()
    }

    /// Starts or re-arms the camera.
    pub fn start_camera(&mut self) -> Result<(), FlowError> {
        Ok(self.session.start_camera()?)
    }

    /// Returns true if the capture action should be offered.
    pub fn can_capture(&self) -> bool {
        self.session.can_capture()
    }

    /// Captures the face image for this attempt.
    pub fn capture(&mut self) -> Result<&Image, FlowError> {
        let image = self.session.capture()?;
        if let Some(metrics) = self.client.metrics() {
            metrics.record_capture();
        }
        Ok(image)
    }

    /// Returns the capture session.
    pub fn session(&self) -> &CaptureSession<C> {
        &self.session
    }

    /// Builds the request for the current state.
    ///
    /// The image is the held frame only while face authentication is on.
    pub fn build_request(&self) -> SigninRequest {
        SigninRequest {
            username: self.username.clone(),
            face_image: if self.use_face_auth() {
                self.session.current_frame().cloned()
            } else {
                None
            },
        }
    }

    /// Returns true while a submission is pending.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_pending()
    }

    /// Starts a submission of the current request.
    ///
    /// Fails with `SubmissionInFlight` if a previous submission has not
    /// resolved yet.
    pub fn begin_submit(&self) -> Result<Submission, FlowError> {
        let guard = self.in_flight.acquire()?;
        Ok(Submission {
            client: Arc::clone(&self.client),
            request: PendingRequest::Signin(self.build_request()),
            _guard: guard,
        })
    }

    /// Applies a resolved outcome: success completes the flow and
    /// releases the camera; failure leaves everything for a retry.
    pub fn apply_outcome(&mut self, outcome: &AuthenticationOutcome) {
        if outcome.is_success() {
            self.session.disable_face_auth();
        }
    }

    /// Submits the current request and applies the outcome.
    pub async fn submit(&mut self) -> Result<AuthenticationOutcome, FlowError> {
        let outcome = self.begin_submit()?.run().await;
        self.apply_outcome(&outcome);
        Ok(outcome)
    }
}

impl<C: CameraDevice> std::fmt::Debug for SigninFlow<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigninFlow")
            .field("username", &self.username)
            .field("session", &self.session)
            .field("submitting", &self.is_submitting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CameraError, CaptureConfig, CaptureError, MockCamera, SessionStateKind};
    use crate::client::ServiceConfig;
    use crate::metrics::MetricsRegistry;

    /// Camera that engages but never yields a frame.
    #[derive(Default)]
    struct BrokenSensor {
        active: bool,
    }

    impl CameraDevice for BrokenSensor {
        fn activate(&mut self) -> Result<(), CameraError> {
            self.active = true;
            Ok(())
        }

        fn snapshot(&mut self) -> Result<Image, CameraError> {
            Err(CameraError::CaptureFailed("sensor timeout".to_string()))
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn deactivate(&mut self) {
            self.active = false;
        }
    }

    fn metered_client() -> (Arc<AuthenticationClient>, Arc<MetricsRegistry>) {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let client = AuthenticationClient::new(&ServiceConfig::default())
            .unwrap()
            .with_metrics(Arc::clone(&metrics));
        (Arc::new(client), metrics)
    }

    fn flow() -> SigninFlow<MockCamera> {
        let client = AuthenticationClient::new(&ServiceConfig::default()).unwrap();
        SigninFlow::new(
            Arc::new(client),
            MockCamera::new(CaptureConfig::with_dimensions(16, 16)),
        )
    }

    #[test]
    fn test_face_auth_off_by_default() {
        let mut flow = flow();
        flow.set_username("alice");

        assert!(!flow.use_face_auth());
        assert!(matches!(flow.start_camera(), Err(FlowError::Capture(_))));
        assert_eq!(flow.build_request(), SigninRequest::new("alice"));
    }

    #[test]
    fn test_request_uses_captured_frame() {
        let mut flow = flow();
        flow.set_username("alice");
        flow.set_use_face_auth(true);
        flow.start_camera().unwrap();
        let frame = flow.capture().unwrap().clone();

        let request = flow.build_request();
        assert_eq!(request.face_image, Some(frame));
    }

    #[test]
    fn test_opt_out_discards_frame() {
        let mut flow = flow();
        flow.set_use_face_auth(true);
        flow.start_camera().unwrap();
        flow.capture().unwrap();

        flow.set_use_face_auth(false);
        assert_eq!(flow.session().kind(), SessionStateKind::Disabled);
        assert!(!flow.session().camera().is_active());
        assert!(flow.build_request().face_image.is_none());

        // Opting back in starts from a clean session
        flow.set_use_face_auth(true);
        assert_eq!(flow.session().kind(), SessionStateKind::Idle);
        assert!(flow.build_request().face_image.is_none());
    }

    #[test]
    fn test_capture_guarded_until_camera_started() {
        let mut flow = flow();
        flow.set_use_face_auth(true);
        assert!(!flow.can_capture());
        assert!(flow.capture().is_err());

        flow.start_camera().unwrap();
        assert!(flow.can_capture());
    }

    #[test]
    fn test_second_begin_submit_rejected() {
        let flow = flow();
        let pending = flow.begin_submit().unwrap();
        assert!(flow.is_submitting());
        assert!(matches!(
            flow.begin_submit(),
            Err(FlowError::SubmissionInFlight)
        ));

        drop(pending);
        assert!(!flow.is_submitting());
    }

    #[test]
    fn test_success_tears_down_session() {
        let mut flow = flow();
        flow.set_use_face_auth(true);
        flow.start_camera().unwrap();
        flow.capture().unwrap();

        flow.apply_outcome(&AuthenticationOutcome::transport(
            crate::client::Endpoint::Signin,
        ));
        assert_eq!(flow.session().kind(), SessionStateKind::Captured);

        flow.apply_outcome(&AuthenticationOutcome::Success { message: None });
        assert_eq!(flow.session().kind(), SessionStateKind::Disabled);
        assert!(!flow.session().camera().is_active());
    }

    #[test]
    fn test_failed_snapshot_is_not_counted() {
        let (client, metrics) = metered_client();
        let mut flow = SigninFlow::new(client, BrokenSensor::default());
        flow.set_use_face_auth(true);
        flow.start_camera().unwrap();

        assert!(matches!(
            flow.capture(),
            Err(FlowError::Capture(CaptureError::Camera(CameraError::CaptureFailed(_))))
        ));
        assert!(metrics
            .encode()
            .unwrap()
            .contains("face_auth_frames_captured_total 0"));
    }

    #[test]
    fn test_successful_capture_is_counted() {
        let (client, metrics) = metered_client();
        let mut flow = SigninFlow::new(client, MockCamera::default());
        flow.set_use_face_auth(true);
        flow.start_camera().unwrap();
        flow.capture().unwrap();

        assert!(metrics
            .encode()
            .unwrap()
            .contains("face_auth_frames_captured_total 1"));
    }
}
