//! Sign-up orchestration.

use super::{FlowError, InFlight, PendingRequest, Submission};
use crate::capture::{CameraDevice, CaptureSession, Image};
use crate::client::{AuthenticationClient, AuthenticationOutcome, SignupRequest};
use crate::enrollment::EnrollmentBuffer;
use secrecy::SecretString;
use std::sync::Arc;

/// Enrollment flow collecting zero or more face images.
///
/// There is no opt-out toggle: the session starts enabled and face
/// enrollment is optional by leaving the buffer empty.
pub struct SignupFlow<C: CameraDevice> {
    username: String,
    password: SecretString,
    session: CaptureSession<C>,
    buffer: EnrollmentBuffer,
    client: Arc<AuthenticationClient>,
    in_flight: InFlight,
}

impl<C: CameraDevice> SignupFlow<C> {
    /// Creates a flow with an idle session and an empty buffer.
    pub fn new(client: Arc<AuthenticationClient>, camera: C) -> Self {
        Self {
            username: String::new(),
            password: SecretString::default(),
            session: CaptureSession::enabled(camera),
            buffer: EnrollmentBuffer::new(),
            client,
            in_flight: InFlight::default(),
        }
    }

    /// Sets the requested username.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// Returns the requested username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Sets the account password.
    pub fn set_password(&mut self, password: SecretString) {
        self.password = password;
    }

    /// Starts or re-arms the camera for the next shot.
    pub fn start_camera(&mut self) -> Result<(), FlowError> {
        Ok(self.session.start_camera()?)
    }

    /// Returns true if the capture action should be offered.
    pub fn can_capture(&self) -> bool {
        self.session.can_capture()
    }

    /// Captures a frame into the session without buffering it.
    pub fn capture(&mut self) -> Result<&Image, FlowError> {
        let image = self.session.capture()?;
        if let Some(metrics) = self.client.metrics() {
            metrics.record_capture();
        }
        Ok(image)
    }

    /// Appends the session's captured frame to the buffer.
    ///
    /// Returns the new image count.
    pub fn append(&mut self) -> Result<usize, FlowError> {
        Ok(self.buffer.append(&self.session)?)
    }

    /// Captures, appends and re-arms the camera for the next shot.
    pub fn capture_and_append(&mut self) -> Result<usize, FlowError> {
        self.capture()?;
        let count = self.append()?;
        self.start_camera()?;
        Ok(count)
    }

    /// Returns the buffered images in capture order.
    pub fn images(&self) -> &[Image] {
        self.buffer.snapshot()
    }

    /// Returns the enrollment buffer.
    pub fn buffer(&self) -> &EnrollmentBuffer {
        &self.buffer
    }

    /// Returns the capture session.
    pub fn session(&self) -> &CaptureSession<C> {
        &self.session
    }

    /// Builds the request from the buffer's current snapshot.
    pub fn build_request(&self) -> SignupRequest {
        SignupRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            face_images: self.buffer.snapshot().to_vec(),
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
            request: PendingRequest::Signup(self.build_request()),
            _guard: guard,
        })
    }

    /// Applies a resolved outcome: success releases the camera; failure
    /// keeps the session and every buffered image for a retry.
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

impl<C: CameraDevice> std::fmt::Debug for SignupFlow<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupFlow")
            .field("username", &self.username)
            .field("images", &self.buffer.len())
            .field("session", &self.session)
            .field("submitting", &self.is_submitting())
            .finish()
    }
}
