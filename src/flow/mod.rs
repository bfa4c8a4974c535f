//! Sign-in and sign-up orchestration.
//!
//! A flow wires user intent (toggle face auth, start camera, capture,
//! submit) to a capture session, the enrollment buffer and the
//! authentication client. Only one submission per flow may be pending
//! at a time.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use face_auth_client::{
//!     capture::MockCamera,
//!     client::{AuthenticationClient, ServiceConfig},
//!     flow::SigninFlow,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(AuthenticationClient::new(&ServiceConfig::default())?);
//! let mut flow = SigninFlow::new(client, MockCamera::default());
//!
//! flow.set_username("alice");
//! flow.set_use_face_auth(true);
//! flow.start_camera()?;
//! flow.capture()?;
//!
//! let outcome = flow.submit().await?;
//! println!("signed in: {}", outcome.is_success());
//! # Ok(())
//! # }
//! ```

mod signin;
mod signup;

pub use signin::SigninFlow;
pub use signup::SignupFlow;

use crate::capture::CaptureError;
use crate::client::{
    AuthenticationClient, AuthenticationOutcome, Endpoint, SigninRequest, SignupRequest,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by flow actions.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A previous submission has not resolved.
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    /// Invalid capture action.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Shared in-flight flag of one flow.
#[derive(Debug, Clone, Default)]
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(&self) -> Result<InFlightGuard, FlowError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlowError::SubmissionInFlight)?;
        Ok(InFlightGuard(Arc::clone(&self.0)))
    }

    fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag when dropped.
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
enum PendingRequest {
    Signin(SigninRequest),
    Signup(SignupRequest),
}

/// A submission that has been started but not yet resolved.
///
/// Holds a snapshot of the request, so the flow's session and buffer
/// are untouched whatever the outcome. The owning flow rejects further
/// submissions until this value is dropped, which `run` does on
/// completion.
#[derive(Debug)]
pub struct Submission {
    client: Arc<AuthenticationClient>,
    request: PendingRequest,
    _guard: InFlightGuard,
}

impl Submission {
    /// Returns the endpoint this submission targets.
    pub fn endpoint(&self) -> Endpoint {
        match self.request {
            PendingRequest::Signin(_) => Endpoint::Signin,
            PendingRequest::Signup(_) => Endpoint::Signup,
        }
    }

    /// Sends the request and waits for the outcome.
    pub async fn run(self) -> AuthenticationOutcome {
        match &self.request {
            PendingRequest::Signin(request) => self.client.signin(request).await,
            PendingRequest::Signup(request) => self.client.signup(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let flag = InFlight::default();
        assert!(!flag.is_pending());

        let guard = flag.acquire().unwrap();
        assert!(flag.is_pending());
        assert!(matches!(
            flag.acquire(),
            Err(FlowError::SubmissionInFlight)
        ));

        drop(guard);
        assert!(!flag.is_pending());
        assert!(flag.acquire().is_ok());
    }
}
