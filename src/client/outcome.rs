//! Submission outcomes and service response interpretation.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// The two authentication endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /signin`: verification.
    Signin,
    /// `POST /signup`: enrollment.
    Signup,
}

impl Endpoint {
    /// Path segment relative to the service base URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Signin => "signin",
            Endpoint::Signup => "signup",
        }
    }

    /// Reason reported when the service declines without a message.
    pub fn rejected_reason(self) -> &'static str {
        match self {
            Endpoint::Signin => "Authentication failed. Please try again.",
            Endpoint::Signup => "Signup failed. Please try again.",
        }
    }

    /// Reason reported when the request could not be completed.
    pub fn transport_reason(self) -> &'static str {
        match self {
            Endpoint::Signin => "An error occurred during sign-in.",
            Endpoint::Signup => "An error occurred during sign-up.",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submission did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The service answered and declined the attempt.
    #[error("rejected: {0}")]
    Rejected(String),
    /// The request could not be completed, or the answer was unreadable.
    #[error("request failed: {0}")]
    Transport(String),
}

impl AuthFailure {
    /// Returns the human-readable reason.
    pub fn reason(&self) -> &str {
        match self {
            AuthFailure::Rejected(reason) | AuthFailure::Transport(reason) => reason,
        }
    }

    /// Returns true if the service itself declined.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthFailure::Rejected(_))
    }

    /// Returns true if the request never got a readable answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthFailure::Transport(_))
    }
}

/// Result of one sign-in or sign-up submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// The service accepted the attempt.
    Success {
        /// Message returned by the service, if any.
        message: Option<String>,
    },
    /// The attempt failed; see [`AuthFailure`].
    Failure(AuthFailure),
}

impl AuthenticationOutcome {
    /// Interprets a raw response body from `endpoint`.
    ///
    /// The body must be JSON; anything else counts as a transport
    /// failure. A JSON body succeeds only if `success` is literally
    /// `true`. A missing or non-boolean flag is a rejection.
    pub fn from_response_body(endpoint: Endpoint, body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%endpoint, "Unreadable service response: {}", e);
                return Self::transport(endpoint);
            }
        };

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        match value.get("success").and_then(Value::as_bool) {
            Some(true) => AuthenticationOutcome::Success { message },
            Some(false) => AuthenticationOutcome::Failure(AuthFailure::Rejected(
                message.unwrap_or_else(|| endpoint.rejected_reason().to_string()),
            )),
            None => {
                tracing::debug!(%endpoint, "Service response has no success flag");
                AuthenticationOutcome::Failure(AuthFailure::Rejected(
                    endpoint.rejected_reason().to_string(),
                ))
            }
        }
    }

    /// Interprets a complete response from `endpoint`.
    ///
    /// A 2xx response is read with [`Self::from_response_body`]. Any other
    /// status never succeeds: an explicit `"success": false` body is kept
    /// as a rejection, everything else is a transport failure.
    pub fn from_response(endpoint: Endpoint, status: StatusCode, body: &[u8]) -> Self {
        if status.is_success() {
            return Self::from_response_body(endpoint, body);
        }

        let declined = serde_json::from_slice::<Value>(body)
            .ok()
            .filter(|value| value.get("success").and_then(Value::as_bool) == Some(false));
        match declined {
            Some(value) => AuthenticationOutcome::Failure(AuthFailure::Rejected(
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| endpoint.rejected_reason().to_string(), str::to_string),
            )),
            None => {
                tracing::warn!(%endpoint, status = status.as_u16(), "Service returned an error status");
                Self::transport(endpoint)
            }
        }
    }

    /// Generic transport failure for `endpoint`.
    pub fn transport(endpoint: Endpoint) -> Self {
        AuthenticationOutcome::Failure(AuthFailure::Transport(
            endpoint.transport_reason().to_string(),
        ))
    }

    /// Returns true on success.
    pub fn is_success(&self) -> bool {
        matches!(self, AuthenticationOutcome::Success { .. })
    }

    /// Returns the failure, if any.
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            AuthenticationOutcome::Failure(failure) => Some(failure),
            AuthenticationOutcome::Success { .. } => None,
        }
    }

    /// Returns the message to show the user.
    pub fn message(&self) -> Option<&str> {
        match self {
            AuthenticationOutcome::Success { message } => message.as_deref(),
            AuthenticationOutcome::Failure(failure) => Some(failure.reason()),
        }
    }
}
