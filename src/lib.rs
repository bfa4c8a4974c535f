//! Face-Assisted Authentication Client Library
//!
//! Client-side capture and submission for face-assisted sign-in and
//! sign-up against a remote authentication service.
//!
//! # Architecture
//!
//! ```text
//! flow (signin / signup)
//!   ├─→ capture session ──→ camera device
//!   ├─→ enrollment buffer (signup only)
//!   └─→ authentication client ──→ POST /signin | /signup
//! ```
//!
//! # Design Principles
//!
//! - **One frame per session**: the capture session holds at most one
//!   image; starting the camera always discards it
//! - **Append-only enrollment**: sign-up images accumulate in capture order
//! - **Outcomes, not errors**: submissions resolve to an
//!   [`AuthenticationOutcome`] that separates rejection from transport failure
//! - **No double submit**: a flow refuses to start a second submission
//!   while one is pending
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use face_auth_client::{
//!     capture::MockCamera,
//!     client::{AuthenticationClient, ServiceConfig},
//!     flow::SignupFlow,
//! };
//! use secrecy::SecretString;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(AuthenticationClient::new(&ServiceConfig::default())?);
//! let mut flow = SignupFlow::new(client, MockCamera::default());
//!
//! flow.set_username("bob");
//! flow.set_password(SecretString::from("correct horse".to_string()));
//! flow.start_camera()?;
//! for _ in 0..3 {
//!     flow.capture_and_append()?;
//! }
//!
//! let outcome = flow.submit().await?;
//! if let Some(failure) = outcome.failure() {
//!     eprintln!("signup failed: {}", failure);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod client;
pub mod config;
pub mod enrollment;
pub mod flow;
pub mod metrics;

// Re-export commonly used types at crate root
pub use capture::{CameraDevice, CaptureConfig, CaptureSession, Image, MockCamera};
pub use client::{AuthFailure, AuthenticationClient, AuthenticationOutcome, ServiceConfig};
pub use config::{ConfigError, FileConfig};
pub use enrollment::EnrollmentBuffer;
pub use flow::{FlowError, SigninFlow, SignupFlow};
pub use metrics::MetricsRegistry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
