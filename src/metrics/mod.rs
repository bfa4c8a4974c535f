//! Prometheus metrics for capture and submission monitoring.
//!
//! # Metrics Exposed
//!
//! ## Capture Metrics
//! - `face_auth_frames_captured_total` - Still frames captured from the camera
//! - `face_auth_enrollment_images` - Images submitted per sign-up (histogram)
//!
//! ## Submission Metrics
//! - `face_auth_submissions_total{endpoint, outcome}` - Submissions, with
//!   outcome one of `success`, `rejected`, `transport`
//! - `face_auth_submission_duration_seconds{endpoint}` - Round-trip time
//!
//! # Example
//!
//! ```no_run
//! use face_auth_client::metrics::MetricsRegistry;
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.record_capture();
//! println!("{}", registry.encode().expect("Failed to encode metrics"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
