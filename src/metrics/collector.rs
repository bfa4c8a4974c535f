//! Metrics collection and registry.

use crate::client::{AuthFailure, AuthenticationOutcome, Endpoint};
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failure.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for capture and submission monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Capture metrics
    frames_captured: IntCounter,
    enrollment_images: Histogram,

    // Submission metrics
    submissions: IntCounterVec,
    submission_duration: HistogramVec,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all client metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_captured = IntCounter::new(
            "face_auth_frames_captured_total",
            "Total still frames captured from the camera",
        )?;
        let enrollment_images = Histogram::with_opts(
            HistogramOpts::new(
                "face_auth_enrollment_images",
                "Number of images submitted per sign-up",
            )
            .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0]),
        )?;

        let submissions = IntCounterVec::new(
            Opts::new(
                "face_auth_submissions_total",
                "Authentication submissions by endpoint and outcome",
            ),
            &["endpoint", "outcome"],
        )?;
        let submission_duration = HistogramVec::new(
            HistogramOpts::new(
                "face_auth_submission_duration_seconds",
                "Round-trip time of authentication submissions",
            ),
            &["endpoint"],
        )?;

        // Register all metrics
        registry.register(Box::new(frames_captured.clone()))?;
        registry.register(Box::new(enrollment_images.clone()))?;
        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(submission_duration.clone()))?;

        Ok(Self {
            registry,
            frames_captured,
            enrollment_images,
            submissions,
            submission_duration,
        })
    }

    /// Records one captured frame.
    pub fn record_capture(&self) {
        self.frames_captured.inc();
    }

    /// Records the image count of a sign-up submission.
    pub fn record_enrollment(&self, images: usize) {
        self.enrollment_images.observe(images as f64);
    }

    /// Records a finished submission.
    pub fn record_submission(
        &self,
        endpoint: Endpoint,
        outcome: &AuthenticationOutcome,
        elapsed: Duration,
    ) {
        let label = match outcome {
            AuthenticationOutcome::Success { .. } => "success",
            AuthenticationOutcome::Failure(AuthFailure::Rejected(_)) => "rejected",
            AuthenticationOutcome::Failure(AuthFailure::Transport(_)) => "transport",
        };
        self.submissions
            .with_label_values(&[endpoint.as_str(), label])
            .inc();
        self.submission_duration
            .with_label_values(&[endpoint.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("frames_captured", &self.frames_captured.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_submission_labels() {
        let registry = MetricsRegistry::new().unwrap();

        registry.record_submission(
            Endpoint::Signin,
            &AuthenticationOutcome::Success { message: None },
            Duration::from_millis(12),
        );
        registry.record_submission(
            Endpoint::Signup,
            &AuthenticationOutcome::Failure(AuthFailure::Transport("down".into())),
            Duration::from_millis(3),
        );
        registry.record_submission(
            Endpoint::Signup,
            &AuthenticationOutcome::Failure(AuthFailure::Rejected("taken".into())),
            Duration::from_millis(3),
        );

        let output = registry.encode().unwrap();
        assert!(output
            .contains(r#"face_auth_submissions_total{endpoint="signin",outcome="success"} 1"#));
        assert!(output
            .contains(r#"face_auth_submissions_total{endpoint="signup",outcome="transport"} 1"#));
        assert!(output
            .contains(r#"face_auth_submissions_total{endpoint="signup",outcome="rejected"} 1"#));
        assert!(output.contains("face_auth_submission_duration_seconds_count{endpoint=\"signup\"} 2"));
    }

    #[test]
    fn test_capture_counters() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_capture();
        registry.record_capture();
        registry.record_enrollment(2);

        let output = registry.encode().unwrap();
        assert!(output.contains("face_auth_frames_captured_total 2"));
        assert!(output.contains("face_auth_enrollment_images_count 1"));
        assert!(output.contains("face_auth_enrollment_images_sum 2"));
    }
}
