//! HTTP client for the authentication service.

use super::{
    AuthenticationOutcome, Endpoint, ServiceConfig, SigninRequest, SignupRequest,
};
use crate::config::ConfigError;
use crate::metrics::MetricsRegistry;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

/// Errors that can occur while constructing the client.
///
/// Submissions themselves never fail with an error; they resolve to an
/// [`AuthenticationOutcome`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Service settings failed validation.
    #[error("invalid service configuration: {0}")]
    Config(#[from] ConfigError),
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Submits sign-in and sign-up requests to the authentication service.
///
/// Each call makes exactly one POST with a JSON body and never retries.
/// Transport faults are folded into the returned outcome.
#[derive(Debug, Clone)]
pub struct AuthenticationClient {
    http: Client,
    signin_url: Url,
    signup_url: Url,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl AuthenticationClient {
    /// Creates a client for the configured service.
    pub fn new(config: &ServiceConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let base = config.parsed_base_url()?;
        let join = |endpoint: Endpoint| {
            base.join(endpoint.as_str())
                .map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))
        };

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            signin_url: join(Endpoint::Signin)?,
            signup_url: join(Endpoint::Signup)?,
            metrics: None,
        })
    }

    /// Records submissions into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Returns the attached metrics registry.
    pub fn metrics(&self) -> Option<&Arc<MetricsRegistry>> {
        self.metrics.as_ref()
    }

    /// Returns the resolved URL of `endpoint`.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Signin => &self.signin_url,
            Endpoint::Signup => &self.signup_url,
        }
    }

    /// Submits a verification attempt.
    pub async fn signin(&self, request: &SigninRequest) -> AuthenticationOutcome {
        let images = usize::from(request.face_image.is_some());
        self.submit(Endpoint::Signin, &request.payload(), images)
            .await
    }

    /// Submits an enrollment attempt.
    pub async fn signup(&self, request: &SignupRequest) -> AuthenticationOutcome {
        if let Some(metrics) = &self.metrics {
            metrics.record_enrollment(request.face_images.len());
        }
        self.submit(Endpoint::Signup, &request.payload(), request.face_images.len())
            .await
    }

    async fn submit<B: Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
        images: usize,
    ) -> AuthenticationOutcome {
        let url = self.endpoint_url(endpoint);
        let span = info_span!(
            "auth.submit",
            http.method = "POST",
            %endpoint,
            url = %url,
            images
        );

        let started = Instant::now();
        let outcome = async {
            match self.post_json(url, body).await {
                Ok((status, bytes)) => {
                    debug!(status = status.as_u16(), bytes = bytes.len(), "Service responded");
                    AuthenticationOutcome::from_response(endpoint, status, &bytes)
                }
                Err(e) => {
                    warn!("Submission could not be completed: {}", e);
                    AuthenticationOutcome::transport(endpoint)
                }
            }
        }
        .instrument(span)
        .await;
        let elapsed = started.elapsed();

        match &outcome {
            AuthenticationOutcome::Success { .. } => {
                info!(%endpoint, elapsed_ms = elapsed.as_millis() as u64, "Authentication succeeded");
            }
            AuthenticationOutcome::Failure(failure) => {
                info!(%endpoint, elapsed_ms = elapsed.as_millis() as u64, "Authentication failed: {}", failure);
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_submission(endpoint, &outcome, elapsed);
        }
        outcome
    }

    async fn post_json<B: Serialize>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<(reqwest::StatusCode, Vec<u8>), reqwest::Error> {
        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec()))
    }
}
