//! Authentication service configuration.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use url::Url;

/// User agent sent with every request.
pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Where and how to reach the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL the `signin` and `signup` endpoints are resolved against.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent header value.
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            user_agent: APP_USER_AGENT.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Creates a configuration for the given base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Parses the base URL, normalised to end with a slash so endpoint
    /// paths are appended to any path prefix instead of replacing it.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ConfigError::InvalidBaseUrl(format!(
                    "unsupported scheme {scheme}"
                )))
            }
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}
