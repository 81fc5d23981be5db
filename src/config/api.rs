//! Course backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::Environment;

/// Course backend configuration
///
/// The base URL is environment-driven; nothing in the client inspects
/// the hostname at runtime to pick a backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// Get the request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate backend configuration
    ///
    /// In production, requires HTTPS for the base URL.
    /// In development, allows localhost with HTTP/HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("API_BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        if *environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
