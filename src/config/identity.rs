//! Identity provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::Environment;

/// Identity toolkit configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Identity toolkit base URL
    #[serde(default)]
    pub endpoint: String,

    /// Project API key, sent in the query string of every request
    #[serde(default = "default_api_key")]
    pub api_key: SecretString,

    /// ID token persisted from a previous run, used to restore the
    /// session at startup
    #[serde(default)]
    pub stored_id_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl IdentityConfig {
    /// Get the request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate identity configuration
    ///
    /// In production, requires HTTPS for the endpoint URL.
    /// In development, allows localhost with HTTP/HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.endpoint.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY_ENDPOINT"));
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY_API_KEY"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        if *environment == Environment::Production && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::EndpointMustBeHttps);
        }

        Ok(())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: default_api_key(),
            stored_id_token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_key() -> SecretString {
    SecretString::new(String::new())
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> IdentityConfig {
        IdentityConfig {
            endpoint: "https://identity.example.com".to_string(),
            api_key: SecretString::new("key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_identity_config_defaults() {
        let config = IdentityConfig::default();
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.stored_id_token.is_none());
    }

    #[test]
    fn test_request_timeout_duration() {
        let config = IdentityConfig {
            request_timeout_secs: 20,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_validation_missing_endpoint() {
        let config = IdentityConfig::default();
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = IdentityConfig {
            endpoint: "https://identity.example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_production_requires_https() {
        let config = IdentityConfig {
            endpoint: "http://identity.example.com".to_string(),
            ..valid_config()
        };
        // Allowed in development
        assert!(config.validate(&Environment::Development).is_ok());
        // Rejected in production
        assert!(config.validate(&Environment::Production).is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_api_key() {
        let config = IdentityConfig {
            api_key: SecretString::new("super-secret".to_string()),
            ..valid_config()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
