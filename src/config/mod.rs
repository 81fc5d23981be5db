//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `LEARNSPHERE_` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use learnsphere::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.api.base_url);
//! ```

mod api;
mod error;
mod identity;

pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the LearnSphere client.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,

    /// Log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identity toolkit configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Course backend configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LEARNSPHERE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LEARNSPHERE__API__BASE_URL=...` -> `api.base_url = ...`
    /// - `LEARNSPHERE__IDENTITY__API_KEY=...` -> `identity.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LEARNSPHERE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - URL formats
    /// - Timeout bounds
    /// - Production-specific requirements (e.g., HTTPS)
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identity.validate(&self.environment)?;
        self.api.validate(&self.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn default_log_level() -> String {
    "info,learnsphere=debug".to_string()
}
