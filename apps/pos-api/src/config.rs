//! POS API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::env;

/// POS API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Card gateway base URL. Overridden in tests to point at a mock.
    pub stripe_base_url: String,

    /// SMTP relay for receipt emails
    pub smtp: SmtpConfig,
}

/// SMTP relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Credentials are optional; a localhost relay needs none.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address on receipt emails.
    pub from_address: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./atlas.db".to_string()),

            stripe_base_url: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),

            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),

                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "25".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,

                username: env::var("SMTP_USERNAME").ok(),

                password: env::var("SMTP_PASSWORD").ok(),

                from_address: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "receipts@localhost".to_string()),
            },
        };

        // Credentials come in pairs
        if config.smtp.username.is_some() != config.smtp.password.is_some() {
            return Err(ConfigError::PartialSmtpCredentials);
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("SMTP_USERNAME and SMTP_PASSWORD must be set together")]
    PartialSmtpCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Env-free load picks development defaults
        let config = ApiConfig::load().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.stripe_base_url, "https://api.stripe.com");
        assert_eq!(config.smtp.port, 25);
    }
}
