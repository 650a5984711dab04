//! Admin configuration from environment variables.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors with context about what's missing or invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidEnvVar { name: String, reason: String },
}

/// Runtime configuration for the admin components.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the refund endpoint.
    pub refund_base_url: Url,
    /// Base URL of the callable functions endpoint, when deployed.
    pub functions_base_url: Option<Url>,
    /// Request timeout for refund and callable HTTP calls.
    pub http_timeout: Duration,
}

impl AdminConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads `.env` first so local development works without exported
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let refund_base_url = parse_url(
            "SWEETSLOT_REFUND_BASE_URL",
            &lookup("SWEETSLOT_REFUND_BASE_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("SWEETSLOT_REFUND_BASE_URL".into()))?,
        )?;

        let functions_base_url = lookup("SWEETSLOT_FUNCTIONS_BASE_URL")
            .map(|raw| parse_url("SWEETSLOT_FUNCTIONS_BASE_URL", &raw))
            .transpose()?;

        let timeout_secs = match lookup("SWEETSLOT_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                name: "SWEETSLOT_HTTP_TIMEOUT_SECS".into(),
                reason: e.to_string(),
            })?,
            None => 30,
        };

        Ok(Self {
            refund_base_url,
            functions_base_url,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}
