use std::path::PathBuf;

use chargeplan_pipeline::config::ModelConfig;

use crate::auth::jwt::JwtConfig;
use crate::pricing::PricingConfig;

/// Server configuration loaded from environment variables.
///
/// Network settings have defaults suitable for local development; secrets and
/// artifact locations must be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Bounds the whole
    /// request, including model inference.
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// JSON file holding the credential records.
    pub credentials_file: PathBuf,
    /// Scaler and model artifact location.
    pub model: ModelConfig,
    /// Day-ahead price source.
    pub pricing: PricingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CREDENTIALS_FILE`     | required                   |
    ///
    /// See [`JwtConfig::from_env`], [`ModelConfig::from_env`] and
    /// [`PricingConfig::from_env`] for the remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let credentials_file = std::env::var("CREDENTIALS_FILE")
            .map(PathBuf::from)
            .expect("CREDENTIALS_FILE must be set in the environment");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            credentials_file,
            model: ModelConfig::from_env(),
            pricing: PricingConfig::from_env(),
        }
    }
}
