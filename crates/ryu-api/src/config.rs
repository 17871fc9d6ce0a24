//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Fallback signing secret for local development only.
const DEV_TOKEN_SECRET: &str = "dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// HMAC secret for bearer tokens
    pub token_secret: String,
    /// Bearer token lifetime
    pub token_ttl: Duration,
    /// Bcrypt work factor
    pub password_cost: u32,
    /// Directory for uploaded profile pictures
    pub upload_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
            token_secret: DEV_TOKEN_SECRET.to_string(),
            token_ttl: Duration::from_secs(30 * 60),
            password_cost: bcrypt::DEFAULT_COST,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            token_secret: std::env::var("TOKEN_SECRET").unwrap_or(defaults.token_secret),
            token_ttl: Duration::from_secs(
                std::env::var("TOKEN_TTL_MINUTES")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(|minutes| minutes * 60)
                    .unwrap_or(30 * 60),
            ),
            password_cost: std::env::var("PASSWORD_HASH_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.password_cost),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// True when the token secret is still the development fallback.
    pub fn uses_dev_secret(&self) -> bool {
        self.token_secret == DEV_TOKEN_SECRET
    }
}
