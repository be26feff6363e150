//! Environment configuration for the API binary.

use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration read from the environment.
///
/// Every backing service is optional so a dev checkout runs with zero
/// external dependencies; each absent variable downgrades one concern
/// (in-memory stores, disabled cache, static tier directory) with a warning.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub clerk_secret_key: Option<String>,
    pub jwt_secret: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            database_url: non_empty(std::env::var("DATABASE_URL").ok()),
            redis_url: non_empty(std::env::var("REDIS_URL").ok()),
            clerk_secret_key: non_empty(std::env::var("CLERK_SECRET_KEY").ok()),
            jwt_secret,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
