use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clinica";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default token lifetime, matching the original deployment (7 days).
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Runtime configuration, read once from the environment at startup and
/// passed explicitly to the components that need it (no ambient globals).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

impl AppConfig {
    /// Build config from environment variables with development defaults.
    ///
    /// `JWT_SECRET` has a well-known default so the server boots out of the
    /// box; deployments must override it.
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5000)));

        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("clinica.db"));

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using insecure development default");
            "clinica-dev-secret".to_string()
        });

        let token_ttl_days = env::var("JWT_EXPIRES_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_DAYS);

        Self {
            bind_addr,
            database_path,
            jwt_secret,
            token_ttl_days,
        }
    }
}

pub fn default_log_filter() -> &'static str {
    "info,clinica=debug"
}
