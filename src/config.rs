use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Deployment environment. Internal error details are only exposed in development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Fixed-window request limit applied per client IP.
#[derive(Debug, Clone)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    /// Directory holding a prebuilt web client. Not served when `None`.
    pub static_path: Option<PathBuf>,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub rate_limit: RateLimit,
    pub environment: Environment,
}

/// Secret used when `FINANZAS_JWT_SECRET` is not set. Only accepted in development.
pub const DEFAULT_JWT_SECRET: &str = "finanzas-development-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FINANZAS_JWT_SECRET must be set outside development")]
    MissingJwtSecret,
}

/// The configured signing secret, or the development default when running in
/// development. Anywhere else a missing secret is fatal.
fn resolve_jwt_secret(
    configured: Option<String>,
    environment: Environment,
) -> Result<String, ConfigError> {
    match configured {
        Some(secret) if !secret.trim().is_empty() => Ok(secret),
        _ if environment.is_development() => {
            tracing::warn!("FINANZAS_JWT_SECRET is not set, using the development secret");
            Ok(DEFAULT_JWT_SECRET.to_string())
        }
        _ => Err(ConfigError::MissingJwtSecret),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("FINANZAS_ENV")
            .map(|v| Environment::from_str(&v))
            .unwrap_or(Environment::Production);

        let jwt_secret = resolve_jwt_secret(env::var("FINANZAS_JWT_SECRET").ok(), environment)?;

        let default_limit = RateLimit::default();

        Ok(Self {
            host: env::var("FINANZAS_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("FINANZAS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_path: env::var("FINANZAS_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/finanzas.db")),
            migrations_path: env::var("FINANZAS_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            static_path: env::var("FINANZAS_STATIC_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            jwt_secret,
            token_ttl_days: env::var("FINANZAS_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|days| *days > 0)
                .unwrap_or(7),
            cors_origins: env::var("FINANZAS_CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]),
            rate_limit: RateLimit {
                max_requests: env::var("FINANZAS_RATE_LIMIT_MAX")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default_limit.max_requests),
                window: env::var("FINANZAS_RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(default_limit.window),
            },
            environment,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
