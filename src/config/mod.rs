use std::env;
use std::time::Duration;

use thiserror::Error;

/// Startup configuration problems. The server refuses to start on any of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// What the limiter does when the shared store cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub store_backend: StoreBackend,
    pub server_host: String,
    pub server_port: u16,
    pub api_key: String,
    pub rate_limit_requests: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_fail_mode: FailMode,
    pub session_list_ttl_minutes: u64,
    pub store_timeout_ms: u64,
    pub request_timeout_secs: u64,
    pub health_path_prefix: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store_backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("redis") => StoreBackend::Redis,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected `redis` or `memory`",
                });
            }
        };

        let rate_limit_fail_mode = match var("RATE_LIMIT_FAIL_MODE").as_deref().map(str::trim) {
            None | Some("open") => FailMode::Open,
            Some("closed") => FailMode::Closed,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "RATE_LIMIT_FAIL_MODE",
                    value: other.to_string(),
                    reason: "expected `open` or `closed`",
                });
            }
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let mut health_path_prefix = var("HEALTH_PATH_PREFIX").unwrap_or_else(|| "/health".into());
        if !health_path_prefix.starts_with('/') {
            health_path_prefix.insert(0, '/');
        }

        Ok(Config {
            database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            redis_url: var("REDIS_URL"),
            store_backend,
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_number("SERVER_PORT", var("SERVER_PORT"), 8080)?,
            api_key: var("API_KEY").unwrap_or_default(),
            rate_limit_requests: positive(
                "RATE_LIMIT_MAX_REQUESTS",
                var("RATE_LIMIT_MAX_REQUESTS"),
                100,
            )?,
            rate_limit_window_secs: positive(
                "RATE_LIMIT_WINDOW_SECONDS",
                var("RATE_LIMIT_WINDOW_SECONDS"),
                60,
            )?,
            rate_limit_fail_mode,
            session_list_ttl_minutes: positive(
                "SESSION_LIST_TTL_MINUTES",
                var("SESSION_LIST_TTL_MINUTES"),
                10,
            )?,
            store_timeout_ms: positive("STORE_TIMEOUT_MS", var("STORE_TIMEOUT_MS"), 500)?,
            request_timeout_secs: positive(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS"),
                30,
            )?,
            health_path_prefix,
            cors_allowed_origins,
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn session_list_ttl(&self) -> Duration {
        Duration::from_secs(self.session_list_ttl_minutes * 60)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            reason: "not a valid non-negative integer",
        }),
    }
}

fn positive(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let value = parse_number(name, raw, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be greater than zero",
        });
    }
    Ok(value)
}
