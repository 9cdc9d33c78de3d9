//! Server configuration loaded from environment variables.

use std::time::Duration;

/// A malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines (default).
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Server configuration.
///
/// All fields except `database_url` have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// PostgreSQL connection URL (required).
    pub database_url: String,
    /// Connection pool size (default: `10`).
    pub database_max_connections: u32,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long a project's thresholds stay cached (default: `300`).
    pub threshold_cache_ttl_secs: u64,
    /// Maximum number of cached threshold lists (default: `10000`, `0` disables).
    pub threshold_cache_max_entries: u64,
    /// Interval of the expired-entry sweeper (default: `60`).
    pub cache_sweep_interval_secs: u64,
    /// Metrics of one report evaluated in parallel (default: `8`).
    pub evaluation_concurrency: usize,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `DATABASE_URL`                | (required)              |
    /// | `DATABASE_MAX_CONNECTIONS`    | `10`                    |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `THRESHOLD_CACHE_TTL_SECS`    | `300`                   |
    /// | `THRESHOLD_CACHE_MAX_ENTRIES` | `10000`                 |
    /// | `CACHE_SWEEP_INTERVAL_SECS`   | `60`                    |
    /// | `EVALUATION_CONCURRENCY`      | `8`                     |
    /// | `LOG_FORMAT`                  | `pretty`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing {
                name: "DATABASE_URL",
            })?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") | Some("") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected 'pretty' or 'json'".to_string(),
                })
            }
        };

        let config = Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_var(&lookup, "PORT", 3000)?,
            database_url,
            database_max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            cors_origins,
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            threshold_cache_ttl_secs: parse_var(&lookup, "THRESHOLD_CACHE_TTL_SECS", 300)?,
            threshold_cache_max_entries: parse_var(&lookup, "THRESHOLD_CACHE_MAX_ENTRIES", 10_000)?,
            cache_sweep_interval_secs: parse_var(&lookup, "CACHE_SWEEP_INTERVAL_SECS", 60)?,
            evaluation_concurrency: parse_var(&lookup, "EVALUATION_CONCURRENCY", 8)?,
            log_format,
        };

        require_positive("DATABASE_MAX_CONNECTIONS", config.database_max_connections as u64)?;
        require_positive("REQUEST_TIMEOUT_SECS", config.request_timeout_secs)?;
        require_positive("THRESHOLD_CACHE_TTL_SECS", config.threshold_cache_ttl_secs)?;
        require_positive("THRESHOLD_CACHE_MAX_ENTRIES", config.threshold_cache_max_entries)?;
        require_positive("CACHE_SWEEP_INTERVAL_SECS", config.cache_sweep_interval_secs)?;
        require_positive("EVALUATION_CONCURRENCY", config.evaluation_concurrency as u64)?;
        Ok(config)
    }

    pub fn threshold_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.threshold_cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn require_positive(name: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
