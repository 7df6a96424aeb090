//! Process configuration.
//!
//! Resolved once at startup (after `.env` is loaded) and passed explicitly to
//! the server and the load orchestrator. Nothing below the entry points reads
//! the environment.

use crate::error::ConfigError;

/// Listening port.
pub const DEFAULT_PORT: u16 = 4000;

/// Maximum upload size (in megabytes).
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Where loads go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub table: String,
    /// Date column checked during reconciliation.
    pub date_column: String,
    /// Value the destination stores for an unparsable date.
    pub invalid_date: String,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Allowed cross-origin caller, `None` for any.
    pub cors_origin: Option<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub destination: DestinationConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let cors_origin = get("CORS_ORIGIN").filter(|o| o.trim() != "*");
        let max_upload_mb: usize = parse_number("MAX_UPLOAD_MB", get("MAX_UPLOAD_MB"), DEFAULT_MAX_UPLOAD_MB)?;

        Ok(Config {
            server: ServerConfig {
                port: parse_number("PORT", get("PORT"), DEFAULT_PORT)?,
                cors_origin,
                max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            },
            destination: DestinationConfig {
                host: or("DB_HOST", "localhost"),
                port: parse_number("DB_PORT", get("DB_PORT"), 3306)?,
                user: get("DB_USER"),
                password: lookup("DB_PASSWORD"),
                database: or("DB_NAME", "corven"),
                table: or("DB_TABLE", "crudo_ap"),
                date_column: or("DB_DATE_COLUMN", "FechaDoc"),
                invalid_date: or("DB_INVALID_DATE", "0000-00-00"),
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value: v }),
    }
}
