//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `taskdesk.db` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8787` |
//! | `DB_POOL_SIZE` | `8` |
//! | `LAYOUT_POLICY` | `detect_once` |
//! | `CORS_ORIGINS` | `http://localhost:3000,http://127.0.0.1:3000` |
//! | `AUTO_MIGRATE` | `false` |

use axum::http::HeaderValue;
use std::env;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

use crate::task::adapters::sqlite::{LayoutPolicy, ParseLayoutPolicyError};

const DEFAULT_DATABASE_URL: &str = "taskdesk.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Errors raised for malformed configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `HOST` is not an IP address.
    #[error("invalid HOST '{0}', expected an IP address")]
    InvalidHost(String),

    /// `PORT` is not a port number.
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),

    /// `DB_POOL_SIZE` is not a positive integer.
    #[error("invalid DB_POOL_SIZE '{0}', expected a positive integer")]
    InvalidPoolSize(String),

    /// `LAYOUT_POLICY` names no known policy.
    #[error(transparent)]
    InvalidLayoutPolicy(#[from] ParseLayoutPolicyError),

    /// An entry of `CORS_ORIGINS` is not a valid header value.
    #[error("invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),

    /// A boolean flag holds something other than true/false.
    #[error("invalid value '{value}' for {name}, expected true or false")]
    InvalidFlag {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Runtime configuration of the server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `SQLite` database path or URL.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_address: SocketAddr,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// How the task table layout is determined.
    pub layout_policy: LayoutPolicy,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<HeaderValue>,
    /// Whether to create the task table at startup when it is missing.
    pub auto_migrate: bool,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = read("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let host = read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.clone()))?;
        let port = match read("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            None => DEFAULT_PORT,
        };

        let pool_size = match read("DB_POOL_SIZE") {
            Some(value) => match value.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPoolSize(value)),
            },
            None => DEFAULT_POOL_SIZE,
        };

        let layout_policy = match read("LAYOUT_POLICY") {
            Some(value) => value.parse()?,
            None => LayoutPolicy::default(),
        };

        let cors_origins = match read("CORS_ORIGINS") {
            Some(value) => parse_origins(value.split(','))?,
            None => parse_origins(DEFAULT_CORS_ORIGINS)?,
        };

        let auto_migrate = match read("AUTO_MIGRATE") {
            Some(value) => parse_flag("AUTO_MIGRATE", &value)?,
            None => false,
        };

        Ok(Self {
            database_url,
            bind_address: SocketAddr::new(ip, port),
            pool_size,
            layout_policy,
            cors_origins,
            auto_migrate,
        })
    }
}

fn parse_origins<'a>(
    origins: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<HeaderValue>, ConfigError> {
    origins
        .into_iter()
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_owned()))
        })
        .collect()
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_owned(),
        }),
    }
}
