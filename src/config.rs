//! Process configuration loaded from environment variables
//!
//! Read once at startup and never mutated afterwards:
//! - `ENVIRONMENT` - deployment environment name (default: `production`)
//! - `VERSION` - reported service version (default: `1.0.0`)
//! - `PORT` - listen port injected by the platform (default: `8080`)

use std::env::VarError;
use thiserror::Error;

/// Default environment name when `ENVIRONMENT` is unset
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Default version string when `VERSION` is unset
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Default listen port when `PORT` is unset
pub const DEFAULT_PORT: u16 = 8080;

/// Errors that can occur while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid PORT value: {value:?}")]
    InvalidPort { value: String },

    #[error("{key} is not valid unicode: {value:?}")]
    NotUnicode { key: &'static str, value: String },
}

/// Immutable process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: String,
    pub version: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// `from_env` delegates here; tests pass a closure over a map so they
    /// never touch the real process environment. Only `NotPresent` falls
    /// back to a default; a non-unicode value is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let environment = read_string(&lookup, "ENVIRONMENT", DEFAULT_ENVIRONMENT)?;
        let version = read_string(&lookup, "VERSION", DEFAULT_VERSION)?;

        let port = match lookup("PORT") {
            Ok(value) => parse_port(&value)?,
            Err(VarError::NotPresent) => DEFAULT_PORT,
            Err(VarError::NotUnicode(raw)) => {
                return Err(ConfigError::InvalidPort {
                    value: raw.to_string_lossy().into_owned(),
                })
            }
        };

        Ok(Self {
            environment,
            version,
            port,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            version: DEFAULT_VERSION.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

fn read_string<F>(lookup: &F, key: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(key) {
        Ok(value) => Ok(value),
        Err(VarError::NotPresent) => Ok(default.to_string()),
        Err(VarError::NotUnicode(raw)) => Err(ConfigError::NotUnicode {
            key,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
