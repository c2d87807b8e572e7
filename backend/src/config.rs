//! Runtime settings.
//!
//! Read from the environment after loading an optional `.env` file:
//!
//! | Variable                 | Default | Meaning                          |
//! |--------------------------|---------|----------------------------------|
//! | `AUTOCLEAN_TIMEOUT_SECS` | 30      | Download timeout                 |
//! | `AUTOCLEAN_PREVIEW_ROWS` | 5       | Rows shown in the cleaned preview|
//! | `AUTOCLEAN_PORT`         | 3000    | HTTP server port                 |

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timeout_secs: u64,
    pub preview_rows: usize,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            timeout_secs: read(&lookup, "AUTOCLEAN_TIMEOUT_SECS", defaults.timeout_secs)?,
            preview_rows: read(&lookup, "AUTOCLEAN_PREVIEW_ROWS", defaults.preview_rows)?,
            port: read(&lookup, "AUTOCLEAN_PORT", defaults.port)?,
        })
    }
}

fn read<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}
