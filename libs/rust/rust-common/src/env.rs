//! Environment-driven configuration helpers.
//!
//! Services read their settings from environment variables (optionally
//! seeded from a `.env` file). Lookups go through [`EnvSource`] so that
//! tests can supply a plain map instead of touching the process environment.

use crate::PlatformError;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// A source of configuration variables.
pub trait EnvSource {
    /// Get the raw value of a variable, if set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads variables from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).map(|v| (*v).to_string())
    }
}

/// Load variables from a `.env` file in the working directory, if present.
///
/// Variables already set in the process environment take precedence.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Parse a variable with a default value.
///
/// # Errors
///
/// Returns [`PlatformError::Config`] if the variable is set but cannot be
/// parsed as `T`.
pub fn parse_var<T, S>(source: &S, name: &str, default: T) -> Result<T, PlatformError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    S: EnvSource + ?Sized,
{
    match source.get(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| PlatformError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

/// Parse a whole number of seconds into a [`Duration`].
///
/// # Errors
///
/// Returns [`PlatformError::Config`] if the value is not a non-negative
/// integer.
pub fn parse_secs<S>(source: &S, name: &str, default_secs: u64) -> Result<Duration, PlatformError>
where
    S: EnvSource + ?Sized,
{
    parse_var(source, name, default_secs).map(Duration::from_secs)
}

/// Parse a boolean flag.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` in any case.
///
/// # Errors
///
/// Returns [`PlatformError::Config`] for any other value.
pub fn parse_bool<S>(source: &S, name: &str, default: bool) -> Result<bool, PlatformError>
where
    S: EnvSource + ?Sized,
{
    let Some(raw) = source.get(name) else {
        return Ok(default);
    };

    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(PlatformError::config(format!(
            "Invalid {name}: expected a boolean, got {other:?}"
        ))),
    }
}
