use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// An environment variable is set but cannot be parsed into the expected type.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {message}")]
pub struct InvalidEnvVarError {
    /// Name of the offending variable.
    pub name: String,
    /// Parser message for the rejected value.
    pub message: String,
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Empty values are treated as missing: a blank `AQI_API_KEY=` line in a
/// `.env` file should fail the same way as an absent one.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    get_env_var_opt(name).ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable. Blank values read as `None`.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is unset, and an error when it is set
/// to something `T` cannot parse.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, InvalidEnvVarError>
where
    T: FromStr,
    T::Err: Display,
{
    match get_env_var_opt(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| InvalidEnvVarError {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}
