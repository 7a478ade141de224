//! Pipeline configuration: TOML file, environment overrides, validation.
//!
//! ```toml
//! database_url = "sqlite://data/aqi.db"
//!
//! [location]
//! lat = 30.746
//! lon = 73.331
//!
//! [ingest]
//! history_limit = 30
//! requests_per_second = 1
//!
//! [training]
//! horizon = 72
//! test_fraction = 0.2
//! ```
//!
//! Every section is optional. `DATABASE_URL` and `AQI_REQUESTS_PER_SECOND`
//! override the file. The API key never lives in the file; it is read from
//! `AQI_API_KEY` by [`PipelineConfig::provider_config`].

use std::{num::NonZeroU32, path::Path};

use aqi_ingestor::{
    models::location::GeoPoint,
    providers::openweather::{
        OpenWeatherConfig,
        params::{DEFAULT_BASE_URL, default_requests_per_second},
    },
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shared_utils::env::{
    InvalidEnvVarError, MissingEnvVarError, get_env_var, get_env_var_opt, parse_env_var,
};
use thiserror::Error;

use crate::{dataset::DEFAULT_HORIZON, features::MIN_HISTORY};

/// Overrides [`PipelineConfig::database_url`].
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Overrides [`IngestConfig::requests_per_second`].
pub const REQUESTS_PER_SECOND_VAR: &str = "AQI_REQUESTS_PER_SECOND";
pub use aqi_ingestor::providers::openweather::provider::API_KEY_VAR;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File path as given.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override variable holds an unparseable value.
    #[error(transparent)]
    Env(#[from] InvalidEnvVarError),

    /// The API key variable is unset.
    #[error(transparent)]
    MissingApiKey(#[from] MissingEnvVarError),

    /// A value is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the acquisition side of the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct IngestConfig {
    /// Current-readings endpoint; history is fetched from `{base_url}/history`.
    pub base_url: String,
    /// Stored rows read back as context for an hourly run.
    pub history_limit: usize,
    /// Upper bound on provider calls per second.
    pub requests_per_second: NonZeroU32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            history_limit: 30,
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Settings for dataset assembly and evaluation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrainingConfig {
    /// Rows of lookahead per training example.
    pub horizon: usize,
    /// Share of examples held out as the test suffix.
    pub test_fraction: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            test_fraction: 0.2,
        }
    }
}

/// Everything a pipeline run needs, passed explicitly to each stage.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// SQLite path or `sqlite:` URL of the feature store.
    pub database_url: String,
    /// Monitored site.
    pub location: GeoPoint,
    /// Acquisition settings.
    pub ingest: IngestConfig,
    /// Dataset settings.
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_url: "aqi_features.db".to_string(),
            location: GeoPoint::default(),
            ingest: IngestConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a TOML document without consulting the environment.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads the file at `path` (or defaults when `None`), then applies
    /// environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.display().to_string(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => Self::default(),
        };
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = get_env_var_opt(DATABASE_URL_VAR) {
            self.database_url = url;
        }
        if let Some(rps) = parse_env_var::<NonZeroU32>(REQUESTS_PER_SECOND_VAR)? {
            self.ingest.requests_per_second = rps;
        }
        Ok(())
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.database_url.trim().is_empty() {
            return invalid("database_url is empty".into());
        }
        if !self.location.is_valid() {
            return invalid(format!("location out of range: {:?}", self.location));
        }
        if self.ingest.history_limit < MIN_HISTORY {
            return invalid(format!(
                "ingest.history_limit must be at least {MIN_HISTORY}, got {}",
                self.ingest.history_limit
            ));
        }
        if self.training.horizon == 0 {
            return invalid("training.horizon must be at least 1".into());
        }
        let f = self.training.test_fraction;
        if !(f > 0.0 && f < 1.0) {
            return invalid(format!("training.test_fraction must be in (0, 1), got {f}"));
        }
        Ok(())
    }

    /// Provider settings with the API key read from `AQI_API_KEY`.
    pub fn provider_config(&self) -> Result<OpenWeatherConfig, ConfigError> {
        let api_key = SecretString::from(get_env_var(API_KEY_VAR)?);
        let mut provider = OpenWeatherConfig::new(api_key);
        provider.base_url = self.ingest.base_url.clone();
        provider.requests_per_second = self.ingest.requests_per_second;
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serial_test::serial;

    use super::*;

    const FULL: &str = r#"
database_url = "sqlite://data/aqi.db"

[location]
lat = 24.86
lon = 67.0

[ingest]
base_url = "http://localhost:9000/air_pollution"
history_limit = 48
requests_per_second = 5

[training]
horizon = 24
test_fraction = 0.25
"#;

    #[test]
    fn parses_every_section() {
        let cfg = PipelineConfig::from_toml_str(FULL).unwrap();
        assert_eq!(cfg.database_url, "sqlite://data/aqi.db");
        assert_eq!(cfg.location, GeoPoint::new(24.86, 67.0));
        assert_eq!(cfg.ingest.history_limit, 48);
        assert_eq!(cfg.ingest.requests_per_second.get(), 5);
        assert_eq!(cfg.training.horizon, 24);
        assert_eq!(cfg.training.test_fraction, 0.25);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.ingest.history_limit, 30);
        assert_eq!(cfg.training.horizon, 72);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineConfig::from_toml_str("[ingest]\nretries = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn short_history_limit_is_rejected() {
        let err = PipelineConfig::from_toml_str("[ingest]\nhistory_limit = 23\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_fraction_bounds() {
        for bad in ["0.0", "1.0", "-0.5"] {
            let doc = format!("[training]\ntest_fraction = {bad}\n");
            assert!(PipelineConfig::from_toml_str(&doc).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn zero_rate_is_a_parse_error() {
        let err = PipelineConfig::from_toml_str("[ingest]\nrequests_per_second = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), FULL).unwrap();

        unsafe {
            std::env::set_var(DATABASE_URL_VAR, "sqlite:/tmp/override.db");
            std::env::set_var(REQUESTS_PER_SECOND_VAR, "2");
        }
        let cfg = PipelineConfig::load(Some(file.path()));
        unsafe {
            std::env::remove_var(DATABASE_URL_VAR);
            std::env::remove_var(REQUESTS_PER_SECOND_VAR);
        }

        let cfg = cfg.unwrap();
        assert_eq!(cfg.database_url, "sqlite:/tmp/override.db");
        assert_eq!(cfg.ingest.requests_per_second.get(), 2);
        assert_eq!(cfg.ingest.history_limit, 48);
    }

    #[test]
    #[serial]
    fn bad_override_is_reported() {
        unsafe { std::env::set_var(REQUESTS_PER_SECOND_VAR, "fast") };
        let res = PipelineConfig::load(None);
        unsafe { std::env::remove_var(REQUESTS_PER_SECOND_VAR) };

        assert!(matches!(res, Err(ConfigError::Env(_))));
    }

    #[test]
    fn unknown_location_key_is_rejected() {
        let res = PipelineConfig::from_toml_str("[location]\nlat = 1.0\nlon = 2.0\nlng = 3.0\n");
        assert!(matches!(res, Err(ConfigError::Parse(_))), "{res:?}");
    }

    #[test]
    #[serial]
    fn provider_config_reads_key_from_env() {
        let cfg = PipelineConfig::from_toml_str(FULL).unwrap();

        unsafe { std::env::remove_var(API_KEY_VAR) };
        assert!(matches!(cfg.provider_config(), Err(ConfigError::MissingApiKey(_))));

        unsafe { std::env::set_var(API_KEY_VAR, "secret-key") };
        let provider = cfg.provider_config();
        unsafe { std::env::remove_var(API_KEY_VAR) };

        let provider = provider.unwrap();
        assert_eq!(provider.api_key.expose_secret(), "secret-key");
        assert_eq!(provider.base_url, "http://localhost:9000/air_pollution");
        assert_eq!(provider.requests_per_second.get(), 5);
    }
}
