//! Provider abstraction for air-quality data sources.
//!
//! This module defines the [`AirQualityProvider`] trait, which serves as a unified
//! interface for fetching AQI readings from any upstream vendor (e.g., OpenWeatherMap).
//!
//! Each concrete provider should implement [`AirQualityProvider`] to handle its
//! vendor-specific API logic and payload validation, and hand back canonical
//! [`RawReading`]s.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn AirQualityProvider`), which is how the pipeline tests swap in canned data.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use aqi_ingestor::models::{
//!     location::GeoPoint,
//!     reading::RawReading,
//!     request_params::HistoryRequestParams,
//! };
//! use aqi_ingestor::providers::{AirQualityProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl AirQualityProvider for MyProvider {
//!     async fn fetch_current(&self, _location: GeoPoint) -> Result<Vec<RawReading>, ProviderError> {
//!         Ok(vec![RawReading::bare(1_735_689_600, 3)])
//!     }
//!
//!     async fn fetch_history(
//!         &self,
//!         _params: HistoryRequestParams,
//!     ) -> Result<Vec<RawReading>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod openweather;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{
    location::GeoPoint,
    reading::{RawReading, ReadingShapeError},
    request_params::HistoryRequestParams,
};

/// Trait for fetching AQI readings from an air-quality provider.
#[async_trait]
pub trait AirQualityProvider {
    /// Fetches the most recent reading(s) for `location`.
    ///
    /// An empty vector means the provider had nothing new; it is not an error.
    async fn fetch_current(&self, location: GeoPoint) -> Result<Vec<RawReading>, ProviderError>;

    /// Fetches historical readings over `params.start..params.end`.
    ///
    /// Implementations return readings in ascending timestamp order with no
    /// duplicate timestamps.
    async fn fetch_history(
        &self,
        params: HistoryRequestParams,
    ) -> Result<Vec<RawReading>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// Base URL does not parse.
    #[snafu(display("Invalid base URL {url}: {message}"))]
    InvalidBaseUrl {
        url: String,
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within an `AirQualityProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a non-success status (e.g., invalid API key).
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// A payload entry lacked a mandatory field; the whole batch is rejected.
    #[snafu(display("Malformed reading at position {index}: {source}"))]
    MalformedReading {
        index: usize,
        source: ReadingShapeError,
        backtrace: Backtrace,
    },
}
