use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Url};
use secrecy::SecretString;
use shared_utils::env::get_env_var;
use snafu::{ResultExt, ensure};
use tracing::{debug, warn};

use crate::{
    models::{location::GeoPoint, reading::RawReading, request_params::HistoryRequestParams},
    providers::{
        AirQualityProvider, ApiSnafu, ClientBuildSnafu, InvalidBaseUrlSnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu, ValidationSnafu,
        openweather::{
            params::{OpenWeatherConfig, current_query, history_query},
            response::OwmResponse,
        },
    },
};

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_VAR: &str = "AQI_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenWeatherProvider {
    client: Client,
    config: OpenWeatherConfig,
    limiter: DefaultDirectRateLimiter,
}

impl OpenWeatherProvider {
    /// Creates a provider from explicit settings.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, ProviderInitError> {
        Url::parse(&config.base_url).map_err(|e| {
            InvalidBaseUrlSnafu {
                url: config.base_url.clone(),
                message: e.to_string(),
            }
            .build()
        })?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context(ClientBuildSnafu)?;
        let limiter = RateLimiter::direct(Quota::per_second(config.requests_per_second));

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    /// Creates a provider with default endpoint settings.
    ///
    /// Reads the API key from the `AQI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        let api_key = get_env_var(API_KEY_VAR).context(MissingEnvVarSnafu)?;
        Self::new(OpenWeatherConfig::new(SecretString::from(api_key)))
    }

    async fn get_readings(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Vec<RawReading>, ProviderError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response.json::<OwmResponse>().await.context(ReqwestSnafu)?;
        body.into_readings()
    }
}

#[async_trait]
impl AirQualityProvider for OpenWeatherProvider {
    async fn fetch_current(&self, location: GeoPoint) -> Result<Vec<RawReading>, ProviderError> {
        ensure!(
            location.is_valid(),
            ValidationSnafu {
                message: format!("coordinates out of range: {location:?}"),
            }
        );

        let query = current_query(location, &self.config.api_key);
        let readings = self.get_readings(&self.config.base_url, &query).await?;
        debug!(count = readings.len(), "fetched current readings");
        Ok(readings)
    }

    async fn fetch_history(
        &self,
        params: HistoryRequestParams,
    ) -> Result<Vec<RawReading>, ProviderError> {
        ensure!(
            params.start < params.end,
            ValidationSnafu {
                message: format!("empty range: {} .. {}", params.start, params.end),
            }
        );
        ensure!(
            params.location.is_valid(),
            ValidationSnafu {
                message: format!("coordinates out of range: {:?}", params.location),
            }
        );

        let url = self.config.history_url();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (start, end) in params.hourly_windows() {
            let query = history_query(params.location, start, end, &self.config.api_key);
            let readings = match self.get_readings(&url, &query).await {
                Ok(readings) => readings,
                // A failed window leaves a gap; the feature builder drops rows around it.
                Err(e @ (ProviderError::Api { .. } | ProviderError::Reqwest { .. })) => {
                    warn!(%start, %end, error = %e, "history window failed, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for reading in readings {
                if seen.insert(reading.timestamp) {
                    out.push(reading);
                }
            }
        }

        out.sort_by_key(|r| r.timestamp);
        debug!(count = out.len(), "fetched history readings");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let mut config = OpenWeatherConfig::new(SecretString::from("k".to_string()));
        config.base_url = "not a url".to_string();

        let err = OpenWeatherProvider::new(config).err().unwrap();
        assert!(matches!(err, ProviderInitError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn history_rejects_empty_range_without_network() {
        let provider =
            OpenWeatherProvider::new(OpenWeatherConfig::new(SecretString::from("k".to_string())))
                .unwrap();
        let now = chrono::Utc::now();
        let params = HistoryRequestParams {
            location: GeoPoint::default(),
            start: now,
            end: now,
        };

        let err = provider.fetch_history(params).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }
}
