use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use nonzero_ext::nonzero;
use secrecy::{ExposeSecret, SecretString};

use crate::models::location::GeoPoint;

/// Public endpoint of the Air Pollution API (current conditions).
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/air_pollution";

/// The free tier tolerates roughly one history call per second.
pub fn default_requests_per_second() -> NonZeroU32 {
    nonzero!(1u32)
}

/// Connection settings for [`OpenWeatherProvider`](super::OpenWeatherProvider).
#[derive(Debug)]
pub struct OpenWeatherConfig {
    pub api_key: SecretString,
    /// Endpoint for current readings; history lives under `{base_url}/history`.
    pub base_url: String,
    pub requests_per_second: NonZeroU32,
}

impl OpenWeatherConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_second: default_requests_per_second(),
        }
    }

    pub(crate) fn history_url(&self) -> String {
        format!("{}/history", self.base_url.trim_end_matches('/'))
    }
}

pub(crate) fn current_query(location: GeoPoint, api_key: &SecretString) -> Vec<(String, String)> {
    vec![
        ("lat".to_string(), location.lat.to_string()),
        ("lon".to_string(), location.lon.to_string()),
        ("appid".to_string(), api_key.expose_secret().to_string()),
    ]
}

pub(crate) fn history_query(
    location: GeoPoint,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    api_key: &SecretString,
) -> Vec<(String, String)> {
    let mut query = current_query(location, api_key);
    query.push(("start".to_string(), start.timestamp().to_string()));
    query.push(("end".to_string(), end.timestamp().to_string()));
    query
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn history_url_appends_segment_once() {
        let mut cfg = OpenWeatherConfig::new(SecretString::from("k".to_string()));
        assert_eq!(
            cfg.history_url(),
            "https://api.openweathermap.org/data/2.5/air_pollution/history"
        );
        cfg.base_url = "http://localhost:8080/air_pollution/".to_string();
        assert_eq!(cfg.history_url(), "http://localhost:8080/air_pollution/history");
    }

    #[test]
    fn history_query_uses_unix_seconds() {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 1, 1, 0, 0).unwrap();
        let key = SecretString::from("k".to_string());
        let query = history_query(GeoPoint::new(30.5, 73.25), start, end, &key);

        assert!(query.contains(&("lat".to_string(), "30.5".to_string())));
        assert!(query.contains(&("lon".to_string(), "73.25".to_string())));
        assert!(query.contains(&("start".to_string(), "1751328000".to_string())));
        assert!(query.contains(&("end".to_string(), "1751331600".to_string())));
        assert!(query.contains(&("appid".to_string(), "k".to_string())));
    }
}
