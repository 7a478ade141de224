//! Canonical in-memory representation of an hourly air-quality reading.
//!
//! [`RawReading`] is the validated shape every provider returns and every
//! downstream stage consumes. [`ReadingRecord`] is the loosely shaped form a
//! reading has before validation (an API payload entry, a CSV line, ...);
//! converting it with [`RawReading::try_from`] is the only way to obtain a
//! reading, so code past that point never re-checks for missing keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single timestamped AQI measurement with its pollutant breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Seconds since the Unix epoch (UTC). Unique key of the reading.
    pub timestamp: i64,

    /// AQI category reported by the source (OpenWeather uses 1..=5).
    pub aqi: i32,

    /// Pollutant name -> concentration (μg/m³), in source order.
    #[serde(default)]
    pub components: IndexMap<String, f64>,
}

impl RawReading {
    /// Builds a reading that only carries the fields the feature builder needs.
    ///
    /// Used when history is reconstructed from persisted feature rows, which
    /// do not keep pollutant components.
    pub fn bare(timestamp: i64, aqi: i32) -> Self {
        Self {
            timestamp,
            aqi,
            components: IndexMap::new(),
        }
    }
}

/// A reading before validation: mandatory fields may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingRecord {
    pub timestamp: Option<i64>,
    pub aqi: Option<i32>,
    pub components: IndexMap<String, f64>,
}

/// A mandatory reading field was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reading is missing mandatory field `{field}`")]
pub struct ReadingShapeError {
    pub field: &'static str,
}

impl TryFrom<ReadingRecord> for RawReading {
    type Error = ReadingShapeError;

    fn try_from(record: ReadingRecord) -> Result<Self, Self::Error> {
        let timestamp = record
            .timestamp
            .ok_or(ReadingShapeError { field: "timestamp" })?;
        let aqi = record.aqi.ok_or(ReadingShapeError { field: "aqi" })?;
        Ok(Self {
            timestamp,
            aqi,
            components: record.components,
        })
    }
}

impl From<RawReading> for ReadingRecord {
    fn from(reading: RawReading) -> Self {
        Self {
            timestamp: Some(reading.timestamp),
            aqi: Some(reading.aqi),
            components: reading.components,
        }
    }
}
