//! Feature construction from hourly readings.
//!
//! [`build_features`] turns a batch of [`RawReading`]s into [`FeatureRow`]s:
//! calendar encodings of the timestamp, the AQI at fixed positional lags, and
//! the trailing 24-row mean. Positions, not wall-clock offsets, define "k
//! rows earlier", so the input is sorted by timestamp first.
//!
//! The first [`MIN_HISTORY`] readings of any batch never produce a row: they
//! only serve as history for later readings. Insufficient history is silent
//! omission, not an error. Malformed input (missing mandatory fields,
//! duplicate or unrepresentable timestamps) fails the whole batch.

pub mod calendar;
mod rolling;

use aqi_ingestor::models::reading::{RawReading, ReadingRecord, ReadingShapeError};
use thiserror::Error;

use crate::features::calendar::{CalendarParts, Season, TimeOfDay};

/// Positional lags, in rows, of the `aqi_lag_k` features.
pub const LAGS: [usize; 6] = [1, 2, 3, 6, 12, 24];

/// Width, in rows, of the trailing AQI average (current row included).
pub const ROLLING_WINDOW: usize = 24;

/// Leading rows of a batch that cannot yield a feature row.
pub const MIN_HISTORY: usize = {
    let max_lag = LAGS[LAGS.len() - 1];
    if max_lag > ROLLING_WINDOW - 1 {
        max_lag
    } else {
        ROLLING_WINDOW - 1
    }
};

/// Number of model inputs in [`FeatureRow::feature_vector`].
pub const FEATURE_COUNT: usize = 13;

/// Column names of [`FeatureRow::feature_vector`], in order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "seasons",
    "hour",
    "month",
    "year",
    "day_of_week",
    "timeof_day",
    "aqi_lag_1",
    "aqi_lag_2",
    "aqi_lag_3",
    "aqi_lag_6",
    "aqi_lag_12",
    "aqi_lag_24",
    "aqi_24hr_avg",
];

/// Errors that abort a feature-building batch.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    /// A record lacked `timestamp` or `aqi`.
    #[error("malformed reading at index {index}: {source}")]
    MalformedReading {
        /// Position of the record in the input batch.
        index: usize,
        /// Which field was missing.
        source: ReadingShapeError,
    },

    /// Two readings share a timestamp; deduplicate before building features.
    #[error("duplicate timestamp {timestamp} in feature builder input")]
    DuplicateTimestamp {
        /// The repeated timestamp.
        timestamp: i64,
    },

    /// The timestamp cannot be placed on the calendar.
    #[error("timestamp {timestamp} is outside the supported calendar range")]
    TimestampOutOfRange {
        /// The offending timestamp.
        timestamp: i64,
    },
}

/// AQI values at the positional offsets in [`LAGS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AqiLags {
    /// AQI one row earlier.
    pub lag_1: i32,
    /// AQI two rows earlier.
    pub lag_2: i32,
    /// AQI three rows earlier.
    pub lag_3: i32,
    /// AQI six rows earlier.
    pub lag_6: i32,
    /// AQI twelve rows earlier.
    pub lag_12: i32,
    /// AQI twenty-four rows earlier.
    pub lag_24: i32,
}

impl AqiLags {
    /// Lags for position `i` of `aqi`; `None` while any lag reaches before the start.
    fn at(aqi: &[i32], i: usize) -> Option<Self> {
        let back = |k: usize| i.checked_sub(k).and_then(|j| aqi.get(j).copied());
        Some(Self {
            lag_1: back(1)?,
            lag_2: back(2)?,
            lag_3: back(3)?,
            lag_6: back(6)?,
            lag_12: back(12)?,
            lag_24: back(24)?,
        })
    }

    /// The lag for offset `k`, if `k` is one of [`LAGS`].
    pub fn get(&self, k: usize) -> Option<i32> {
        match k {
            1 => Some(self.lag_1),
            2 => Some(self.lag_2),
            3 => Some(self.lag_3),
            6 => Some(self.lag_6),
            12 => Some(self.lag_12),
            24 => Some(self.lag_24),
            _ => None,
        }
    }
}

/// Model inputs and label derived for one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Unix seconds (UTC) of the source reading; unique key.
    pub timestamp: i64,
    /// Season of the reading's month.
    pub season: Season,
    /// Hour of day, 0..=23.
    pub hour: u32,
    /// Month, 1..=12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    /// Time-of-day bucket of `hour`.
    pub time_of_day: TimeOfDay,
    /// AQI at each positional lag.
    pub lags: AqiLags,
    /// Mean AQI of this row and the 23 before it, rounded to 2 decimals.
    pub aqi_24hr_avg: f64,
    /// AQI of this reading (the label).
    pub aqi: i32,
}

impl FeatureRow {
    /// Model inputs in [`FEATURE_NAMES`] order (everything except `timestamp` and `aqi`).
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.season.code() as f64,
            self.hour as f64,
            self.month as f64,
            self.year as f64,
            self.day_of_week as f64,
            self.time_of_day.code() as f64,
            self.lags.lag_1 as f64,
            self.lags.lag_2 as f64,
            self.lags.lag_3 as f64,
            self.lags.lag_6 as f64,
            self.lags.lag_12 as f64,
            self.lags.lag_24 as f64,
            self.aqi_24hr_avg,
        ]
    }
}

/// Builds feature rows from readings, in ascending timestamp order.
///
/// The input need not be sorted but must not repeat timestamps.
pub fn build_features(readings: &[RawReading]) -> Result<Vec<FeatureRow>, FeatureError> {
    let mut series: Vec<(i64, i32)> = readings.iter().map(|r| (r.timestamp, r.aqi)).collect();
    series.sort_by_key(|&(ts, _)| ts);

    if let Some(pair) = series.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(FeatureError::DuplicateTimestamp { timestamp: pair[0].0 });
    }

    let calendar = series
        .iter()
        .map(|&(timestamp, _)| {
            CalendarParts::from_unix(timestamp).ok_or(FeatureError::TimestampOutOfRange { timestamp })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let aqi: Vec<i32> = series.iter().map(|&(_, a)| a).collect();

    let mut rows = Vec::with_capacity(series.len().saturating_sub(MIN_HISTORY));
    for (i, (&(timestamp, current), parts)) in series.iter().zip(&calendar).enumerate() {
        let Some(lags) = AqiLags::at(&aqi, i) else {
            continue;
        };
        let Some(mean) = rolling::trailing_mean(&aqi, i, ROLLING_WINDOW) else {
            continue;
        };

        rows.push(FeatureRow {
            timestamp,
            season: parts.season,
            hour: parts.hour,
            month: parts.month,
            year: parts.year,
            day_of_week: parts.day_of_week,
            time_of_day: parts.time_of_day,
            lags,
            aqi_24hr_avg: rolling::round2(mean),
            aqi: current,
        });
    }

    Ok(rows)
}

/// Validates loosely shaped records, then builds features.
///
/// A single record without `timestamp` or `aqi` fails the batch; no rows are
/// produced for it.
pub fn build_features_from_records(
    records: Vec<ReadingRecord>,
) -> Result<Vec<FeatureRow>, FeatureError> {
    let readings = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            RawReading::try_from(record)
                .map_err(|source| FeatureError::MalformedReading { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    build_features(&readings)
}
