//! Diesel models mapping to the database schema.
//!
//! [`FeatureRowRecord`] mirrors [`crate::schema::hourly_features`] for reads;
//! [`NewFeatureRow`] is its insertable form without the DB-managed
//! `inserted_at` column. Both convert to and from [`FeatureRow`], and the
//! read direction re-validates the encoded season and time-of-day codes.

use diesel::prelude::*;
use thiserror::Error;

use crate::{
    features::{
        AqiLags, FeatureRow,
        calendar::{Season, TimeOfDay},
    },
    schema::*,
};

/// A stored row that does not decode into a valid [`FeatureRow`].
#[derive(Debug, Error, PartialEq)]
pub enum RowDecodeError {
    /// A column holds a value outside its domain.
    #[error("row {timestamp}: column `{column}` holds out-of-range value {value}")]
    OutOfRange {
        /// Key of the offending row.
        timestamp: i64,
        /// Column name.
        column: &'static str,
        /// The stored value.
        value: i32,
    },
}

/// A row in [`crate::schema::hourly_features`].
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = hourly_features, check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeatureRowRecord {
    /// Unix seconds (UTC); primary key.
    pub timestamp: i64,
    /// Season code, 0..=3.
    pub seasons: i32,
    /// Hour of day.
    pub hour: i32,
    /// Month, 1..=12.
    pub month: i32,
    /// Calendar year.
    pub year: i32,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: i32,
    /// Time-of-day code, 0..=3.
    pub timeof_day: i32,
    /// AQI one row earlier.
    pub aqi_lag_1: i32,
    /// AQI two rows earlier.
    pub aqi_lag_2: i32,
    /// AQI three rows earlier.
    pub aqi_lag_3: i32,
    /// AQI six rows earlier.
    pub aqi_lag_6: i32,
    /// AQI twelve rows earlier.
    pub aqi_lag_12: i32,
    /// AQI twenty-four rows earlier.
    pub aqi_lag_24: i32,
    /// Trailing 24-row mean, two decimals.
    pub aqi_24hr_avg: f64,
    /// Label.
    pub aqi: i32,
    /// Insert time in RFC3339 UTC, set by the database.
    pub inserted_at: String,
}

/// Insertable form of [`FeatureRowRecord`].
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = hourly_features)]
pub struct NewFeatureRow {
    /// Unix seconds (UTC); primary key.
    pub timestamp: i64,
    /// Season code.
    pub seasons: i32,
    /// Hour of day.
    pub hour: i32,
    /// Month.
    pub month: i32,
    /// Year.
    pub year: i32,
    /// Day of week.
    pub day_of_week: i32,
    /// Time-of-day code.
    pub timeof_day: i32,
    /// Lag 1.
    pub aqi_lag_1: i32,
    /// Lag 2.
    pub aqi_lag_2: i32,
    /// Lag 3.
    pub aqi_lag_3: i32,
    /// Lag 6.
    pub aqi_lag_6: i32,
    /// Lag 12.
    pub aqi_lag_12: i32,
    /// Lag 24.
    pub aqi_lag_24: i32,
    /// Rolling mean.
    pub aqi_24hr_avg: f64,
    /// Label.
    pub aqi: i32,
}

impl From<&FeatureRow> for NewFeatureRow {
    fn from(row: &FeatureRow) -> Self {
        Self {
            timestamp: row.timestamp,
            seasons: row.season.code() as i32,
            hour: row.hour as i32,
            month: row.month as i32,
            year: row.year,
            day_of_week: row.day_of_week as i32,
            timeof_day: row.time_of_day.code() as i32,
            aqi_lag_1: row.lags.lag_1,
            aqi_lag_2: row.lags.lag_2,
            aqi_lag_3: row.lags.lag_3,
            aqi_lag_6: row.lags.lag_6,
            aqi_lag_12: row.lags.lag_12,
            aqi_lag_24: row.lags.lag_24,
            aqi_24hr_avg: row.aqi_24hr_avg,
            aqi: row.aqi,
        }
    }
}

impl TryFrom<FeatureRowRecord> for FeatureRow {
    type Error = RowDecodeError;

    fn try_from(rec: FeatureRowRecord) -> Result<Self, Self::Error> {
        let ts = rec.timestamp;
        let out_of_range = |column, value| RowDecodeError::OutOfRange {
            timestamp: ts,
            column,
            value,
        };
        let bounded = |column, value: i32, max: i32| {
            if (0..=max).contains(&value) {
                Ok(value as u32)
            } else {
                Err(out_of_range(column, value))
            }
        };

        let season = u8::try_from(rec.seasons)
            .ok()
            .and_then(Season::from_code)
            .ok_or_else(|| out_of_range("seasons", rec.seasons))?;
        let time_of_day = u8::try_from(rec.timeof_day)
            .ok()
            .and_then(TimeOfDay::from_code)
            .ok_or_else(|| out_of_range("timeof_day", rec.timeof_day))?;
        let hour = bounded("hour", rec.hour, 23)?;
        let day_of_week = bounded("day_of_week", rec.day_of_week, 6)?;
        let month = bounded("month", rec.month, 12)?;
        if month == 0 {
            return Err(out_of_range("month", rec.month));
        }

        Ok(FeatureRow {
            timestamp: ts,
            season,
            hour,
            month,
            year: rec.year,
            day_of_week,
            time_of_day,
            lags: AqiLags {
                lag_1: rec.aqi_lag_1,
                lag_2: rec.aqi_lag_2,
                lag_3: rec.aqi_lag_3,
                lag_6: rec.aqi_lag_6,
                lag_12: rec.aqi_lag_12,
                lag_24: rec.aqi_lag_24,
            },
            aqi_24hr_avg: rec.aqi_24hr_avg,
            aqi: rec.aqi,
        })
    }
}

#[cfg(test)]
mod tests {
    use aqi_ingestor::models::reading::RawReading;

    use super::*;
    use crate::features::build_features;

    fn sample_row() -> FeatureRow {
        let readings: Vec<RawReading> = (0..25)
            .map(|i| RawReading::bare(1_751_328_000 + 3600 * i, (i % 4) as i32 + 1))
            .collect();
        build_features(&readings).unwrap().remove(0)
    }

    fn record_of(row: &FeatureRow) -> FeatureRowRecord {
        let n = NewFeatureRow::from(row);
        FeatureRowRecord {
            timestamp: n.timestamp,
            seasons: n.seasons,
            hour: n.hour,
            month: n.month,
            year: n.year,
            day_of_week: n.day_of_week,
            timeof_day: n.timeof_day,
            aqi_lag_1: n.aqi_lag_1,
            aqi_lag_2: n.aqi_lag_2,
            aqi_lag_3: n.aqi_lag_3,
            aqi_lag_6: n.aqi_lag_6,
            aqi_lag_12: n.aqi_lag_12,
            aqi_lag_24: n.aqi_lag_24,
            aqi_24hr_avg: n.aqi_24hr_avg,
            aqi: n.aqi,
            inserted_at: "2025-07-02T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn stored_row_decodes_back() {
        let row = sample_row();
        assert_eq!(FeatureRow::try_from(record_of(&row)).unwrap(), row);
    }

    #[test]
    fn bad_codes_are_rejected() {
        let row = sample_row();

        let mut rec = record_of(&row);
        rec.seasons = 7;
        assert_eq!(
            FeatureRow::try_from(rec).unwrap_err(),
            RowDecodeError::OutOfRange {
                timestamp: row.timestamp,
                column: "seasons",
                value: 7
            }
        );

        let mut rec = record_of(&row);
        rec.timeof_day = -1;
        assert!(FeatureRow::try_from(rec).is_err());

        let mut rec = record_of(&row);
        rec.month = 0;
        assert!(FeatureRow::try_from(rec).is_err());
    }
}
