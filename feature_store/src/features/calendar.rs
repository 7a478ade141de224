//! Calendar decomposition of reading timestamps.
//!
//! All timestamps are Unix seconds interpreted in UTC. Season boundaries use
//! the Northern-hemisphere meteorological convention (Dec/Jan/Feb = Winter);
//! time-of-day buckets are half-open hour ranges:
//!
//! | code | bucket    | hours        |
//! |------|-----------|--------------|
//! | 0    | Morning   | 05..12       |
//! | 1    | Afternoon | 12..17       |
//! | 2    | Evening   | 17..21       |
//! | 3    | Night     | 21..24, 0..5 |

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Meteorological season, encoded as the integer the model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// March to May.
    Spring,
    /// June to August.
    Summer,
    /// September to November.
    Autumn,
    /// December to February.
    Winter,
}

impl Season {
    /// Season for a calendar month (1 = January). Out-of-range months map to
    /// Autumn, matching the catch-all branch of the month table.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// Integer encoding: Spring 0, Summer 1, Autumn 2, Winter 3.
    pub fn code(self) -> u8 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    /// Inverse of [`Season::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Season::Spring),
            1 => Some(Season::Summer),
            2 => Some(Season::Autumn),
            3 => Some(Season::Winter),
            _ => None,
        }
    }
}

/// Part of the day a reading falls into, encoded as the integer the model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// 05:00 to 11:59.
    Morning,
    /// 12:00 to 16:59.
    Afternoon,
    /// 17:00 to 20:59.
    Evening,
    /// 21:00 to 04:59.
    Night,
}

impl TimeOfDay {
    /// Bucket for an hour of the day (0..=23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// Integer encoding: Morning 0, Afternoon 1, Evening 2, Night 3.
    pub fn code(self) -> u8 {
        match self {
            TimeOfDay::Morning => 0,
            TimeOfDay::Afternoon => 1,
            TimeOfDay::Evening => 2,
            TimeOfDay::Night => 3,
        }
    }

    /// Inverse of [`TimeOfDay::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TimeOfDay::Morning),
            1 => Some(TimeOfDay::Afternoon),
            2 => Some(TimeOfDay::Evening),
            3 => Some(TimeOfDay::Night),
            _ => None,
        }
    }
}

/// Calendar fields derived from one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarParts {
    /// Hour of day, 0..=23.
    pub hour: u32,
    /// Month, 1..=12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    /// Season of `month`.
    pub season: Season,
    /// Bucket of `hour`.
    pub time_of_day: TimeOfDay,
}

impl CalendarParts {
    /// Decomposes a Unix timestamp (seconds, UTC).
    ///
    /// Returns `None` when the timestamp is outside chrono's representable range.
    pub fn from_unix(timestamp: i64) -> Option<Self> {
        let dt = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        let hour = dt.hour();
        let month = dt.month();
        Some(Self {
            hour,
            month,
            year: dt.year(),
            day_of_week: dt.weekday().num_days_from_monday(),
            season: Season::from_month(month),
            time_of_day: TimeOfDay::from_hour(hour),
        })
    }
}
