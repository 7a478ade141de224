use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::GeoPoint;

/// Parameters for a historical readings request.
///
/// The range is half-open: providers return readings at or after `start` and
/// strictly before `end`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryRequestParams {
    /// Site to query.
    pub location: GeoPoint,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    pub end: DateTime<Utc>,
}

impl HistoryRequestParams {
    /// Splits the range into consecutive one-hour windows.
    ///
    /// The last window is clipped to `end`. An empty or inverted range yields
    /// no windows.
    pub fn hourly_windows(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let mut out = Vec::new();
        let mut current = self.start;
        while current < self.end {
            let next = (current + Duration::hours(1)).min(self.end);
            out.push((current, next));
            current = next;
        }
        out
    }
}
