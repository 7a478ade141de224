//! Backfill boundary parsing.
//!
//! Boundaries reach the pipeline from the CLI either as RFC-3339 instants
//! ("2025-07-01T00:00:00+05:00") or as naive wall-clock times in an IANA zone
//! ("2025-07-01 00:00", "2025-07-01"). Naive times are resolved through a
//! [`DstPolicy`]; the default is strict, so a wall time skipped or repeated by
//! a DST transition is an error rather than a guess.
//!
//! Everything downstream works in UTC unix seconds.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone used for naive boundaries when none is given.
pub const DEFAULT_TZ: Tz = chrono_tz::Asia::Karachi;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// How to resolve a local wall time that a DST transition made ambiguous or skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Error on ambiguous (fall-back) and nonexistent (spring-forward) times.
    #[default]
    Strict,
    /// Pick the earlier of two instants on fall-back.
    PreferEarliest,
    /// Pick the later of two instants on fall-back.
    PreferLatest,
}

/// RFC-3339 with offset -> UTC.
pub fn parse_ts_to_utc(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(s).with_context(|| format!("bad rfc3339: {s}"))?;
    Ok(dt.with_timezone(&Utc))
}

/// Parses an IANA zone name such as "Asia/Karachi".
pub fn parse_tz(name: &str) -> anyhow::Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("bad tz {name}: {e}"))
}

/// Converts a naive local time in `tz` to UTC under `policy`.
///
/// Nonexistent local times are always an error.
pub fn from_local_naive_with_policy(
    naive: NaiveDateTime,
    tz: Tz,
    policy: DstPolicy,
) -> anyhow::Result<DateTime<Utc>> {
    use chrono::offset::LocalResult::*;
    match tz.from_local_datetime(&naive) {
        Single(dt) => Ok(dt.with_timezone(&Utc)),
        Ambiguous(a, b) => match policy {
            DstPolicy::PreferEarliest => Ok(a.with_timezone(&Utc)),
            DstPolicy::PreferLatest => Ok(b.with_timezone(&Utc)),
            DstPolicy::Strict => Err(anyhow::anyhow!("ambiguous local time {naive} in {tz}")),
        },
        None => Err(anyhow::anyhow!("nonexistent local time {naive} in {tz}")),
    }
}

/// Parses a backfill boundary.
///
/// RFC-3339 input carries its own offset and ignores `tz`. Otherwise the
/// string is a naive local time (`YYYY-MM-DD[ T]HH:MM[:SS]`) or a bare date,
/// meaning local midnight, resolved in `tz` under `policy`.
pub fn parse_boundary(s: &str, tz: Tz, policy: DstPolicy) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = parse_ts_to_utc(s) {
        return Ok(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .with_context(|| format!("unrecognized timestamp: {s}"))?;

    from_local_naive_with_policy(naive, tz, policy)
}

/// Format a UTC datetime as an RFC-3339 string with millisecond precision.
pub fn to_rfc3339_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
