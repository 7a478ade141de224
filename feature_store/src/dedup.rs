//! Timestamp-keyed deduplication of readings before feature building.

use std::collections::HashSet;

use aqi_ingestor::models::reading::RawReading;

/// Drops fresh readings that are already persisted or repeat an earlier fresh reading.
///
/// Input order is kept; the first reading for a timestamp wins.
pub fn drop_persisted(fresh: Vec<RawReading>, persisted: &HashSet<i64>) -> Vec<RawReading> {
    let mut seen = HashSet::with_capacity(fresh.len());
    fresh
        .into_iter()
        .filter(|r| !persisted.contains(&r.timestamp) && seen.insert(r.timestamp))
        .collect()
}

/// Concatenates `history` and `fresh`, keeping the first reading per timestamp,
/// sorted ascending.
pub fn merge_history(history: Vec<RawReading>, fresh: Vec<RawReading>) -> Vec<RawReading> {
    let mut seen = HashSet::with_capacity(history.len() + fresh.len());
    let mut merged: Vec<RawReading> = history
        .into_iter()
        .chain(fresh)
        .filter(|r| seen.insert(r.timestamp))
        .collect();
    merged.sort_by_key(|r| r.timestamp);
    merged
}
