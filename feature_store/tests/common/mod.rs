#![allow(dead_code)]

use aqi_ingestor::models::reading::RawReading;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use feature_store::db::{connection, migrate};
use std::path::PathBuf;
use tempfile::TempDir;

/// 2025-07-01T00:00:00Z
pub const T0: i64 = 1_751_328_000;
pub const HOUR: i64 = 3600;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_all(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

/// Hourly readings starting at `start` with the given AQI values.
pub fn hourly(start: i64, aqi: &[i32]) -> Vec<RawReading> {
    aqi.iter()
        .enumerate()
        .map(|(i, &a)| RawReading::bare(start + HOUR * i as i64, a))
        .collect()
}

/// A repeating 1..=5 AQI pattern of length `n`.
pub fn cycle(n: usize) -> Vec<i32> {
    (0..n).map(|i| (i % 5) as i32 + 1).collect()
}
