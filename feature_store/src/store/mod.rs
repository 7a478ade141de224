//! Feature store: insert-if-absent persistence of [`FeatureRow`]s keyed by timestamp.

pub mod sqlite;

use std::collections::HashSet;

use crate::features::FeatureRow;

pub use sqlite::SqliteFeatureStore;

/// Result type used throughout the store for fallible operations.
pub type RepoResult<T> = anyhow::Result<T>;

/// Portable surface, SQLite implementation lives in `sqlite.rs`.
pub trait FeatureStore {
    /// Inserts rows whose timestamp is not yet stored; existing rows are never
    /// updated. Returns how many rows were written.
    fn insert_if_absent(
        &self,
        conn: &mut diesel::SqliteConnection,
        rows: &[FeatureRow],
    ) -> RepoResult<usize>;

    /// Every stored row, ascending by timestamp.
    fn read_all(&self, conn: &mut diesel::SqliteConnection) -> RepoResult<Vec<FeatureRow>>;

    /// The `n` most recent rows, returned ascending by timestamp.
    fn read_latest(
        &self,
        conn: &mut diesel::SqliteConnection,
        n: usize,
    ) -> RepoResult<Vec<FeatureRow>>;

    /// The subset of `candidates` already present in the store.
    fn existing_timestamps(
        &self,
        conn: &mut diesel::SqliteConnection,
        candidates: &[i64],
    ) -> RepoResult<HashSet<i64>>;

    /// Number of stored rows.
    fn count(&self, conn: &mut diesel::SqliteConnection) -> RepoResult<i64>;

    /// Stores a bookkeeping value, replacing any previous value for `key`.
    fn set_meta(&self, conn: &mut diesel::SqliteConnection, key: &str, value: &str)
    -> RepoResult<()>;

    /// Reads a bookkeeping value.
    fn get_meta(&self, conn: &mut diesel::SqliteConnection, key: &str)
    -> RepoResult<Option<String>>;
}
