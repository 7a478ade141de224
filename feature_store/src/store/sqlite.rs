use std::collections::HashSet;

use anyhow::Context;
use diesel::prelude::*;
use tracing::debug;

use crate::{
    features::FeatureRow,
    models::{FeatureRowRecord, NewFeatureRow},
    schema::{engine_kv, hourly_features},
    store::{FeatureStore, RepoResult},
};

// SQLite's default host-parameter limit is 32766; stay well below it.
const IN_CHUNK: usize = 500;

/// [`FeatureStore`] backed by the `hourly_features` table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteFeatureStore;

impl SqliteFeatureStore {
    /// Creates the store handle; connections are passed per call.
    pub fn new() -> Self {
        Self
    }
}

fn decode(records: Vec<FeatureRowRecord>) -> RepoResult<Vec<FeatureRow>> {
    records
        .into_iter()
        .map(|rec| FeatureRow::try_from(rec).context("decoding stored feature row"))
        .collect()
}

impl FeatureStore for SqliteFeatureStore {
    fn insert_if_absent(
        &self,
        conn: &mut SqliteConnection,
        rows: &[FeatureRow],
    ) -> RepoResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let written = conn.transaction::<usize, anyhow::Error, _>(|conn| {
            let mut written = 0;
            for row in rows {
                written += diesel::insert_into(hourly_features::table)
                    .values(NewFeatureRow::from(row))
                    .on_conflict(hourly_features::timestamp)
                    .do_nothing()
                    .execute(conn)?;
            }
            Ok(written)
        })?;

        debug!(offered = rows.len(), written, "inserted feature rows");
        Ok(written)
    }

    fn read_all(&self, conn: &mut SqliteConnection) -> RepoResult<Vec<FeatureRow>> {
        let records = hourly_features::table
            .order(hourly_features::timestamp.asc())
            .select(FeatureRowRecord::as_select())
            .load(conn)?;
        decode(records)
    }

    fn read_latest(&self, conn: &mut SqliteConnection, n: usize) -> RepoResult<Vec<FeatureRow>> {
        let limit = i64::try_from(n).context("row limit does not fit in i64")?;
        let mut records = hourly_features::table
            .order(hourly_features::timestamp.desc())
            .limit(limit)
            .select(FeatureRowRecord::as_select())
            .load(conn)?;
        records.reverse();
        decode(records)
    }

    fn existing_timestamps(
        &self,
        conn: &mut SqliteConnection,
        candidates: &[i64],
    ) -> RepoResult<HashSet<i64>> {
        let mut found = HashSet::new();
        for chunk in candidates.chunks(IN_CHUNK) {
            let hits: Vec<i64> = hourly_features::table
                .filter(hourly_features::timestamp.eq_any(chunk.to_vec()))
                .select(hourly_features::timestamp)
                .load(conn)?;
            found.extend(hits);
        }
        Ok(found)
    }

    fn count(&self, conn: &mut SqliteConnection) -> RepoResult<i64> {
        Ok(hourly_features::table.count().get_result(conn)?)
    }

    fn set_meta(&self, conn: &mut SqliteConnection, key: &str, value: &str) -> RepoResult<()> {
        diesel::insert_into(engine_kv::table)
            .values((engine_kv::k.eq(key), engine_kv::v.eq(value)))
            .on_conflict(engine_kv::k)
            .do_update()
            .set(engine_kv::v.eq(value))
            .execute(conn)?;
        Ok(())
    }

    fn get_meta(&self, conn: &mut SqliteConnection, key: &str) -> RepoResult<Option<String>> {
        Ok(engine_kv::table
            .filter(engine_kv::k.eq(key))
            .select(engine_kv::v)
            .first::<String>(conn)
            .optional()?)
    }
}
