//! SQLite connection helpers.

use anyhow::Context;
use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

use crate::db::migrate::sqlite_path;

/// Open a SQLite connection and apply connection-wide PRAGMAs.
///
/// `database_url` may be a bare path or carry a `sqlite:` / `sqlite://` prefix.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let path = sqlite_path(database_url)?;
    let mut conn = SqliteConnection::establish(path)
        .with_context(|| format!("opening sqlite database at {path}"))?;

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    Ok(conn)
}
