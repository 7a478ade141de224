//! Embedded schema migrations.

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Embedded Diesel migrations bundled with this crate.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Strips an optional `sqlite://` or `sqlite:` prefix, rejecting other schemes.
pub fn sqlite_path(database_url: &str) -> anyhow::Result<&str> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        anyhow::bail!("Unsupported DATABASE_URL (only SQLite is supported): {database_url}");
    }
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    if path.is_empty() {
        anyhow::bail!("DATABASE_URL has no SQLite path: {database_url}");
    }
    Ok(path)
}

/// Runs pending migrations on the SQLite database at `path` (no URL prefix).
pub fn run_sqlite(path: &str) -> anyhow::Result<()> {
    let mut conn = SqliteConnection::establish(path)?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| anyhow!(e))?;
    info!(path, applied = applied.len(), "migrations up to date");

    Ok(())
}

/// Runs pending migrations for a database URL or bare SQLite path.
pub fn run_all(database_url: &str) -> anyhow::Result<()> {
    run_sqlite(sqlite_path(database_url)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn migrations_apply_on_temp_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path().to_string_lossy().to_string();

        run_sqlite(&path).expect("migration run");

        let mut conn = SqliteConnection::establish(&path).unwrap();
        conn.batch_execute("INSERT INTO engine_kv (k,v) VALUES ('hello', 'world')").unwrap();
        conn.batch_execute("SELECT COUNT(*) FROM hourly_features").unwrap();
    }

    #[test]
    fn url_prefixes() {
        assert_eq!(sqlite_path("sqlite:///tmp/a.db").unwrap(), "/tmp/a.db");
        assert_eq!(sqlite_path("sqlite:a.db").unwrap(), "a.db");
        assert_eq!(sqlite_path("data/aqi.db").unwrap(), "data/aqi.db");
        assert!(sqlite_path("postgres://u@h/db").is_err());
        assert!(sqlite_path("sqlite:").is_err());
    }

    #[test]
    fn run_all_is_idempotent() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let url = format!("sqlite://{}", temp.path().display());
        run_all(&url).unwrap();
        run_all(&url).unwrap();
    }
}
