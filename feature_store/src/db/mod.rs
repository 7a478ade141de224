//! Database utilities for connections and schema migrations.
//!
//! - [`connection::connect_sqlite`] opens a connection with WAL, foreign_keys=ON
//!   and a 5000ms busy_timeout.
//! - [`migrate::run_all`] applies the embedded migrations to a SQLite database
//!   given as a bare path or a `sqlite:` URL.
//!
//! ```no_run
//! use feature_store::db::{connection, migrate};
//!
//! let db_path = std::env::temp_dir().join("aqi_features_example.db");
//! migrate::run_all(db_path.to_str().unwrap()).expect("migrations");
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("connect");
//! ```

pub mod connection;
pub mod migrate;
