//! Hourly AQI feature store.
//!
//! Turns raw air-quality readings into lagged, calendar-encoded feature rows,
//! keeps them in SQLite keyed by timestamp, and assembles multi-step training
//! datasets from what is stored.
//!
//! - [`features`]: the feature builder.
//! - [`dedup`]: timestamp deduplication against the store.
//! - [`dataset`]: training targets and the temporal split.
//! - [`store`]: insert-if-absent persistence.
//! - [`pipeline`]: the hourly, backfill, seed and dataset jobs.
//! - [`training`]: the forecaster seam and baseline scoring.

#![warn(missing_docs)]

pub mod config;
pub mod csv_io;
pub mod dataset;
pub mod db;
pub mod dedup;
pub mod features;
pub mod models;
pub mod pipeline;
#[allow(missing_docs)]
pub mod schema;
pub mod store;
pub mod training;
pub mod tz;
