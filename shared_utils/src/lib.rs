//! Small helpers shared by the ingestion and feature-store crates.

pub mod env;
