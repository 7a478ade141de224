//! Acquisition side of the AQI pipeline: the canonical reading model and the
//! providers that fetch readings from an upstream air-quality API.

pub mod models;
pub mod providers;
