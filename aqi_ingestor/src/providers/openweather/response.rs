//! Wire shape of the OpenWeatherMap Air Pollution API.
//!
//! Every field is optional on purpose: a missing `dt` or `main.aqi` must
//! surface as a [`ReadingShapeError`] for that entry, not as an opaque JSON
//! decoding failure for the whole body.

use indexmap::IndexMap;
use serde::Deserialize;
use snafu::ResultExt;

use crate::{
    models::reading::{RawReading, ReadingRecord},
    providers::{MalformedReadingSnafu, ProviderError},
};

#[derive(Deserialize, Debug, Default)]
pub struct OwmMain {
    pub aqi: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct OwmEntry {
    pub dt: Option<i64>,
    pub main: Option<OwmMain>,
    #[serde(default)]
    pub components: IndexMap<String, f64>,
}

#[derive(Deserialize, Debug)]
pub struct OwmResponse {
    #[serde(default)]
    pub list: Vec<OwmEntry>,
}

impl From<OwmEntry> for ReadingRecord {
    fn from(entry: OwmEntry) -> Self {
        ReadingRecord {
            timestamp: entry.dt,
            aqi: entry.main.and_then(|m| m.aqi),
            components: entry.components,
        }
    }
}

impl OwmResponse {
    /// Validates every entry; one malformed entry rejects the response.
    pub fn into_readings(self) -> Result<Vec<RawReading>, ProviderError> {
        self.list
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                RawReading::try_from(ReadingRecord::from(entry))
                    .context(MalformedReadingSnafu { index })
            })
            .collect()
    }
}
