//! CSV import/export: raw reading archives and the training design matrix.
//!
//! Reading archives have a `timestamp` and an `aqi` column followed by one
//! column per pollutant. Empty cells read as absent, so a row missing its
//! timestamp or AQI survives parsing and is rejected later by the feature
//! builder together with the rest of its batch.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, bail};
use aqi_ingestor::models::reading::{RawReading, ReadingRecord};
use indexmap::{IndexMap, IndexSet};

use crate::{
    dataset::TrainingExample,
    features::FEATURE_NAMES,
};

const TIMESTAMP_COL: &str = "timestamp";
const AQI_COL: &str = "aqi";

/// Writes readings with the union of their pollutant columns, in first-seen order.
pub fn write_readings<W: Write>(out: W, readings: &[RawReading]) -> anyhow::Result<()> {
    let columns: IndexSet<&str> = readings
        .iter()
        .flat_map(|r| r.components.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_writer(out);
    let mut header = vec![TIMESTAMP_COL, AQI_COL];
    header.extend(columns.iter().copied());
    wtr.write_record(&header)?;

    for r in readings {
        let mut record = vec![r.timestamp.to_string(), r.aqi.to_string()];
        record.extend(
            columns
                .iter()
                .map(|c| r.components.get(*c).map(f64::to_string).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_readings`] into a new file at `path`.
pub fn write_readings_path(path: &Path, readings: &[RawReading]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating archive {}", path.display()))?;
    write_readings(file, readings)
}

fn parse_cell<T: std::str::FromStr>(cell: &str, column: &str, line: u64) -> anyhow::Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<T>()
        .map(Some)
        .with_context(|| format!("line {line}: bad value {cell:?} in column `{column}`"))
}

/// Reads reading records; absent mandatory fields are kept as `None`.
///
/// Fails when the header lacks `timestamp` or `aqi`, or a cell is not a number.
pub fn read_records<R: Read>(input: R) -> anyhow::Result<Vec<ReadingRecord>> {
    let mut rdr = csv::Reader::from_reader(input);
    let headers = rdr.headers()?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let Some(ts_idx) = find(TIMESTAMP_COL) else {
        bail!("CSV header has no `{TIMESTAMP_COL}` column");
    };
    let Some(aqi_idx) = find(AQI_COL) else {
        bail!("CSV header has no `{AQI_COL}` column");
    };

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());

        let mut components = IndexMap::new();
        for (i, (name, cell)) in headers.iter().zip(row.iter()).enumerate() {
            if i == ts_idx || i == aqi_idx {
                continue;
            }
            if let Some(v) = parse_cell::<f64>(cell, name, line)? {
                components.insert(name.trim().to_string(), v);
            }
        }

        records.push(ReadingRecord {
            timestamp: parse_cell(row.get(ts_idx).unwrap_or(""), TIMESTAMP_COL, line)?,
            aqi: parse_cell(row.get(aqi_idx).unwrap_or(""), AQI_COL, line)?,
            components,
        });
    }
    Ok(records)
}

/// [`read_records`] from the file at `path`.
pub fn read_records_path(path: &Path) -> anyhow::Result<Vec<ReadingRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_records(file)
}

/// Header of the design-matrix export: `timestamp`, the feature columns, then targets.
pub fn dataset_header(horizon: usize) -> Vec<String> {
    std::iter::once(TIMESTAMP_COL.to_string())
        .chain(FEATURE_NAMES.iter().map(|s| s.to_string()))
        .chain(TrainingExample::target_names(horizon))
        .collect()
}

/// Writes one line per example: timestamp, feature vector, targets.
pub fn write_dataset<W: Write>(
    out: W,
    examples: &[TrainingExample],
    horizon: usize,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(dataset_header(horizon))?;

    for ex in examples {
        if ex.targets.len() != horizon {
            bail!(
                "example {} has {} targets, expected {horizon}",
                ex.row.timestamp,
                ex.targets.len()
            );
        }
        let record = std::iter::once(ex.row.timestamp.to_string())
            .chain(ex.row.feature_vector().into_iter().map(|v| v.to_string()))
            .chain(ex.targets.iter().map(i32::to_string));
        wtr.write_record(record)?;
    }
    wtr.flush()?;
    Ok(())
}
