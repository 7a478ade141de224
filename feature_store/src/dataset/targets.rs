use crate::{dataset::DatasetError, features::FeatureRow};

/// Steps ahead predicted by default (hours, assuming hourly cadence).
pub const DEFAULT_HORIZON: usize = 72;

/// A feature row paired with the AQI of the rows that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// Inputs at time t.
    pub row: FeatureRow,
    /// `targets[i - 1]` is the AQI `i` rows after `row`.
    pub targets: Vec<i32>,
}

impl TrainingExample {
    /// Target column names, `target_t+1` .. `target_t+horizon`.
    pub fn target_names(horizon: usize) -> Vec<String> {
        (1..=horizon).map(|i| format!("target_t+{i}")).collect()
    }
}

/// Attaches `horizon` positional successors to every row that has them.
///
/// Rows must already be in ascending timestamp order. The last `horizon` rows
/// never become examples; fewer than `horizon + 1` rows yield none.
pub fn build_training_examples(
    rows: &[FeatureRow],
    horizon: usize,
) -> Result<Vec<TrainingExample>, DatasetError> {
    if horizon == 0 {
        return Err(DatasetError::InvalidHorizon);
    }

    let emitted = rows.len().saturating_sub(horizon);
    let examples = (0..emitted)
        .map(|i| TrainingExample {
            row: rows[i].clone(),
            targets: rows[i + 1..=i + horizon].iter().map(|r| r.aqi).collect(),
        })
        .collect();

    Ok(examples)
}

#[cfg(test)]
mod tests {
    use aqi_ingestor::models::reading::RawReading;

    use super::*;
    use crate::features::build_features;

    fn rows(n: usize) -> Vec<FeatureRow> {
        let start = 1_735_689_600; // 2025-01-01T00:00:00Z
        let readings: Vec<RawReading> = (0..n + 24)
            .map(|i| RawReading::bare(start + 3600 * i as i64, (i % 5) as i32 + 1))
            .collect();
        build_features(&readings).unwrap()
    }

    #[test]
    fn hundred_rows_yield_twenty_eight_examples() {
        let rows = rows(100);
        assert_eq!(rows.len(), 100);

        let examples = build_training_examples(&rows, DEFAULT_HORIZON).unwrap();
        assert_eq!(examples.len(), 28);
        assert_eq!(examples[0].targets.len(), 72);
        assert_eq!(examples[0].targets[0], rows[1].aqi);
        assert_eq!(examples[0].targets[71], rows[72].aqi);
        assert_eq!(examples[27].row, rows[27]);
        assert_eq!(examples[27].targets[71], rows[99].aqi);
    }

    #[test]
    fn too_short_input_yields_nothing() {
        let rows = rows(72);
        assert!(build_training_examples(&rows, 72).unwrap().is_empty());
        assert!(build_training_examples(&[], 72).unwrap().is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let rows = rows(10);
        let examples = build_training_examples(&rows, 3).unwrap();
        assert_eq!(examples.len(), 7);
        assert!(examples.windows(2).all(|w| w[0].row.timestamp < w[1].row.timestamp));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        assert_eq!(build_training_examples(&rows(5), 0), Err(DatasetError::InvalidHorizon));
    }

    #[test]
    fn target_names_are_one_based() {
        let names = TrainingExample::target_names(3);
        assert_eq!(names, ["target_t+1", "target_t+2", "target_t+3"]);
    }
}
