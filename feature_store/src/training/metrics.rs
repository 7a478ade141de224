//! Regression error metrics over multi-output predictions.

use crate::training::TrainingError;

/// Aggregate and per-step errors of a prediction matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    /// Mean absolute error over all cells.
    pub mae: f64,
    /// Root mean squared error over all cells.
    pub rmse: f64,
    /// Mean absolute percentage error (in percent) over cells with a non-zero truth.
    pub mape: Option<f64>,
    /// MAE per column.
    pub mae_by_horizon: Vec<f64>,
}

/// Scores `predicted` against `truth`; both are `examples x horizon`.
pub fn score(truth: &[Vec<f64>], predicted: &[Vec<f64>]) -> Result<Scores, TrainingError> {
    if truth.is_empty() {
        return Err(TrainingError::EmptyTestSet);
    }
    if truth.len() != predicted.len() {
        return Err(TrainingError::Shape(format!(
            "{} truth rows, {} prediction rows",
            truth.len(),
            predicted.len()
        )));
    }

    let horizon = truth[0].len();
    let mut abs_by_col = vec![0.0; horizon];
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_n = 0usize;

    for (t_row, p_row) in truth.iter().zip(predicted) {
        if t_row.len() != horizon || p_row.len() != horizon {
            return Err(TrainingError::Shape(format!(
                "row widths {} / {}, expected {horizon}",
                t_row.len(),
                p_row.len()
            )));
        }
        for (h, (&t, &p)) in t_row.iter().zip(p_row).enumerate() {
            let err = (t - p).abs();
            abs_by_col[h] += err;
            abs_sum += err;
            sq_sum += err * err;
            // AQI categories start at 1; a zero truth has no defined percentage
            if t != 0.0 {
                pct_sum += err / t.abs();
                pct_n += 1;
            }
        }
    }

    let rows = truth.len() as f64;
    let cells = rows * horizon as f64;
    Ok(Scores {
        mae: abs_sum / cells,
        rmse: (sq_sum / cells).sqrt(),
        mape: (pct_n > 0).then(|| pct_sum / pct_n as f64 * 100.0),
        mae_by_horizon: abs_by_col.into_iter().map(|s| s / rows).collect(),
    })
}
