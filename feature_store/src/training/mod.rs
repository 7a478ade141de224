//! Model fitting seam and baseline evaluation.
//!
//! A [`Forecaster`] is fitted on the training prefix of a temporal split and
//! scored on the test suffix. Choosing between models is left to the caller;
//! [`evaluate`] scores exactly one forecaster.

pub mod baseline;
pub mod metrics;

use serde::Serialize;
use thiserror::Error;

use crate::{
    dataset::{TemporalSplit, TrainingExample},
    features::FEATURE_COUNT,
};

pub use baseline::{HorizonMeanForecaster, RollingMeanForecaster};

/// One model input row, in [`crate::features::FEATURE_NAMES`] order.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Errors raised while fitting or scoring a forecaster.
#[derive(Debug, Error, PartialEq)]
pub enum TrainingError {
    /// Fitting needs at least one example.
    #[error("no training examples")]
    EmptyTrainingSet,

    /// Scoring needs at least one example.
    #[error("no test examples")]
    EmptyTestSet,

    /// `predict` was called before `fit`.
    #[error("forecaster `{0}` has not been fitted")]
    NotFitted(&'static str),

    /// Inputs and targets disagree in length or width.
    #[error("shape mismatch: {0}")]
    Shape(String),
}

/// Inputs and multi-step targets extracted from training examples.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// One feature vector per example.
    pub x: Vec<FeatureVector>,
    /// `y[i][h]` is the AQI `h + 1` rows after example `i`.
    pub y: Vec<Vec<f64>>,
}

impl DesignMatrix {
    /// Extracts `(X, y)` from examples that all share the same horizon.
    pub fn from_examples(examples: &[TrainingExample]) -> Result<Self, TrainingError> {
        let horizon = examples.first().map_or(0, |e| e.targets.len());
        if let Some(bad) = examples.iter().find(|e| e.targets.len() != horizon) {
            return Err(TrainingError::Shape(format!(
                "example {} has {} targets, expected {horizon}",
                bad.row.timestamp,
                bad.targets.len()
            )));
        }

        Ok(Self {
            x: examples.iter().map(|e| e.row.feature_vector()).collect(),
            y: examples
                .iter()
                .map(|e| e.targets.iter().map(|&t| t as f64).collect())
                .collect(),
        })
    }

    /// Number of target columns (0 when empty).
    pub fn horizon(&self) -> usize {
        self.y.first().map_or(0, Vec::len)
    }
}

/// A multi-output regressor from a feature vector to `horizon` ordered predictions.
pub trait Forecaster {
    /// Short identifier used in reports and logs.
    fn name(&self) -> &'static str;

    /// Learns from the training design matrix.
    fn fit(&mut self, train: &DesignMatrix) -> Result<(), TrainingError>;

    /// Predicts `horizon` values for one input row.
    fn predict(&self, x: &FeatureVector) -> Result<Vec<f64>, TrainingError>;
}

/// Test-set scores of one fitted forecaster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// [`Forecaster::name`].
    pub model: &'static str,
    /// Examples in the training prefix.
    pub train_examples: usize,
    /// Examples in the test suffix.
    pub test_examples: usize,
    /// Predictions per example.
    pub horizon: usize,
    /// Mean absolute error over every prediction.
    pub mae: f64,
    /// Root mean squared error over every prediction.
    pub rmse: f64,
    /// Mean absolute percentage error in percent; `None` when every truth value is zero.
    pub mape: Option<f64>,
    /// MAE of each horizon step, `t+1` first.
    pub mae_by_horizon: Vec<f64>,
}

/// Fits `model` on `split.train` and scores it on `split.test`.
pub fn evaluate(
    model: &mut dyn Forecaster,
    split: &TemporalSplit<TrainingExample>,
) -> Result<EvaluationReport, TrainingError> {
    let train = DesignMatrix::from_examples(&split.train)?;
    let test = DesignMatrix::from_examples(&split.test)?;
    if train.x.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }
    if test.x.is_empty() {
        return Err(TrainingError::EmptyTestSet);
    }
    if train.horizon() != test.horizon() {
        return Err(TrainingError::Shape(format!(
            "train horizon {} != test horizon {}",
            train.horizon(),
            test.horizon()
        )));
    }

    model.fit(&train)?;
    let predictions = test
        .x
        .iter()
        .map(|x| model.predict(x))
        .collect::<Result<Vec<_>, _>>()?;

    let scores = metrics::score(&test.y, &predictions)?;
    Ok(EvaluationReport {
        model: model.name(),
        train_examples: train.x.len(),
        test_examples: test.x.len(),
        horizon: test.horizon(),
        mae: scores.mae,
        rmse: scores.rmse,
        mape: scores.mape,
        mae_by_horizon: scores.mae_by_horizon,
    })
}
