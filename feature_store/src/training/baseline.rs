//! Reference forecasters that any real model should beat.

use crate::{
    features::FEATURE_COUNT,
    training::{DesignMatrix, FeatureVector, Forecaster, TrainingError},
};

// `aqi_24hr_avg` is the last model input.
const AVG_IDX: usize = FEATURE_COUNT - 1;

/// Repeats the trailing 24-row mean for every step ahead.
///
/// Fitting only learns the horizon.
#[derive(Debug, Default, Clone)]
pub struct RollingMeanForecaster {
    horizon: Option<usize>,
}

impl Forecaster for RollingMeanForecaster {
    fn name(&self) -> &'static str {
        "rolling_mean"
    }

    fn fit(&mut self, train: &DesignMatrix) -> Result<(), TrainingError> {
        if train.x.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        self.horizon = Some(train.horizon());
        Ok(())
    }

    fn predict(&self, x: &FeatureVector) -> Result<Vec<f64>, TrainingError> {
        let horizon = self.horizon.ok_or(TrainingError::NotFitted(self.name()))?;
        Ok(vec![x[AVG_IDX]; horizon])
    }
}

/// Predicts the training-set mean of each target column, ignoring the input.
#[derive(Debug, Default, Clone)]
pub struct HorizonMeanForecaster {
    means: Option<Vec<f64>>,
}

impl Forecaster for HorizonMeanForecaster {
    fn name(&self) -> &'static str {
        "horizon_mean"
    }

    fn fit(&mut self, train: &DesignMatrix) -> Result<(), TrainingError> {
        if train.y.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        let n = train.y.len() as f64;
        let mut sums = vec![0.0; train.horizon()];
        for row in &train.y {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        self.means = Some(sums.into_iter().map(|s| s / n).collect());
        Ok(())
    }

    fn predict(&self, _x: &FeatureVector) -> Result<Vec<f64>, TrainingError> {
        self.means
            .clone()
            .ok_or(TrainingError::NotFitted(self.name()))
    }
}
