//! Training dataset assembly: multi-step targets and the temporal split.

pub mod split;
pub mod targets;

use thiserror::Error;

pub use split::{TemporalSplit, temporal_split};
pub use targets::{DEFAULT_HORIZON, TrainingExample, build_training_examples};

/// Parameter errors raised while assembling a dataset.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    /// The test fraction must lie strictly between 0 and 1.
    #[error("test fraction {0} is outside (0, 1)")]
    InvalidTestFraction(f64),

    /// Nothing to split.
    #[error("cannot split an empty dataset")]
    Empty,

    /// The forecast horizon must be at least one step.
    #[error("forecast horizon must be at least 1")]
    InvalidHorizon,
}
