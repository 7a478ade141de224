use crate::dataset::DatasetError;

/// An ordered dataset cut into a training prefix and a test suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSplit<T> {
    /// The first `floor(n * (1 - f))` items.
    pub train: Vec<T>,
    /// The remaining items.
    pub test: Vec<T>,
}

/// Splits `items` without shuffling so every training item precedes every test item.
pub fn temporal_split<T>(mut items: Vec<T>, test_fraction: f64) -> Result<TemporalSplit<T>, DatasetError> {
    // NaN fails both comparisons
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidTestFraction(test_fraction));
    }
    if items.is_empty() {
        return Err(DatasetError::Empty);
    }

    let train_len = (items.len() as f64 * (1.0 - test_fraction)).floor() as usize;
    let test = items.split_off(train_len.min(items.len()));
    Ok(TemporalSplit { train: items, test })
}
