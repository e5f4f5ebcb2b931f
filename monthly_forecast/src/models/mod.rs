//! Regression models trained on lagged feature matrices

use crate::error::{ForecastError, Result};
use std::fmt::Debug;

/// A fitted regressor mapping feature rows to target values
pub trait TrainedRegressor: Debug {
    /// Predict one value per row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Predict a single row
    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let mut values = self.predict(&[row.to_vec()])?;
        values
            .pop()
            .ok_or_else(|| ForecastError::ModelError("Model returned no prediction".to_string()))
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// An untrained regressor.
///
/// `train` never mutates `self`, so every call produces an independent
/// fitted model.
pub trait Regressor: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedRegressor;

    /// Fit on row-major features against their labels
    fn train(&self, rows: &[Vec<f64>], labels: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod gradient_boosting;
