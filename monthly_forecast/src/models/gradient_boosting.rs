//! Gradient-boosted regression trees as a [`Regressor`]

use crate::error::{ForecastError, Result};
use crate::models::{Regressor, TrainedRegressor};
use forecast_math::{BoosterConfig, GradientBoostedTrees};

/// Boosted tree ensemble with fixed hyperparameters
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    /// Name of the model
    name: String,
    config: BoosterConfig,
}

/// Trained boosted tree ensemble
#[derive(Debug, Clone)]
pub struct TrainedGradientBoosting {
    /// Name of the model
    name: String,
    ensemble: GradientBoostedTrees,
}

impl GradientBoosting {
    /// Create a new boosted model, validating the hyperparameters
    pub fn new(config: BoosterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        Ok(Self {
            name: format!(
                "Gradient Boosting (trees={}, depth={}, lr={})",
                config.n_estimators, config.max_depth, config.learning_rate
            ),
            config,
        })
    }

    pub fn config(&self) -> &BoosterConfig {
        &self.config
    }
}

impl Regressor for GradientBoosting {
    type Trained = TrainedGradientBoosting;

    fn train(&self, rows: &[Vec<f64>], labels: &[f64]) -> Result<Self::Trained> {
        let ensemble = GradientBoostedTrees::fit(&self.config, rows, labels)?;

        Ok(TrainedGradientBoosting {
            name: self.name.clone(),
            ensemble,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedGradientBoosting {
    /// Split-count importance per feature column
    pub fn feature_importances(&self) -> Vec<f64> {
        self.ensemble.feature_importances()
    }

    pub fn ensemble(&self) -> &GradientBoostedTrees {
        &self.ensemble
    }
}

impl TrainedRegressor for TrainedGradientBoosting {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(self.ensemble.predict(rows)?)
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        Ok(self.ensemble.predict_row(row)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
