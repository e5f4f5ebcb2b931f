//! Pipeline configuration

use crate::error::{ForecastError, Result};
use forecast_math::BoosterConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Everything a pipeline run needs besides the data itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the date-like column in the source table
    pub date_column: String,
    /// Column to predict
    pub target_column: String,
    /// Driver columns used only through their lags
    pub exogenous_columns: Vec<String>,
    /// Number of future months to forecast
    pub horizon: usize,
    /// Lag depth applied to the target and every exogenous column
    pub max_lag: usize,
    /// Share of feature rows used for training in the evaluation split
    pub train_fraction: f64,
    /// Hyperparameters of the boosted regressor
    pub model: BoosterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            date_column: "Month".to_string(),
            target_column: "Sales".to_string(),
            exogenous_columns: vec![
                "Quantity".to_string(),
                "Unit Price".to_string(),
                "Cost".to_string(),
                "Profit".to_string(),
            ],
            horizon: 6,
            max_lag: 12,
            train_fraction: 0.8,
            model: BoosterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; omitted fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_column.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Date column name must not be empty".to_string(),
            ));
        }
        if self.target_column.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Target column name must not be empty".to_string(),
            ));
        }
        if self.max_lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lag depth must be positive".to_string(),
            ));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Train fraction must be in (0, 1], got {}",
                self.train_fraction
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.exogenous_columns {
            if column.trim().is_empty() {
                return Err(ForecastError::InvalidParameter(
                    "Exogenous column names must not be empty".to_string(),
                ));
            }
            if column == &self.target_column || column == &self.date_column {
                return Err(ForecastError::InvalidParameter(format!(
                    "Exogenous column '{}' clashes with the target or date column",
                    column
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Exogenous column '{}' is listed twice",
                    column
                )));
            }
        }

        self.model
            .validate()
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))
    }

    /// Label attached to evaluation metrics, e.g. `"80/20"`
    pub fn split_label(&self) -> String {
        split_label(self.train_fraction)
    }
}

/// Percent train/eval label for a train fraction
pub fn split_label(train_fraction: f64) -> String {
    let train_pct = (train_fraction * 100.0).round().clamp(0.0, 100.0) as u32;
    format!("{}/{}", train_pct, 100 - train_pct)
}
