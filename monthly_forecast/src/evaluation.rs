//! Chronological train/evaluation split and held-out scoring

use crate::config::split_label;
use crate::error::{ForecastError, Result};
use crate::features::FeatureMatrix;
use crate::metrics::EvaluationMetrics;
use crate::models::{Regressor, TrainedRegressor};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Sizes of the two chronological partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChronologicalSplit {
    pub train_size: usize,
    pub eval_size: usize,
}

impl ChronologicalSplit {
    /// `train_size = max(floor(fraction * n_rows), 1)`, never more than `n_rows`
    pub fn new(n_rows: usize, train_fraction: f64) -> Result<Self> {
        if !(train_fraction > 0.0 && train_fraction <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Train fraction must be in (0, 1], got {}",
                train_fraction
            )));
        }
        if n_rows == 0 {
            return Err(ForecastError::InsufficientHistory {
                available: 0,
                required: 1,
            });
        }

        let train_size = ((n_rows as f64 * train_fraction).floor() as usize)
            .max(1)
            .min(n_rows);

        Ok(Self {
            train_size,
            eval_size: n_rows - train_size,
        })
    }
}

/// Held-out predictions and their metrics
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub split: ChronologicalSplit,
    /// Split label such as `"80/20"`
    pub label: String,
    pub periods: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub metrics: EvaluationMetrics,
}

/// Train on the leading rows of `matrix` and score on the rest.
///
/// Rows are never shuffled. An empty evaluation window is not an error;
/// its metrics are all NaN.
pub fn evaluate<M: Regressor>(
    model: &M,
    matrix: &FeatureMatrix,
    train_fraction: f64,
) -> Result<Evaluation> {
    matrix.require_rows()?;
    let split = ChronologicalSplit::new(matrix.len(), train_fraction)?;
    let (train, test) = matrix.split_at(split.train_size);

    let trained = model.train(train.rows(), train.labels())?;

    let (predicted, metrics) = if test.is_empty() {
        warn!(
            train_rows = split.train_size,
            "evaluation window is empty, metrics are undefined"
        );
        (Vec::new(), EvaluationMetrics::undefined())
    } else {
        let predicted = trained.predict(test.rows())?;
        let metrics = EvaluationMetrics::compute(test.labels(), &predicted);
        (predicted, metrics)
    };

    info!(
        model = model.name(),
        train_rows = split.train_size,
        eval_rows = split.eval_size,
        mape = metrics.mape,
        r2 = metrics.r2,
        mae = metrics.mae,
        rmse = metrics.rmse,
        "held-out evaluation"
    );

    Ok(Evaluation {
        split,
        label: split_label(train_fraction),
        periods: test.periods().to_vec(),
        actual: test.labels().to_vec(),
        predicted,
        metrics,
    })
}
