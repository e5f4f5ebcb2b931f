//! Metrics for evaluating forecast performance
//!
//! Every function returns NaN instead of failing when the inputs are
//! empty or have different lengths, so a degenerate evaluation window
//! yields undefined metrics rather than an error.

use statrs::statistics::Statistics;
use std::fmt;

/// Actuals with an absolute value at or below this are left out of MAPE
pub const MAPE_EPSILON: f64 = 1e-12;

fn paired(actual: &[f64], predicted: &[f64]) -> bool {
    actual.len() == predicted.len() && !actual.is_empty()
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .mean()
}

/// Mean squared error
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .mean()
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_squared_error(actual, predicted).sqrt()
}

/// Mean absolute percentage error, as a fraction.
///
/// Rows whose actual is within [`MAPE_EPSILON`] of zero are skipped; the
/// result is NaN when no row remains.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| a.abs() > MAPE_EPSILON)
        .map(|(a, p)| (a - p).abs() / a.abs())
        .mean()
}

/// Coefficient of determination.
///
/// NaN with fewer than two rows. A constant actual series scores 1.0
/// when predicted exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) || actual.len() < 2 {
        return f64::NAN;
    }

    let mean = actual.iter().mean();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Held-out accuracy of a regressor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean Absolute Percentage Error (fraction)
    pub mape: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
}

impl EvaluationMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            mape: mean_absolute_percentage_error(actual, predicted),
            r2: r2_score(actual, predicted),
            mae: mean_absolute_error(actual, predicted),
            rmse: root_mean_squared_error(actual, predicted),
        }
    }

    /// All metrics NaN, for an empty evaluation window
    pub fn undefined() -> Self {
        Self {
            mape: f64::NAN,
            r2: f64::NAN,
            mae: f64::NAN,
            rmse: f64::NAN,
        }
    }

    /// `(name, value)` pairs in reporting order
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("MAPE", self.mape),
            ("R2", self.r2),
            ("MAE", self.mae),
            ("RMSE", self.rmse),
        ]
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluation Metrics:")?;
        writeln!(f, "  MAPE:  {:.4}", self.mape)?;
        writeln!(f, "  R2:    {:.4}", self.r2)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        Ok(())
    }
}
