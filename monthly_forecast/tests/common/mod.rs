//! Shared fixtures for the integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use monthly_forecast::{RegularSeries, Regressor, Result, TrainedRegressor};
use std::cell::RefCell;

pub fn month_end(y: i32, m: u32) -> NaiveDate {
    monthly_forecast::utils::month_end(y, m).unwrap()
}

/// Monthly series starting January 2020 with one exogenous column
pub fn series_with_exog(target: Vec<f64>, exog: Vec<f64>) -> RegularSeries {
    RegularSeries::from_monthly_values(
        month_end(2020, 1),
        "Sales",
        target,
        vec!["Quantity".to_string()],
        vec![exog],
    )
    .unwrap()
}

/// Target `1..=n`, exogenous constant 5
pub fn counting_series(n: usize) -> RegularSeries {
    let target = (1..=n).map(|v| v as f64).collect();
    series_with_exog(target, vec![5.0; n])
}

/// Predicts one feature column plus a constant offset
#[derive(Debug, Clone)]
pub struct ColumnModel {
    pub column: usize,
    pub offset: f64,
}

#[derive(Debug)]
pub struct TrainedColumnModel {
    column: usize,
    offset: f64,
    /// Every row seen by `predict`, in call order
    pub seen: RefCell<Vec<Vec<f64>>>,
}

impl Regressor for ColumnModel {
    type Trained = TrainedColumnModel;

    fn train(&self, _rows: &[Vec<f64>], _labels: &[f64]) -> Result<Self::Trained> {
        Ok(TrainedColumnModel {
            column: self.column,
            offset: self.offset,
            seen: RefCell::new(Vec::new()),
        })
    }

    fn name(&self) -> &str {
        "column"
    }
}

impl TrainedRegressor for TrainedColumnModel {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.seen.borrow_mut().extend(rows.iter().cloned());
        Ok(rows.iter().map(|r| r[self.column] + self.offset).collect())
    }

    fn name(&self) -> &str {
        "column"
    }
}

/// Predicts the mean of its training labels
#[derive(Debug, Clone)]
pub struct MeanModel;

#[derive(Debug)]
pub struct TrainedMeanModel {
    pub mean: f64,
    pub train_rows: usize,
}

impl Regressor for MeanModel {
    type Trained = TrainedMeanModel;

    fn train(&self, rows: &[Vec<f64>], labels: &[f64]) -> Result<Self::Trained> {
        let mean = labels.iter().sum::<f64>() / labels.len().max(1) as f64;
        Ok(TrainedMeanModel {
            mean,
            train_rows: rows.len(),
        })
    }

    fn name(&self) -> &str {
        "mean"
    }
}

impl TrainedRegressor for TrainedMeanModel {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(vec![self.mean; rows.len()])
    }

    fn name(&self) -> &str {
        "mean"
    }
}
