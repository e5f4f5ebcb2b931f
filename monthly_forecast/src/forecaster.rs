//! Recursive multi-step forecasting
//!
//! Each step builds one feature row from the current histories, predicts
//! the next month and appends that prediction to the target history, so
//! later steps read earlier predictions as their most recent target lags.
//! Exogenous histories are never extended: their lags stay anchored on
//! the last observed values for the whole horizon.

use crate::data::{PeriodValue, RegularSeries};
use crate::error::{ForecastError, Result};
use crate::features::{named_features, FeatureSchema};
use crate::models::TrainedRegressor;
use crate::utils::next_month_end;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Rolling state of one forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastState {
    target_name: String,
    /// Observed target values followed by every prediction made so far
    target: Vec<f64>,
    /// Observed exogenous histories, read-only
    exogenous: Vec<(String, Vec<f64>)>,
    last_period: NaiveDate,
    observed_len: usize,
}

impl ForecastState {
    /// Start from the full observed history of `series`
    pub fn from_series(series: &RegularSeries) -> Result<Self> {
        let last_period = series.last_period().ok_or(ForecastError::InsufficientHistory {
            available: 0,
            required: 1,
        })?;

        Ok(Self {
            target_name: series.target_name().to_string(),
            target: series.target().to_vec(),
            exogenous: series
                .exogenous_names()
                .iter()
                .cloned()
                .zip(series.exogenous_columns().iter().cloned())
                .collect(),
            last_period,
            observed_len: series.len(),
        })
    }

    /// Observed values followed by the predictions appended so far
    pub fn target_history(&self) -> &[f64] {
        &self.target
    }

    /// Predictions appended so far
    pub fn predictions(&self) -> &[f64] {
        &self.target[self.observed_len..]
    }

    pub fn exogenous_history(&self, name: &str) -> Option<&[f64]> {
        self.exogenous
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h.as_slice())
    }

    /// Most recent period covered by the target history
    pub fn last_period(&self) -> NaiveDate {
        self.last_period
    }

    pub fn next_period(&self) -> Result<NaiveDate> {
        next_month_end(self.last_period)
    }

    /// Feature row for `period`, aligned onto `schema`
    pub fn features_for(&self, period: NaiveDate, schema: &FeatureSchema) -> Result<Vec<f64>> {
        let exogenous: Vec<(&str, &[f64])> = self
            .exogenous
            .iter()
            .map(|(name, history)| (name.as_str(), history.as_slice()))
            .collect();
        let named = named_features(
            &self.target_name,
            &self.target,
            &exogenous,
            period,
            schema.max_lag(),
        )?;
        Ok(schema.reindex(named))
    }

    fn push_prediction(&mut self, period: NaiveDate, value: f64) {
        self.target.push(value);
        self.last_period = period;
    }

    pub fn into_target_history(self) -> Vec<f64> {
        self.target
    }
}

/// Walks a trained model forward one month at a time
#[derive(Debug)]
pub struct RecursiveForecaster<'a, T: TrainedRegressor> {
    model: &'a T,
    schema: &'a FeatureSchema,
}

impl<'a, T: TrainedRegressor> RecursiveForecaster<'a, T> {
    /// `schema` must be the template the model was trained on
    pub fn new(model: &'a T, schema: &'a FeatureSchema) -> Self {
        Self { model, schema }
    }

    /// Forecast the `horizon` months following the end of `series`
    pub fn forecast(&self, series: &RegularSeries, horizon: usize) -> Result<Vec<PeriodValue>> {
        let state = ForecastState::from_series(series)?;
        let (points, _) = self.run(state, horizon)?;
        Ok(points)
    }

    /// Advance `state` by `horizon` steps, returning the predictions and the final state
    pub fn run(
        &self,
        mut state: ForecastState,
        horizon: usize,
    ) -> Result<(Vec<PeriodValue>, ForecastState)> {
        if horizon > 0 && state.target.len() < self.schema.max_lag() {
            return Err(ForecastError::InsufficientHistory {
                available: state.target.len(),
                required: self.schema.max_lag(),
            });
        }

        let mut points = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let period = state.next_period()?;
            let row = state.features_for(period, self.schema)?;
            let value = self.model.predict_row(&row)?;

            debug!(step, period = %period, value, "forecast step");
            points.push(PeriodValue { period, value });
            state.push_prediction(period, value);
        }

        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            info!(
                model = self.model.name(),
                horizon,
                first = %first.period,
                last = %last.period,
                "recursive forecast complete"
            );
        }

        Ok((points, state))
    }
}
