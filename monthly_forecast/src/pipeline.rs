//! End-to-end run: regularize, engineer features, evaluate, refit, forecast

use crate::config::PipelineConfig;
use crate::data::{regularize, PeriodValue, RawRecord, RegularSeries};
use crate::error::Result;
use crate::evaluation::{evaluate, Evaluation};
use crate::features::{build_features, FeatureMatrix};
use crate::forecaster::RecursiveForecaster;
use crate::models::gradient_boosting::GradientBoosting;
use crate::models::{Regressor, TrainedRegressor};
use crate::output::OutputTables;
use tracing::info;

/// Everything produced by one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput<T: TrainedRegressor> {
    pub series: RegularSeries,
    pub features: FeatureMatrix,
    pub evaluation: Evaluation,
    /// Model refit on every feature row
    pub model: T,
    /// In-sample predictions of `model`, one per feature row
    pub fitted: Vec<PeriodValue>,
    pub forecast: Vec<PeriodValue>,
    pub tables: OutputTables,
}

/// Configured forecasting pipeline around an untrained regressor
#[derive(Debug, Clone)]
pub struct Pipeline<M: Regressor> {
    config: PipelineConfig,
    model: M,
}

impl Pipeline<GradientBoosting> {
    /// Pipeline using the boosted model described by `config.model`
    pub fn gradient_boosting(config: PipelineConfig) -> Result<Self> {
        let model = GradientBoosting::new(config.model.clone())?;
        Self::new(config, model)
    }
}

impl<M: Regressor> Pipeline<M> {
    pub fn new(config: PipelineConfig, model: M) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run on raw records whose exogenous values follow `config.exogenous_columns`
    pub fn run(&self, records: &[RawRecord]) -> Result<PipelineOutput<M::Trained>> {
        let series = regularize(
            records,
            &self.config.target_column,
            &self.config.exogenous_columns,
        )?;
        self.run_series(series)
    }

    /// Run on an already regular series
    pub fn run_series(&self, series: RegularSeries) -> Result<PipelineOutput<M::Trained>> {
        info!(
            periods = series.len(),
            first = ?series.first_period(),
            last = ?series.last_period(),
            "monthly series ready"
        );

        let features = build_features(&series, self.config.max_lag)?;
        features.require_rows()?;
        info!(
            rows = features.len(),
            columns = features.schema().len(),
            "feature matrix built"
        );

        let evaluation = evaluate(&self.model, &features, self.config.train_fraction)?;

        let model = self.model.train(features.rows(), features.labels())?;
        let fitted: Vec<PeriodValue> = features
            .periods()
            .iter()
            .zip(model.predict(features.rows())?)
            .map(|(&period, value)| PeriodValue { period, value })
            .collect();

        let forecast = RecursiveForecaster::new(&model, features.schema())
            .forecast(&series, self.config.horizon)?;

        let tables = OutputTables::assemble(&series, &fitted, &forecast, &evaluation);

        Ok(PipelineOutput {
            series,
            features,
            evaluation,
            model,
            fitted,
            forecast,
            tables,
        })
    }
}
