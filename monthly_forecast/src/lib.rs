//! # Monthly Forecast
//!
//! A Rust library for monthly lagged-regression forecasting with exogenous drivers.
//!
//! ## Features
//!
//! - Irregular records regularized onto a gap-free month-end grid
//! - Lag features for the target and every exogenous column, plus month and year
//! - Chronological train/evaluation split with MAPE, R², MAE and RMSE
//! - Recursive multi-month forecasting that feeds predictions back as lags
//! - Merged actual/fitted/forecast and metrics tables, exportable to polars or CSV
//!
//! ## Recursive forecasting
//!
//! Each forecast month is predicted from a feature row whose target lags
//! read the most recent values of a rolling history. That history starts
//! as the observed series and grows by one prediction per step, so from
//! the second month on the nearest lags are the model's own outputs.
//! Exogenous drivers are never forecast; their lags stay on the last
//! observed values for the whole horizon.
//!
//! ## Quick Start
//!
//! ```no_run
//! use monthly_forecast::{DataLoader, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let records = DataLoader::from_csv("sales.csv", &config)?;
//!
//! let pipeline = Pipeline::gradient_boosting(config)?;
//! let output = pipeline.run(&records)?;
//!
//! for point in &output.forecast {
//!     println!("{}: {:.2}", point.period, point.value);
//! }
//! println!("{}", output.evaluation.metrics);
//! # Ok::<(), monthly_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{regularize, DataLoader, PeriodValue, RawRecord, RegularSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::evaluation::{evaluate, ChronologicalSplit, Evaluation};
pub use crate::features::{build_features, FeatureMatrix, FeatureSchema, FeatureSpec};
pub use crate::forecaster::{ForecastState, RecursiveForecaster};
pub use crate::metrics::EvaluationMetrics;
pub use crate::models::gradient_boosting::GradientBoosting;
pub use crate::models::{Regressor, TrainedRegressor};
pub use crate::output::{MetricsTable, OutputTable, OutputTables};
pub use crate::pipeline::{Pipeline, PipelineOutput};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
