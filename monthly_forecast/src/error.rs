//! Error types for the monthly_forecast crate

use forecast_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the monthly_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough regular periods to fill every lag feature
    #[error("Insufficient history: {available} periods available, at least {required} required")]
    InsufficientHistory { available: usize, required: usize },

    /// Error raised while training or querying a regressor
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error while reading a configuration document
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV serialization
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::ModelError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}
