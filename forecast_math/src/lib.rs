//! # Forecast Math
//!
//! Numeric building blocks used by the monthly forecaster.
//! This crate provides a squared-error regression tree and a
//! second-order gradient-boosted ensemble built from those trees.

use thiserror::Error;

pub mod boosting;
pub mod tree;

pub use boosting::{BoosterConfig, GradientBoostedTrees};

/// Errors that can occur in numeric model fitting
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Check that `rows` is a non-empty rectangular matrix and return its width.
pub fn matrix_width(rows: &[Vec<f64>]) -> Result<usize> {
    let first = rows.first().ok_or_else(|| {
        MathError::InsufficientData("Feature matrix has no rows".to_string())
    })?;
    let width = first.len();

    if let Some(pos) = rows.iter().position(|r| r.len() != width) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} features, expected {}",
            pos,
            rows[pos].len(),
            width
        )));
    }

    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_width() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(matrix_width(&rows).unwrap(), 2);
    }

    #[test]
    fn test_matrix_width_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            matrix_width(&rows),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_matrix_width_rejects_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            matrix_width(&rows),
            Err(MathError::InsufficientData(_))
        ));
    }
}
