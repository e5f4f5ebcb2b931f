//! Gradient-boosted regression trees (squared error loss)
//!
//! Each round fits a second-order tree to the current residual gradients
//! over a random row subsample and a random feature subsample, then adds
//! the tree to the ensemble scaled by the learning rate. Sampling uses a
//! seeded `StdRng`, so identical inputs and configuration produce an
//! identical ensemble.

use crate::tree::{build_tree, TreeNode, TreeParams};
use crate::{matrix_width, MathError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Fraction of rows sampled per tree
    pub subsample: f64,
    /// Fraction of features sampled per tree
    pub colsample_bytree: f64,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// Minimum loss reduction to make a split
    pub gamma: f64,
    pub random_state: u64,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth: 4,
            learning_rate: 0.05,
            subsample: 0.9,
            colsample_bytree: 0.9,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            random_state: 42,
        }
    }
}

impl BoosterConfig {
    /// Check every parameter is inside its valid range
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "n_estimators must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        for (name, value) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(MathError::InvalidInput(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("min_child_weight", self.min_child_weight),
            ("reg_lambda", self.reg_lambda),
            ("gamma", self.gamma),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(MathError::InvalidInput(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_child_weight: self.min_child_weight,
            reg_lambda: self.reg_lambda,
            gamma: self.gamma,
        }
    }
}

/// A fitted boosted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    config: BoosterConfig,
    base_score: f64,
    trees: Vec<TreeNode>,
    n_features: usize,
}

impl GradientBoostedTrees {
    /// Fit an ensemble on row-major `x` against targets `y`
    pub fn fit(config: &BoosterConfig, x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        config.validate()?;
        let n_features = matrix_width(x)?;
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "Feature rows ({}) don't match targets ({})",
                x.len(),
                y.len()
            )));
        }
        if let Some(pos) = y.iter().position(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Target at row {} is not finite",
                pos
            )));
        }

        let n_samples = x.len();
        let base_score = y.iter().sum::<f64>() / n_samples as f64;
        let mut preds = vec![base_score; n_samples];
        let hess = vec![1.0; n_samples];
        let params = config.tree_params();
        let mut rng = StdRng::seed_from_u64(config.random_state);
        let mut trees = Vec::with_capacity(config.n_estimators);

        for _ in 0..config.n_estimators {
            let grad: Vec<f64> = preds.iter().zip(y).map(|(p, t)| p - t).collect();
            let rows = sample_indices(&mut rng, n_samples, config.subsample);
            let features = sample_indices(&mut rng, n_features, config.colsample_bytree);

            let tree = build_tree(x, &grad, &hess, &rows, &features, &params);

            for (pred, sample) in preds.iter_mut().zip(x) {
                *pred += config.learning_rate * tree.predict(sample);
            }
            trees.push(tree);
        }

        Ok(Self {
            config: config.clone(),
            base_score,
            trees,
            n_features,
        })
    }

    /// Predict a single sample
    pub fn predict_row(&self, sample: &[f64]) -> Result<f64> {
        if sample.len() != self.n_features {
            return Err(MathError::InvalidInput(format!(
                "Sample has {} features, model expects {}",
                sample.len(),
                self.n_features
            )));
        }
        let boost: f64 = self.trees.iter().map(|t| t.predict(sample)).sum();
        Ok(self.base_score + self.config.learning_rate * boost)
    }

    /// Predict every row of `x`
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    pub fn config(&self) -> &BoosterConfig {
        &self.config
    }

    /// Split-count feature importances, normalized to sum to one
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_features];
        for tree in &self.trees {
            tree.count_splits(&mut counts);
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for c in counts.iter_mut() {
                *c /= total;
            }
        }
        counts
    }
}

/// Sorted sample of `ceil(n * ratio)` indices without replacement
fn sample_indices(rng: &mut StdRng, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}
