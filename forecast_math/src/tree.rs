//! Second-order regression trees
//!
//! Trees are grown greedily on gradient/hessian statistics:
//! - Leaf weight: w* = -G / (H + lambda)
//! - Split gain: 0.5 * [GL²/(HL+λ) + GR²/(HR+λ) - (GL+GR)²/(HL+HR+λ)]
//! - A split is kept only when its gain exceeds `gamma`

use serde::{Deserialize, Serialize};

/// Growth limits shared by every tree of an ensemble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth of the tree (root has depth 0)
    pub max_depth: usize,
    /// Minimum hessian sum required in each child
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// Minimum loss reduction to make a split
    pub gamma: f64,
}

/// A node of a fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Route a sample to its leaf and return the leaf weight
    pub fn predict(&self, sample: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { weight } => return *weight,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = sample.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Depth of the deepest leaf
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Add one to `counts[feature]` for every split in the tree
    pub fn count_splits(&self, counts: &mut [f64]) {
        if let TreeNode::Split {
            feature,
            left,
            right,
            ..
        } = self
        {
            if let Some(c) = counts.get_mut(*feature) {
                *c += 1.0;
            }
            left.count_splits(counts);
            right.count_splits(counts);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Grow a tree over the given row and feature subsets.
///
/// `x` is row-major; `grad` and `hess` are indexed by row like `x`.
pub fn build_tree(
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    rows: &[usize],
    features: &[usize],
    params: &TreeParams,
) -> TreeNode {
    grow(x, grad, hess, rows, features, 0, params)
}

fn grow(
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    rows: &[usize],
    features: &[usize],
    depth: usize,
    params: &TreeParams,
) -> TreeNode {
    let g_sum: f64 = rows.iter().map(|&i| grad[i]).sum();
    let h_sum: f64 = rows.iter().map(|&i| hess[i]).sum();
    let weight = leaf_weight(g_sum, h_sum, params.reg_lambda);

    if depth >= params.max_depth || rows.len() < 2 || h_sum < params.min_child_weight {
        return TreeNode::Leaf { weight };
    }

    let mut best: Option<SplitCandidate> = None;
    for &feature in features {
        if let Some(candidate) = best_split_for_feature(x, grad, hess, rows, feature, params) {
            // Strict comparison keeps the earliest feature on ties
            if best.map_or(true, |b| candidate.gain > b.gain) {
                best = Some(candidate);
            }
        }
    }

    match best {
        Some(split) if split.gain > params.gamma => {
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&i| x[i][split.feature] <= split.threshold);

            if left_rows.is_empty() || right_rows.is_empty() {
                return TreeNode::Leaf { weight };
            }

            let left = grow(x, grad, hess, &left_rows, features, depth + 1, params);
            let right = grow(x, grad, hess, &right_rows, features, depth + 1, params);

            TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => TreeNode::Leaf { weight },
    }
}

fn leaf_weight(g_sum: f64, h_sum: f64, lambda: f64) -> f64 {
    let denom = h_sum + lambda;
    if denom <= 0.0 {
        0.0
    } else {
        -g_sum / denom
    }
}

/// Exact greedy scan over the sorted values of one feature
fn best_split_for_feature(
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    rows: &[usize],
    feature: usize,
    params: &TreeParams,
) -> Option<SplitCandidate> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

    let g_total: f64 = sorted.iter().map(|&i| grad[i]).sum();
    let h_total: f64 = sorted.iter().map(|&i| hess[i]).sum();
    let lambda = params.reg_lambda;
    let parent_score = g_total * g_total / (h_total + lambda);

    let mut g_left = 0.0;
    let mut h_left = 0.0;
    let mut best: Option<SplitCandidate> = None;

    for pos in 0..sorted.len().saturating_sub(1) {
        let idx = sorted[pos];
        let next = sorted[pos + 1];
        g_left += grad[idx];
        h_left += hess[idx];

        let value = x[idx][feature];
        let next_value = x[next][feature];
        if next_value - value <= 1e-12 {
            continue;
        }

        let g_right = g_total - g_left;
        let h_right = h_total - h_left;
        if h_left < params.min_child_weight || h_right < params.min_child_weight {
            continue;
        }

        let gain = 0.5
            * (g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                - parent_score);

        if best.map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate {
                feature,
                threshold: value + (next_value - value) / 2.0,
                gain,
            });
        }
    }

    best
}
