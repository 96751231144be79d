use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matrix::FeatureMatrix;

/// Probabilistic binary classifier.
///
/// Returns one `[no-default, default]` distribution per input row.
pub trait Classifier: Send + Sync {
    fn num_features(&self) -> usize;

    fn predict_probability(&self, features: &FeatureMatrix)
        -> Result<Vec<[f64; 2]>, ClassifierError>;
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("expected {expected} features per row, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Gradient-boosted tree ensemble (JSON artifact)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
    /// Branch taken for NaN inputs.
    #[serde(default = "default_left")]
    pub default_left: bool,
}

fn default_left() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split(SplitNode),
    Leaf(f64),
}

/// A single regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. Requires a validated tree.
    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(v) => return *v,
                Node::Split(s) => {
                    let x = row[s.feature];
                    let go_left = if x.is_nan() {
                        s.default_left
                    } else {
                        x <= s.threshold
                    };
                    idx = if go_left { s.left } else { s.right };
                }
            }
        }
    }

    /// Children must point forward so every walk terminates.
    fn validate(&self, num_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split(s) = node {
                if s.feature >= num_features {
                    return Err(format!(
                        "node {i} splits on feature {} but the model has {num_features}",
                        s.feature
                    ));
                }
                for child in [s.left, s.right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {i} has invalid child index {child}"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Binary-objective boosted ensemble: `p = sigmoid(init_score + Σ leaves)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub num_features: usize,
    #[serde(default)]
    pub init_score: f64,
    pub trees: Vec<Tree>,
}

impl GradientBoostedTrees {
    pub fn validate(&self) -> Result<(), String> {
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.num_features)
                .map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }

    fn margin(&self, row: &[f64]) -> f64 {
        self.init_score + self.trees.iter().map(|t| t.leaf_value(row)).sum::<f64>()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for GradientBoostedTrees {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_probability(
        &self,
        features: &FeatureMatrix,
    ) -> Result<Vec<[f64; 2]>, ClassifierError> {
        if features.cols() != self.num_features {
            return Err(ClassifierError::FeatureCount {
                expected: self.num_features,
                actual: features.cols(),
            });
        }
        Ok(features
            .iter_rows()
            .map(|row| {
                let p = sigmoid(self.margin(row));
                [1.0 - p, p]
            })
            .collect())
    }
}
