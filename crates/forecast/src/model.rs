//! Trained regressors.
//!
//! Models are trained offline and exported as tree ensembles. At serving time
//! they are immutable and safe to share across threads.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A trained regression model.
pub trait Regressor: Send + Sync + fmt::Debug {
    /// Feature names in the order the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Predict for one row laid out in [`feature_names`](Self::feature_names) order.
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError>;
}

/// One node of a regression tree.
///
/// Splits send a row left when `row[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn evaluate(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0usize;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).ok_or_else(|| {
                        ModelError::Malformed(format!("split on feature {feature} out of range"))
                    })?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::Malformed(format!("node index {idx} out of range")));
                }
            }
        }
        Err(ModelError::Malformed("tree contains a cycle".into()))
    }

    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Malformed("empty tree".into()));
        }
        for node in &self.nodes {
            if let Node::Split {
                feature,
                left,
                right,
                threshold,
            } = node
            {
                if *feature >= n_features {
                    return Err(ModelError::Malformed(format!(
                        "split on feature {feature}, model has {n_features}"
                    )));
                }
                if *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(ModelError::Malformed("child index out of range".into()));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::Malformed("non-finite split threshold".into()));
                }
            }
        }
        Ok(())
    }
}

/// Random-forest regressor: the prediction is the mean over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForestRepr", into = "ForestRepr")]
pub struct ForestRegressor {
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

#[derive(Serialize, Deserialize)]
struct ForestRepr {
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

impl TryFrom<ForestRepr> for ForestRegressor {
    type Error = ModelError;

    fn try_from(value: ForestRepr) -> Result<Self, Self::Error> {
        Self::new(value.feature_names, value.trees)
    }
}

impl From<ForestRegressor> for ForestRepr {
    fn from(value: ForestRegressor) -> Self {
        Self {
            feature_names: value.feature_names,
            trees: value.trees,
        }
    }
}

impl ForestRegressor {
    pub fn new(feature_names: Vec<String>, trees: Vec<Tree>) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::Malformed("forest has no trees".into()));
        }
        for tree in &trees {
            tree.validate(feature_names.len())?;
        }
        Ok(Self {
            feature_names,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for ForestRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.feature_names.len() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_names.len(),
                got: row.len(),
            });
        }

        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(row)?;
        }
        let prediction = sum / self.trees.len() as f64;

        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ModelError::NonFinitePrediction)
        }
    }
}
