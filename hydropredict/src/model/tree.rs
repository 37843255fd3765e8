//! Gradient boosted tree ensemble in the layout XGBoost dumps for
//! multi-class softmax models.
//!
//! Trees are grouped by boosting round: tree `i` contributes to class
//! `i % n_classes`. A class margin is `base_score` plus the leaves reached in
//! that class's trees, and the prediction is the class with the largest
//! margin. With `n_classes == 1` the margin is a binary logit and the
//! prediction is 1 when it is positive.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{argmax, binary_class, check_width, Classifier};
use crate::error::ModelError;

/// Tree node. Children always sit after their parent in `Tree::nodes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Branch taken when the feature value is missing (NaN).
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

impl Node {
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self::Split {
            feature,
            threshold,
            left,
            right,
            default_left: false,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Self::Leaf { value }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {id} splits on unknown feature {feature}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {id} has a NaN threshold"));
                    }
                    for child in [left, right] {
                        if *child <= id || *child >= self.nodes.len() {
                            return Err(format!("node {id} has invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {id} is not finite"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf.
    fn leaf_value(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        let mut id = 0;
        loop {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| ModelError::Malformed(format!("dangling node reference {id}")))?;
            let next = match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = *row.get(*feature).ok_or(ModelError::DimensionMismatch {
                        expected: feature + 1,
                        actual: row.len(),
                    })?;
                    if x.is_nan() {
                        if *default_left {
                            *left
                        } else {
                            *right
                        }
                    } else if x < *threshold {
                        *left
                    } else {
                        *right
                    }
                }
            };
            if next <= id {
                return Err(ModelError::Malformed(format!("cycle at node {id}")));
            }
            id = next;
        }
    }
}

fn default_base_score() -> f64 {
    0.5
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    n_features: usize,
    n_classes: usize,
    #[serde(default = "default_base_score")]
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn new(n_features: usize, n_classes: usize, base_score: f64, trees: Vec<Tree>) -> Self {
        Self {
            n_features,
            n_classes,
            base_score,
            trees,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_classes == 0 {
            return Err(ModelError::Malformed("ensemble has zero classes".into()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("ensemble has no trees".into()));
        }
        if !self.base_score.is_finite() {
            return Err(ModelError::Malformed("base score is not finite".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ModelError::Malformed(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    /// Per-class margins for one row.
    pub fn margins(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ModelError> {
        check_width(self.n_features, row.len())?;
        if self.n_classes == 0 {
            return Err(ModelError::Malformed("ensemble has zero classes".into()));
        }
        let mut margins = Array1::from_elem(self.n_classes, self.base_score);
        for (i, tree) in self.trees.iter().enumerate() {
            margins[i % self.n_classes] += tree.leaf_value(row)?;
        }
        Ok(margins)
    }
}

impl Classifier for TreeEnsemble {
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<i64>, ModelError> {
        rows.axis_iter(Axis(0))
            .map(|row| {
                let margins = self.margins(row)?;
                if self.n_classes == 1 {
                    binary_class(margins[0])
                } else {
                    argmax(margins.view()).map(|i| i as i64)
                }
            })
            .collect()
    }

    fn kind(&self) -> &'static str {
        "gradient_boosted_trees"
    }
}
