//! Multinomial linear classifier.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{argmax, binary_class, check_width, Classifier};
use crate::error::ModelError;

/// Linear scores `X · Wᵀ + b`, one coefficient row per class.
///
/// With a single coefficient row the model is binary and predicts class 1
/// when the score is positive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Self {
        Self {
            coefficients,
            intercepts,
        }
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() || self.n_features() == 0 {
            return Err(ModelError::Malformed("linear model has no coefficients".into()));
        }
        if self.intercepts.len() != self.coefficients.len() {
            return Err(ModelError::Malformed(format!(
                "{} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        let width = self.n_features();
        if let Some(row) = self.coefficients.iter().position(|r| r.len() != width) {
            return Err(ModelError::Malformed(format!(
                "coefficient row {row} does not have {width} entries"
            )));
        }
        let finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return Err(ModelError::Malformed("non-finite coefficient".into()));
        }
        Ok(())
    }

    fn weight(&self) -> Result<Array2<f64>, ModelError> {
        let rows = self.coefficients.len();
        let cols = self.n_features();
        let flat: Vec<f64> = self.coefficients.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| ModelError::Malformed(e.to_string()))
    }

    fn scores(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        self.validate()?;
        check_width(self.n_features(), rows.ncols())?;
        let weight = self.weight()?;
        let bias = Array1::from(self.intercepts.clone());
        let mut y = rows.dot(&weight.t());
        y += &bias.view().insert_axis(Axis(0));
        Ok(y)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<i64>, ModelError> {
        let scores = self.scores(rows)?;
        let binary = scores.ncols() == 1;
        scores
            .axis_iter(Axis(0))
            .map(|row| {
                if binary {
                    binary_class(row[0])
                } else {
                    argmax(row).map(|i| i as i64)
                }
            })
            .collect()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}
