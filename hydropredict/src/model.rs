//! Scaler and classifier abstractions plus the artifact formats behind them.
//!
//! The engine only sees the [`Scaler`] and [`Classifier`] traits. The
//! concrete types in the submodules are what the JSON artifacts deserialize
//! into; another model format can be plugged in by implementing the traits.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::frame::FeatureFrame;

pub mod linear;
pub mod scaler;
pub mod tree;

pub use linear::LinearClassifier;
pub use scaler::{MinMaxScaler, StandardScaler};
pub use tree::{Node, Tree, TreeEnsemble};

/// Fitted normalisation applied before classification.
pub trait Scaler: Send + Sync {
    /// Transform every row of `frame`, keeping its shape.
    fn transform(&self, frame: &FeatureFrame<'_>) -> Result<Array2<f64>, ModelError>;

    /// Short name used in logs.
    fn kind(&self) -> &'static str;
}

/// Pre-trained discrete classifier.
pub trait Classifier: Send + Sync {
    /// One class index per input row.
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<i64>, ModelError>;

    fn predict_one(&self, row: ArrayView1<'_, f64>) -> Result<i64, ModelError> {
        let batch = row.insert_axis(Axis(0));
        self.predict(batch)?
            .first()
            .copied()
            .ok_or(ModelError::EmptyBatch)
    }

    fn kind(&self) -> &'static str;
}

/// Scaler artifact as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerArtifact {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Standard(s) => s.validate(),
            Self::MinMax(s) => s.validate(),
        }
    }

    pub fn into_scaler(self) -> Box<dyn Scaler> {
        match self {
            Self::Standard(s) => Box::new(s),
            Self::MinMax(s) => Box::new(s),
        }
    }
}

/// Classifier artifact as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    GradientBoostedTrees(TreeEnsemble),
    Linear(LinearClassifier),
}

impl ClassifierArtifact {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::GradientBoostedTrees(m) => m.validate(),
            Self::Linear(m) => m.validate(),
        }
    }

    pub fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            Self::GradientBoostedTrees(m) => Box::new(m),
            Self::Linear(m) => Box::new(m),
        }
    }
}

/// Index of the first maximum. NaN scores are skipped; a row with no
/// finite score at all is an error.
pub(crate) fn argmax(scores: ArrayView1<'_, f64>) -> Result<usize, ModelError> {
    if !scores.iter().any(|s| s.is_finite()) {
        return Err(ModelError::NoFiniteScore);
    }
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, &s) in scores.iter().enumerate() {
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    Ok(best)
}

/// Class of a single-score binary model: 1 when the score is positive.
pub(crate) fn binary_class(score: f64) -> Result<i64, ModelError> {
    if !score.is_finite() {
        return Err(ModelError::NoFiniteScore);
    }
    Ok(i64::from(score > 0.0))
}

pub(crate) fn check_width(expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected != actual {
        return Err(ModelError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Compare frame columns against the names a model was fitted with.
pub(crate) fn check_columns(
    fitted: Option<&[String]>,
    frame: &FeatureFrame<'_>,
) -> Result<(), ModelError> {
    let Some(fitted) = fitted else {
        return Ok(());
    };
    check_width(fitted.len(), frame.ncols())?;
    for (position, (expected, found)) in fitted.iter().zip(frame.columns()).enumerate() {
        if expected != found {
            return Err(ModelError::ColumnMismatch {
                position,
                expected: expected.clone(),
                found: found.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(array![0.0, 2.0, 2.0].view()), Ok(1));
        assert_eq!(argmax(array![-1.0, -3.0].view()), Ok(0));
        assert_eq!(argmax(array![f64::NAN, 1.0].view()), Ok(1));
        assert_eq!(argmax(array![f64::NEG_INFINITY, -5.0].view()), Ok(1));
    }

    #[test]
    fn argmax_without_finite_scores_fails() {
        assert_eq!(
            argmax(array![f64::NAN, f64::NEG_INFINITY, f64::NAN].view()),
            Err(ModelError::NoFiniteScore)
        );
        assert_eq!(
            argmax(array![f64::INFINITY, f64::NEG_INFINITY].view()),
            Err(ModelError::NoFiniteScore)
        );
        assert_eq!(binary_class(f64::NAN), Err(ModelError::NoFiniteScore));
        assert_eq!(binary_class(0.5), Ok(1));
    }

    #[test]
    fn scaler_artifact_is_tagged_by_kind() {
        let json = r#"{"kind":"standard","mean":[1.0],"scale":[2.0]}"#;
        let artifact: ScalerArtifact = serde_json::from_str(json).unwrap();
        assert!(matches!(artifact, ScalerArtifact::Standard(_)));
        assert_eq!(artifact.into_scaler().kind(), "standard");
    }

    #[test]
    fn unknown_classifier_kind_is_rejected() {
        let json = r#"{"kind":"random_forest","trees":[]}"#;
        assert!(serde_json::from_str::<ClassifierArtifact>(json).is_err());
    }
}
