//! Feature schema, default vector and the single-row frame handed to scalers.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

/// Ordered feature names the classifier was trained on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema(Vec<String>);

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Position of `name` in the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }

    /// Reject empty schemas and duplicate names.
    pub fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("feature schema is empty".to_string());
        }
        let mut seen = HashSet::with_capacity(self.0.len());
        for name in &self.0 {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate feature name `{name}`"));
            }
        }
        Ok(())
    }
}

/// Values used to pre-fill inputs, one per schema entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultVector(Vec<f64>);

impl DefaultVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Check the vector lines up with `schema` and holds only finite values.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), String> {
        if self.0.len() != schema.len() {
            return Err(format!(
                "expected {} default values, found {}",
                schema.len(),
                self.0.len()
            ));
        }
        if let Some(index) = self.0.iter().position(|v| !v.is_finite()) {
            return Err(format!("default value at index {index} is not finite"));
        }
        Ok(())
    }
}

/// A single row of raw values with its column names attached.
///
/// Scalers fitted on named columns use the names to confirm that each value
/// sits in the position they expect.
#[derive(Debug)]
pub struct FeatureFrame<'a> {
    columns: &'a [String],
    values: Array2<f64>,
}

impl<'a> FeatureFrame<'a> {
    /// Build a one-row frame. The vector must match the schema length and
    /// contain only finite numbers.
    pub fn single_row(schema: &'a FeatureSchema, raw: &[f64]) -> Result<Self, PredictionError> {
        if raw.len() != schema.len() {
            return Err(PredictionError::SchemaMismatch {
                expected: schema.len(),
                actual: raw.len(),
            });
        }
        if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::InvalidInput { index });
        }
        let values = Array2::from_shape_fn((1, raw.len()), |(_, j)| raw[j]);
        Ok(Self {
            columns: schema.names(),
            values,
        })
    }

    pub fn columns(&self) -> &[String] {
        self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_preserves_column_order() {
        let schema = FeatureSchema::new(["ps1_mean", "vs2_mean"]);
        let frame = FeatureFrame::single_row(&schema, &[120.5, 0.8]).unwrap();
        assert_eq!(frame.columns(), schema.names());
        assert_eq!(frame.values().shape(), &[1, 2]);
        assert_eq!(frame.values()[[0, 0]], 120.5);
        assert_eq!(frame.values()[[0, 1]], 0.8);
    }

    #[test]
    fn frame_rejects_short_and_long_rows() {
        let schema = FeatureSchema::new(["a", "b", "c"]);
        for raw in [&[1.0, 2.0][..], &[1.0, 2.0, 3.0, 4.0][..]] {
            let err = FeatureFrame::single_row(&schema, raw).unwrap_err();
            assert_eq!(
                err,
                PredictionError::SchemaMismatch {
                    expected: 3,
                    actual: raw.len()
                }
            );
        }
    }

    #[test]
    fn frame_reports_first_non_finite_index() {
        let schema = FeatureSchema::new(["a", "b", "c"]);
        let err = FeatureFrame::single_row(&schema, &[1.0, f64::INFINITY, f64::NAN]).unwrap_err();
        assert_eq!(err, PredictionError::InvalidInput { index: 1 });
    }

    #[test]
    fn schema_validation() {
        assert!(FeatureSchema::new(Vec::<String>::new()).validate().is_err());
        assert!(FeatureSchema::new(["a", "a"]).validate().is_err());
        assert!(FeatureSchema::new(["a", "b"]).validate().is_ok());
    }

    #[test]
    fn default_vector_must_match_schema() {
        let schema = FeatureSchema::new(["a", "b"]);
        assert!(DefaultVector::new(vec![1.0]).validate(&schema).is_err());
        assert!(DefaultVector::new(vec![1.0, f64::NAN]).validate(&schema).is_err());
        assert!(DefaultVector::new(vec![1.0, -3.0]).validate(&schema).is_ok());
    }
}
