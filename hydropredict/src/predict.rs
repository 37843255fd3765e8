//! The prediction engine: raw sensor averages in, leakage class out.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::{ModelError, PredictionError};
use crate::frame::{FeatureFrame, FeatureSchema};
use crate::label::{leakage_label, LeakageClass};
use crate::model::{check_width, Classifier, Scaler};

/// Classifier output together with its display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub class_index: i64,
    pub label: &'static str,
}

impl Prediction {
    pub fn from_class_index(class_index: i64) -> Self {
        Self {
            class_index,
            label: leakage_label(class_index),
        }
    }

    pub fn class(&self) -> LeakageClass {
        LeakageClass::from_index(self.class_index)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.class_index, self.label)
    }
}

/// Validate `raw`, scale it and classify it.
///
/// `raw` holds one value per schema entry, in schema order. Nothing outside
/// the arguments is read or written, so identical inputs give identical
/// results for deterministic models.
pub fn predict(
    raw: &[f64],
    schema: &FeatureSchema,
    scaler: &dyn Scaler,
    classifier: &dyn Classifier,
) -> Result<Prediction, PredictionError> {
    let frame = FeatureFrame::single_row(schema, raw)?;

    let scaled = scaler.transform(&frame)?;
    if scaled.nrows() != 1 {
        return Err(ModelError::RowCountMismatch {
            expected: 1,
            actual: scaled.nrows(),
        }
        .into());
    }
    check_width(schema.len(), scaled.ncols())?;
    if let Some(column) = scaled.row(0).iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite { column }.into());
    }

    let classes = classifier.predict(scaled.view())?;
    let class_index = *classes.first().ok_or(ModelError::EmptyBatch)?;
    let prediction = Prediction::from_class_index(class_index);
    debug!(
        "{} scaler + {} classifier -> {}",
        scaler.kind(),
        classifier.kind(),
        prediction
    );
    Ok(prediction)
}
