//! Column-wise scalers.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::{check_columns, check_width, Scaler};
use crate::error::ModelError;
use crate::frame::FeatureFrame;

/// Standardisation: `(x - mean) / scale` per column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean,
            scale,
            feature_names: None,
        }
    }

    /// Record the column names the scaler was fitted on.
    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::Malformed(format!(
                "standard scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(names) = &self.feature_names {
            check_width(self.mean.len(), names.len())?;
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ModelError::Malformed("non-finite mean".to_string()));
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(ModelError::Malformed(format!(
                "scale for column {i} must be finite and non-zero"
            )));
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, frame: &FeatureFrame<'_>) -> Result<Array2<f64>, ModelError> {
        check_columns(self.feature_names.as_deref(), frame)?;
        check_width(self.n_features(), frame.ncols())?;

        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        let mut out = frame.values().to_owned();
        out -= &mean.view().insert_axis(Axis(0));
        out /= &scale.view().insert_axis(Axis(0));
        Ok(out)
    }

    fn kind(&self) -> &'static str {
        "standard"
    }
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Min-max rescaling into `feature_range`.
///
/// A column whose fitted minimum equals its maximum is shifted but not
/// stretched, so the fitted value lands on the lower bound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    feature_range: (f64, f64),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl MinMaxScaler {
    pub fn new(data_min: Vec<f64>, data_max: Vec<f64>) -> Self {
        Self {
            data_min,
            data_max,
            feature_range: default_feature_range(),
            feature_names: None,
        }
    }

    pub fn with_feature_range(mut self, lo: f64, hi: f64) -> Self {
        self.feature_range = (lo, hi);
        self
    }

    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.data_min.len() != self.data_max.len() {
            return Err(ModelError::Malformed(format!(
                "min-max scaler has {} minimums but {} maximums",
                self.data_min.len(),
                self.data_max.len()
            )));
        }
        if let Some(names) = &self.feature_names {
            check_width(self.data_min.len(), names.len())?;
        }
        let (lo, hi) = self.feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ModelError::Malformed(format!(
                "invalid feature range ({lo}, {hi})"
            )));
        }
        for (i, (min, max)) in self.data_min.iter().zip(&self.data_max).enumerate() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ModelError::Malformed(format!(
                    "column {i} has invalid bounds [{min}, {max}]"
                )));
            }
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, frame: &FeatureFrame<'_>) -> Result<Array2<f64>, ModelError> {
        check_columns(self.feature_names.as_deref(), frame)?;
        check_width(self.n_features(), frame.ncols())?;

        let (lo, hi) = self.feature_range;
        let factor: Array1<f64> = self
            .data_min
            .iter()
            .zip(&self.data_max)
            .map(|(min, max)| {
                let range = max - min;
                let range = if range == 0.0 { 1.0 } else { range };
                (hi - lo) / range
            })
            .collect();
        let offset: Array1<f64> = self
            .data_min
            .iter()
            .zip(factor.iter())
            .map(|(min, f)| lo - min * f)
            .collect();

        let mut out = frame.values().to_owned();
        out *= &factor.view().insert_axis(Axis(0));
        out += &offset.view().insert_axis(Axis(0));
        Ok(out)
    }

    fn kind(&self) -> &'static str {
        "min_max"
    }
}
