//! Loading the trained artifacts from the model directory.
//!
//! The directory holds four JSON files produced by the training pipeline:
//! the classifier, the fitted scaler, the ordered feature names and the
//! default input vector. A load either yields all four or fails naming the
//! first file that could not be used.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

use crate::error::{LoadError, ModelError, PredictionError};
use crate::frame::{DefaultVector, FeatureSchema};
use crate::model::{Classifier, ClassifierArtifact, Scaler, ScalerArtifact};
use crate::predict::{self, Prediction};

pub const CLASSIFIER_FILE: &str = "xgb_means_model.json";
pub const SCALER_FILE: &str = "means_scaler.json";
pub const SCHEMA_FILE: &str = "mean_columns.json";
pub const DEFAULTS_FILE: &str = "default_input_mean.json";

/// File names of the four artifacts inside the model directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactLayout {
    pub classifier: String,
    pub scaler: String,
    pub schema: String,
    pub defaults: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            classifier: CLASSIFIER_FILE.to_string(),
            scaler: SCALER_FILE.to_string(),
            schema: SCHEMA_FILE.to_string(),
            defaults: DEFAULTS_FILE.to_string(),
        }
    }
}

/// Everything the prediction engine needs, loaded once and shared read-only.
pub struct Artifacts {
    classifier: Box<dyn Classifier>,
    scaler: Box<dyn Scaler>,
    schema: FeatureSchema,
    defaults: DefaultVector,
    source_dir: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Assemble artifacts that are already in memory. The schema must be
    /// valid and the defaults must hold one finite value per feature.
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: Box<dyn Scaler>,
        schema: FeatureSchema,
        defaults: DefaultVector,
    ) -> Result<Self, ModelError> {
        schema.validate().map_err(ModelError::Malformed)?;
        defaults.validate(&schema).map_err(ModelError::Malformed)?;
        Ok(Self::from_parts(classifier, scaler, schema, defaults, None))
    }

    /// Unchecked assembly for parts that were validated already.
    pub(crate) fn from_parts(
        classifier: Box<dyn Classifier>,
        scaler: Box<dyn Scaler>,
        schema: FeatureSchema,
        defaults: DefaultVector,
        source_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            classifier,
            scaler,
            schema,
            defaults,
            source_dir,
            loaded_at: Utc::now(),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn defaults(&self) -> &DefaultVector {
        &self.defaults
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    /// Directory the artifacts were read from, if they came from disk.
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Run one prediction against these artifacts.
    pub fn predict(&self, raw: &[f64]) -> Result<Prediction, PredictionError> {
        predict::predict(raw, &self.schema, self.scaler(), self.classifier())
    }
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("classifier", &self.classifier.kind())
            .field("scaler", &self.scaler.kind())
            .field("schema", &self.schema)
            .field("defaults", &self.defaults)
            .field("source_dir", &self.source_dir)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

/// Reads the artifacts from a model directory and caches the result.
///
/// Only successful loads are cached. After a failure the next call reads
/// every file again from scratch.
#[derive(Debug)]
pub struct ArtifactLoader {
    dir: PathBuf,
    layout: ArtifactLayout,
    cache: OnceCell<Arc<Artifacts>>,
}

impl ArtifactLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            layout: ArtifactLayout::default(),
            cache: OnceCell::new(),
        }
    }

    pub fn with_layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Load the artifacts, reading from disk only on the first success.
    pub fn load(&self) -> Result<Arc<Artifacts>, LoadError> {
        if let Some(cached) = self.cache.get() {
            debug!("reusing artifacts loaded from {}", self.dir.display());
            return Ok(Arc::clone(cached));
        }
        let loaded = self
            .cache
            .get_or_try_init(|| self.read_all().map(Arc::new))
            .map_err(|e| {
                warn!("failed to load artifacts from {}: {}", self.dir.display(), e);
                e
            })?;
        Ok(Arc::clone(loaded))
    }

    fn read_all(&self) -> Result<Artifacts, LoadError> {
        let classifier_path = self.dir.join(&self.layout.classifier);
        let classifier: ClassifierArtifact = read_json(&classifier_path)?;
        classifier
            .validate()
            .map_err(|e| LoadError::corrupt(&classifier_path, e))?;

        let scaler_path = self.dir.join(&self.layout.scaler);
        let scaler: ScalerArtifact = read_json(&scaler_path)?;
        scaler
            .validate()
            .map_err(|e| LoadError::corrupt(&scaler_path, e))?;

        let schema_path = self.dir.join(&self.layout.schema);
        let schema: FeatureSchema = read_json(&schema_path)?;
        schema
            .validate()
            .map_err(|e| LoadError::corrupt(&schema_path, e))?;

        let defaults_path = self.dir.join(&self.layout.defaults);
        let defaults: DefaultVector = read_json(&defaults_path)?;
        defaults
            .validate(&schema)
            .map_err(|e| LoadError::corrupt(&defaults_path, e))?;

        let artifacts = Artifacts::from_parts(
            classifier.into_classifier(),
            scaler.into_scaler(),
            schema,
            defaults,
            Some(self.dir.clone()),
        );
        info!(
            "loaded {} classifier and {} scaler for {} features from {}",
            artifacts.classifier.kind(),
            artifacts.scaler.kind(),
            artifacts.schema.len(),
            self.dir.display()
        );
        Ok(artifacts)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::MissingArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| LoadError::corrupt(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn load_is_cached_after_success() {
        let dir = tempfile::tempdir().unwrap();
        demo::write_demo_artifacts(dir.path()).unwrap();
        let loader = ArtifactLoader::new(dir.path());

        let first = loader.load().unwrap();
        fs::remove_file(dir.path().join(SCHEMA_FILE)).unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.source_dir(), Some(dir.path()));
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ArtifactLoader::new(dir.path());
        assert!(matches!(
            loader.load(),
            Err(LoadError::MissingArtifact { .. })
        ));

        demo::write_demo_artifacts(dir.path()).unwrap();
        let artifacts = loader.load().unwrap();
        assert_eq!(artifacts.schema().len(), 2);
    }

    #[test]
    fn custom_layout_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        demo::write_demo_artifacts(dir.path()).unwrap();
        fs::rename(dir.path().join(SCALER_FILE), dir.path().join("scaler.json")).unwrap();

        let layout = ArtifactLayout {
            scaler: "scaler.json".to_string(),
            ..ArtifactLayout::default()
        };
        let loader = ArtifactLoader::new(dir.path()).with_layout(layout);
        assert!(loader.load().is_ok());
    }

    #[test]
    fn in_memory_defaults_must_fit_schema() {
        let build = |defaults: Vec<f64>| {
            Artifacts::new(
                Box::new(demo::demo_classifier()),
                Box::new(demo::demo_scaler()),
                demo::demo_schema(),
                DefaultVector::new(defaults),
            )
        };
        assert!(matches!(build(vec![120.5]), Err(ModelError::Malformed(_))));
        assert!(matches!(
            build(vec![120.5, 0.8, 1.0]),
            Err(ModelError::Malformed(_))
        ));
        assert!(matches!(
            build(vec![f64::NAN, 0.8]),
            Err(ModelError::Malformed(_))
        ));

        let artifacts = build(vec![120.5, 0.8]).unwrap();
        assert_eq!(artifacts.source_dir(), None);
        assert_eq!(artifacts.defaults().values(), &[120.5, 0.8]);
    }
}
