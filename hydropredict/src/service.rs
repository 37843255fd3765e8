//! The inference service handed to request handlers.
//!
//! Built once at start-up. When the artifacts cannot be loaded the service
//! stays up in a disabled state so the host can hide the prediction form and
//! keep serving everything else.

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::artifacts::{ArtifactLoader, Artifacts};
use crate::config::{Settings, DEFAULT_DASHBOARD_URL};
use crate::error::{LoadError, ServiceError};
use crate::frame::FeatureSchema;
use crate::predict::Prediction;

/// A pre-filled form input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub default: f64,
}

enum State {
    Ready(Arc<Artifacts>),
    Disabled(LoadError),
}

pub struct InferenceService {
    state: State,
    dashboard_url: String,
}

impl InferenceService {
    /// Load through `loader`; a failure disables predictions instead of
    /// propagating.
    pub fn start(loader: &ArtifactLoader) -> Self {
        let state = match loader.load() {
            Ok(artifacts) => {
                info!("prediction service ready ({} features)", artifacts.schema().len());
                State::Ready(artifacts)
            }
            Err(e) => {
                warn!("prediction service disabled: {e}");
                State::Disabled(e)
            }
        };
        Self {
            state,
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }

    /// Build the loader from `settings` and start.
    pub fn from_settings(settings: &Settings) -> Self {
        let loader = ArtifactLoader::new(&settings.models_dir);
        Self::start(&loader).with_dashboard_url(settings.dashboard_url.clone())
    }

    pub fn from_artifacts(artifacts: Arc<Artifacts>) -> Self {
        Self {
            state: State::Ready(artifacts),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }

    pub fn with_dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.dashboard_url = url.into();
        self
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Why predictions are disabled, if they are.
    pub fn unavailable_reason(&self) -> Option<&LoadError> {
        match &self.state {
            State::Ready(_) => None,
            State::Disabled(e) => Some(e),
        }
    }

    pub fn artifacts(&self) -> Option<&Arc<Artifacts>> {
        match &self.state {
            State::Ready(a) => Some(a),
            State::Disabled(_) => None,
        }
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.artifacts().map(|a| a.schema())
    }

    pub fn dashboard_url(&self) -> &str {
        &self.dashboard_url
    }

    /// One field per feature in schema order, pre-filled from the defaults.
    /// Empty while disabled.
    pub fn form_fields(&self) -> Vec<FormField> {
        let Some(artifacts) = self.artifacts() else {
            return Vec::new();
        };
        artifacts
            .schema()
            .names()
            .iter()
            .zip(artifacts.defaults().values())
            .map(|(name, &default)| FormField {
                name: name.clone(),
                default,
            })
            .collect()
    }

    /// The default vector with the named entries replaced.
    pub fn inputs_with_overrides(&self, overrides: &[(String, f64)]) -> Result<Vec<f64>, ServiceError> {
        let artifacts = self.ready()?;
        let schema = artifacts.schema();
        let mut values = artifacts.defaults().values().to_vec();
        for (name, value) in overrides {
            let index = schema
                .position(name)
                .ok_or_else(|| ServiceError::UnknownFeature { name: name.clone() })?;
            values[index] = *value;
        }
        Ok(values)
    }

    pub fn predict(&self, raw: &[f64]) -> Result<Prediction, ServiceError> {
        Ok(self.ready()?.predict(raw)?)
    }

    fn ready(&self) -> Result<&Arc<Artifacts>, ServiceError> {
        match &self.state {
            State::Ready(a) => Ok(a),
            State::Disabled(e) => Err(ServiceError::Unavailable {
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn missing_directory_disables_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let service = InferenceService::start(&ArtifactLoader::new(dir.path().join("absent")));
        assert!(!service.is_ready());
        assert!(service.form_fields().is_empty());
        assert!(matches!(
            service.unavailable_reason(),
            Some(LoadError::MissingArtifact { .. })
        ));
        assert!(matches!(
            service.predict(&[1.0, 2.0]),
            Err(ServiceError::Unavailable { .. })
        ));
    }

    #[test]
    fn form_fields_follow_schema_order() {
        let service = InferenceService::from_artifacts(Arc::new(demo::demo_artifacts()));
        let fields = service.form_fields();
        assert_eq!(
            fields,
            vec![
                FormField { name: "ps1_mean".into(), default: 120.5 },
                FormField { name: "vs2_mean".into(), default: 0.8 },
            ]
        );
    }

    #[test]
    fn overrides_replace_named_defaults() {
        let service = InferenceService::from_artifacts(Arc::new(demo::demo_artifacts()));
        let values = service
            .inputs_with_overrides(&[("vs2_mean".to_string(), 0.6)])
            .unwrap();
        assert_eq!(values, vec![120.5, 0.6]);

        let err = service
            .inputs_with_overrides(&[("ps9_mean".to_string(), 1.0)])
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownFeature { name } if name == "ps9_mean"));
    }

    #[test]
    fn dashboard_url_comes_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        demo::write_demo_artifacts(dir.path()).unwrap();
        let settings = Settings {
            models_dir: dir.path().to_path_buf(),
            dashboard_url: "https://dash.example/embed".to_string(),
        };
        let service = InferenceService::from_settings(&settings);
        assert!(service.is_ready());
        assert_eq!(service.dashboard_url(), "https://dash.example/embed");
    }
}
