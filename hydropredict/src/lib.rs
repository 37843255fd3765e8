//! Inference core for the HydroPredict leakage demo.
//!
//! Loads a trained classifier, its fitted scaler, the feature names and the
//! default inputs from a model directory, then maps user-supplied sensor
//! averages to a leakage class. Page rendering lives elsewhere and calls in
//! through [`service::InferenceService`].

pub mod artifacts;
pub mod config;
pub mod demo;
pub mod error;
pub mod frame;
pub mod label;
pub mod model;
pub mod predict;
pub mod service;

pub use artifacts::{ArtifactLayout, ArtifactLoader, Artifacts};
pub use config::Settings;
pub use error::{LoadError, ModelError, PredictionError, ServiceError};
pub use frame::{DefaultVector, FeatureFrame, FeatureSchema};
pub use label::{leakage_label, LeakageClass};
pub use model::{Classifier, Scaler};
pub use predict::{predict, Prediction};
pub use service::{FormField, InferenceService};
