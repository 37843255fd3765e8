//! A small, fixed artifact set for trying the binaries and for tests.
//!
//! Two features: mean pressure `ps1_mean` (bar) and mean vibration
//! `vs2_mean` (mm/s). Nominal operation sits around 160 bar and 0.6 mm/s.
//! Pressure drop pushes towards leakage and vibration towards severe leakage.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::artifacts::{Artifacts, CLASSIFIER_FILE, DEFAULTS_FILE, SCALER_FILE, SCHEMA_FILE};
use crate::frame::{DefaultVector, FeatureSchema};
use crate::model::{ClassifierArtifact, LinearClassifier, ScalerArtifact, StandardScaler};

pub const DEMO_FEATURES: [&str; 2] = ["ps1_mean", "vs2_mean"];
pub const DEMO_DEFAULTS: [f64; 2] = [120.5, 0.8];

pub fn demo_schema() -> FeatureSchema {
    FeatureSchema::new(DEMO_FEATURES)
}

pub fn demo_defaults() -> DefaultVector {
    DefaultVector::new(DEMO_DEFAULTS.to_vec())
}

pub fn demo_scaler() -> StandardScaler {
    StandardScaler::new(vec![160.0, 0.6], vec![10.0, 0.1]).with_feature_names(DEMO_FEATURES)
}

pub fn demo_classifier() -> LinearClassifier {
    LinearClassifier::new(
        vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![-1.0, 1.0]],
        vec![0.5, 0.0, -1.0],
    )
}

/// The demo set, in memory.
pub fn demo_artifacts() -> Artifacts {
    Artifacts::from_parts(
        Box::new(demo_classifier()),
        Box::new(demo_scaler()),
        demo_schema(),
        demo_defaults(),
        None,
    )
}

/// Write the demo set into `dir` using the default file names.
pub fn write_demo_artifacts(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    write_json(
        &dir.join(CLASSIFIER_FILE),
        &ClassifierArtifact::Linear(demo_classifier()),
    )?;
    write_json(
        &dir.join(SCALER_FILE),
        &ScalerArtifact::Standard(demo_scaler()),
    )?;
    write_json(&dir.join(SCHEMA_FILE), &demo_schema())?;
    write_json(&dir.join(DEFAULTS_FILE), &demo_defaults())?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
