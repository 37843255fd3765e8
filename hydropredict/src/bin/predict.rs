//! Run one leakage prediction from the command line.
//!
//! Inputs start from the default vector shipped with the artifacts; single
//! features can be overridden with `--set name=value`, or the whole vector
//! given with `--values`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use hydropredict::{InferenceService, Prediction, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the trained artifacts
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Override one feature, e.g. `--set ps1_mean=151.2` (repeatable)
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, f64)>,

    /// Full input vector in feature order, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        conflicts_with = "overrides"
    )]
    values: Option<Vec<f64>>,

    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,
}

fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;
    Ok((name.trim().to_string(), value))
}

/// Application wrapping a started inference service.
pub struct PredictApp {
    service: InferenceService,
}

impl PredictApp {
    pub fn new(settings: &Settings) -> Self {
        Self {
            service: InferenceService::from_settings(settings),
        }
    }

    fn run(&self, args: &Args) -> Result<Prediction> {
        if let Some(reason) = self.service.unavailable_reason() {
            bail!("prediction is disabled: {reason}");
        }
        let inputs = match &args.values {
            Some(values) => values.clone(),
            None => self.service.inputs_with_overrides(&args.overrides)?,
        };
        Ok(self.service.predict(&inputs)?)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = Settings::from_env();
    if let Some(dir) = &args.models_dir {
        settings = settings.with_models_dir(dir);
    }

    let app = PredictApp::new(&settings);
    let prediction = app.run(&args)?;
    if args.json {
        println!("{}", serde_json::to_string(&prediction)?);
    } else {
        println!("Prediction: {prediction}");
    }
    Ok(())
}
