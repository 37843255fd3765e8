//! Show what the prediction form would offer: the loaded artifacts, one
//! input per feature with its default, and the dashboard address.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use hydropredict::{InferenceService, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the trained artifacts
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = Settings::from_env();
    if let Some(dir) = args.models_dir {
        settings = settings.with_models_dir(dir);
    }
    let service = InferenceService::from_settings(&settings);

    println!("HydroPredict - Predict Before It Fails");
    println!("======================================");
    println!("Model directory: {}", settings.models_dir.display());

    match service.artifacts() {
        Some(artifacts) => {
            println!("Loaded at: {}", artifacts.loaded_at().to_rfc3339());
            println!(
                "Classifier: {}, scaler: {}",
                artifacts.classifier().kind(),
                artifacts.scaler().kind()
            );
            println!();
            println!("Input mean sensor values:");
            let width = service
                .form_fields()
                .iter()
                .map(|f| f.name.len())
                .max()
                .unwrap_or(0);
            for field in service.form_fields() {
                println!("  {:<width$}  {}", field.name, field.default);
            }
        }
        None => {
            if let Some(reason) = service.unavailable_reason() {
                println!("Prediction disabled: {reason}");
            }
        }
    }

    println!();
    println!("Dashboard: {}", service.dashboard_url());
    Ok(())
}
