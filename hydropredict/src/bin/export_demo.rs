//! Write the bundled demo artifacts so the other binaries can run without
//! the training pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hydropredict::demo::write_demo_artifacts;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output directory for the artifact files
    #[arg(long, default_value = "models")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    write_demo_artifacts(&args.out)
        .with_context(|| format!("writing demo artifacts to {}", args.out.display()))?;
    println!("Saved demo artifacts to {:?}", args.out);
    Ok(())
}
