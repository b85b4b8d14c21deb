//! Training flow: fit the heart disease classifier and write the artifact.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train_model -- --dataset heart.csv --out models
//! ```
//!
//! The artifact is written unsigned; run `sign_model` afterwards to produce
//! `manifest.json` and `model.sig`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use heartrisk::adapters::artifact::{JsonModelStore, SignaturePolicy};
use heartrisk::adapters::dataset::load_dataset;
use heartrisk::adapters::forest::{ForestParams, DEFAULT_N_ESTIMATORS, DEFAULT_SEED};
use heartrisk::application::TrainingService;
use heartrisk::logging::{self, LogSink};

#[derive(Parser)]
#[command(name = "train_model")]
#[command(about = "Fit the heart disease classifier on a labelled CSV", long_about = None)]
struct Cli {
    /// Training CSV with the 13 feature columns and a `target` column
    #[arg(short, long, default_value = "heart.csv")]
    dataset: PathBuf,

    /// Directory receiving heart_model.json
    #[arg(short, long, env = "HEARTRISK_MODEL_PATH", default_value = "models")]
    out: PathBuf,

    /// Number of trees in the ensemble
    #[arg(short, long, default_value_t = DEFAULT_N_ESTIMATORS)]
    n_estimators: usize,

    /// Seed for bootstrap sampling
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Depth limit per tree (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<u16>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(LogSink::Stderr)?;

    let dataset = load_dataset(&cli.dataset)
        .with_context(|| format!("Failed to load dataset {:?}", cli.dataset))?;

    let params = ForestParams {
        n_estimators: cli.n_estimators,
        seed: cli.seed,
        max_depth: cli.max_depth,
    };
    // The policy only affects loading; training always writes.
    let store = JsonModelStore::new(&cli.out, SignaturePolicy::Required);
    let report = TrainingService::new(params, store)
        .train(&dataset)
        .context("Training failed")?;

    println!(
        "Trained on {} samples (classes {:?})",
        report.n_samples, report.classes
    );
    println!("Wrote model: {:?}", report.artifact_path);
    if report.classes.len() < 2 {
        eprintln!("WARNING: dataset holds a single label value; predictions will not be meaningful");
    }
    Ok(())
}
