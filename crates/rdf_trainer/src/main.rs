//! RDF Trainer CLI
//!
//! Trains a random decision forest over delimited records and writes a
//! reproducible model artifact.

use anyhow::{Context, Result};
use clap::Parser;
use rdf_core::{RdfConfig, RdfUpdate, SeedSource};
use rdf_trainer::{train_best_candidate, ModelArtifact, RandomForestTrainer};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "rdf-train")]
#[command(author = "RDF Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random decision forest trainer for categorical and numeric records", long_about = None)]
struct Args {
    /// TOML configuration file (RDF__* environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Training data, one record per line
    #[arg(short, long)]
    input: PathBuf,

    /// Held-out data used to pick among hyperparameter candidates
    #[arg(short, long)]
    test: Option<PathBuf>,

    /// Output directory for model and hash
    #[arg(short, long, default_value = "models/rdf")]
    output: PathBuf,

    /// Seed overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("RDF Forest Trainer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = RdfConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    info!("Training configuration:");
    info!("  Trees: {}", config.num_trees);
    info!("  Candidates: {}", config.hyperparams.len());
    info!("  Partitions: {}", config.partitions);
    match config.seed {
        Some(seed) => info!("  Seed: {}", seed),
        None => info!("  Seed: from entropy"),
    }

    let update = RdfUpdate::new(&config, RandomForestTrainer::new())
        .context("Invalid configuration")?;
    let seeds = SeedSource::from_config(config.seed);

    info!("Loading training data from: {}", args.input.display());
    let train_data = update.partition_lines(read_lines(&args.input)?);

    let test_data = match &args.test {
        Some(path) => {
            info!("Loading held-out data from: {}", path.display());
            Some(update.partition_lines(read_lines(path)?))
        }
        None => None,
    };

    let (forest, score) = train_best_candidate(&update, &train_data, test_data.as_ref(), &seeds)
        .context("Training failed")?;

    info!("Training complete!");
    info!("  Trees: {}", forest.model.num_trees());
    info!("  Max depth reached: {}", forest.model.max_depth());
    info!("  Seed: {}", forest.seed);
    if let Some(score) = score {
        info!("  Held-out score: {}", score);
    }

    let artifact = ModelArtifact::new(forest, update.schema(), score)
        .context("Failed to build model artifact")?;
    info!("  Model hash: {}", artifact.metadata.model_hash);

    let (model_path, hash_hex) = artifact
        .write(&args.output)
        .context("Failed to write model artifact")?;

    info!("✓ Training completed successfully");
    info!("  Model: {}", model_path.display());
    info!("  Hash: {}", hash_hex);

    Ok(())
}
