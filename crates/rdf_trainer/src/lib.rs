//! RDF Trainer - Deterministic random decision forest trainer
//!
//! Provides an in-process implementation of the forest trainer interface
//! from `rdf-core`, plus the model artifact format written by `rdf-train`.

pub mod artifact;
pub mod canonical;
pub mod cart;
pub mod deterministic;
pub mod errors;
pub mod forest;

pub use artifact::{ArtifactMetadata, ModelArtifact, HASH_FILE, MODEL_FILE};
pub use cart::{Node, Split, Tree};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use forest::{RandomForestModel, RandomForestTrainer, Task};

use rdf_core::{Partitioned, RdfError, RdfUpdate, SeedSource, TrainedForest};
use tracing::info;

/// Train the configured hyperparameter candidates and keep the best one.
///
/// With held-out data every candidate is trained and scored and the highest
/// score wins (earlier candidates win ties). Without it only the first
/// candidate is trained.
pub fn train_best_candidate(
    update: &RdfUpdate<RandomForestTrainer>,
    train_data: &Partitioned<String>,
    test_data: Option<&Partitioned<String>>,
    seeds: &SeedSource,
) -> rdf_core::Result<(TrainedForest<RandomForestModel>, Option<f64>)> {
    let candidates = update.hyper_parameter_values();
    let mut best: Option<(TrainedForest<RandomForestModel>, Option<f64>)> = None;

    for (idx, hyper_params) in candidates.iter().enumerate() {
        info!(
            "Candidate {}/{}: max_split_candidates={}, max_depth={}, impurity={}",
            idx + 1,
            candidates.len(),
            hyper_params.max_split_candidates,
            hyper_params.max_depth,
            hyper_params.impurity
        );
        let forest = update.build_model(train_data, hyper_params, seeds)?;

        let Some(test_data) = test_data else {
            return Ok((forest, None));
        };
        let score = update.evaluate(&forest, test_data)?;
        let improved = match &best {
            Some((_, Some(current))) => score > *current,
            _ => true,
        };
        if improved {
            best = Some((forest, Some(score)));
        }
    }

    best.ok_or_else(|| RdfError::Config("no hyperparameter candidates configured".to_string()))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
