//! On-disk model artifact
//!
//! A trained forest is written as canonical JSON (`model.json`) next to the
//! hex BLAKE3 digest of that file (`model.hash`).

use rdf_core::{InputSchema, TrainedForest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::canonical::{blake3_hex, canonical_json_string};
use crate::errors::TrainerError;
use crate::forest::{RandomForestModel, Task};

pub const MODEL_FILE: &str = "model.json";
pub const HASH_FILE: &str = "model.hash";

/// Descriptive fields stored alongside the forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub version: String,
    pub created_at: u64,
    pub feature_names: Vec<String>,
    pub target_feature: String,
    pub task: Task,
    pub tree_count: usize,
    pub max_depth: usize,
    pub total_nodes: usize,
    /// BLAKE3 of the canonical JSON of `forest`
    pub model_hash: String,
    /// Accuracy, or negated RMSE, on held-out data
    pub evaluation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ArtifactMetadata,
    pub forest: TrainedForest<RandomForestModel>,
}

impl ModelArtifact {
    pub fn new(
        forest: TrainedForest<RandomForestModel>,
        schema: &InputSchema,
        evaluation: Option<f64>,
    ) -> Result<Self, TrainerError> {
        let names = schema.feature_names();
        let target_feature = names
            .get(schema.target_index())
            .cloned()
            .ok_or_else(|| TrainerError::Dataset("target index outside schema".to_string()))?;

        let metadata = ArtifactMetadata {
            version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().timestamp() as u64,
            feature_names: names.to_vec(),
            target_feature,
            task: forest.model.task,
            tree_count: forest.model.num_trees(),
            max_depth: forest.model.max_depth(),
            total_nodes: forest.model.total_nodes(),
            model_hash: blake3_hex(&canonical_json_string(&forest)?),
            evaluation,
        };
        Ok(Self { metadata, forest })
    }

    /// Write `model.json` and `model.hash` into `dir`, returning the model path and file hash
    pub fn write(&self, dir: &Path) -> Result<(PathBuf, String), TrainerError> {
        fs::create_dir_all(dir)?;

        let canonical_json = canonical_json_string(self)?;
        let model_path = dir.join(MODEL_FILE);
        fs::write(&model_path, &canonical_json)?;

        let hash_hex = blake3_hex(&canonical_json);
        fs::write(dir.join(HASH_FILE), &hash_hex)?;

        Ok((model_path, hash_hex))
    }

    /// Load an artifact, rejecting it when the stored hash does not match
    pub fn read(dir: &Path) -> Result<Self, TrainerError> {
        let content = fs::read_to_string(dir.join(MODEL_FILE))?;
        let expected = fs::read_to_string(dir.join(HASH_FILE))?;
        let actual = blake3_hex(&content);
        if expected.trim() != actual {
            return Err(TrainerError::Dataset(format!(
                "model hash mismatch: expected {}, computed {}",
                expected.trim(),
                actual
            )));
        }
        Ok(serde_json::from_str(&content)?)
    }
}
