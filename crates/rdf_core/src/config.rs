//! Forest update configuration
//!
//! Loaded from an optional TOML file layered with `RDF__*` environment
//! overrides, then validated before any data is touched.

use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::errors::{RdfError, Result};
use crate::hyperparams::{HyperParamSet, HyperParams};
use crate::schema::{InputSchema, SchemaConfig};

/// Top-level configuration for a forest update run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RdfConfig {
    /// Trees per forest, fixed across all candidates of a run
    pub num_trees: u32,
    /// Candidate hyperparameter sets, in evaluation order
    pub hyperparams: Vec<HyperParamSet>,
    /// Column layout of the input
    pub input_schema: SchemaConfig,
    /// Number of shards the input is split into
    #[serde(default = "default_partitions")]
    pub partitions: usize,
    /// Field delimiter for non-JSON lines
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Fixed seed for reproducible runs; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_partitions() -> usize {
    4
}

fn default_delimiter() -> char {
    ','
}

impl RdfConfig {
    /// Load configuration from an optional file plus `RDF__` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(RdfError::Config(format!(
                    "configuration file {} not found",
                    path.display()
                )));
            }
            info!("Loading configuration from: {}", path.display());
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("RDF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: RdfConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RdfConfig = Config::builder()
            .add_source(ConfigFile::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the input schema
    pub fn schema(&self) -> Result<InputSchema> {
        InputSchema::from_config(&self.input_schema)
    }

    /// Resolve every candidate, named or positional, in configuration order
    pub fn hyper_params(&self) -> Result<Vec<HyperParams>> {
        self.hyperparams.iter().map(HyperParamSet::resolve).collect()
    }

    /// Reject every configuration error up front
    pub fn validate(&self) -> Result<()> {
        if self.num_trees < 1 {
            return Err(RdfError::Config("num_trees must be >= 1".to_string()));
        }
        if self.partitions < 1 {
            return Err(RdfError::Config("partitions must be >= 1".to_string()));
        }
        if self.hyperparams.is_empty() {
            return Err(RdfError::Config(
                "at least one hyperparams candidate is required".to_string(),
            ));
        }
        self.delimiter_byte()?;

        let schema = self.schema()?;
        for params in self.hyper_params()? {
            params.validate_for_task(schema.is_classification())?;
        }
        Ok(())
    }

    /// The delimiter as the single byte the record reader splits on
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter == '"' {
            return Err(RdfError::Config(
                "delimiter cannot be the quote character".to_string(),
            ));
        }
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                RdfError::Config(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }
}
