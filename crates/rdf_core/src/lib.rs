//! Random decision forest update core
//!
//! Turns delimited records with mixed numeric and categorical columns into
//! numeric training examples and hands them to a tree-ensemble trainer.
//!
//! Modules:
//! - `schema`: Which columns are categorical and which is the target
//! - `hyperparams`: Per-invocation split candidates, depth and impurity
//! - `config`: File and environment configuration
//! - `parse`: Delimited and JSON-array line parsing
//! - `partition`: Partitioned collection with parallel map and merge
//! - `distinct`: Distinct categorical value discovery
//! - `encoding`: Ordinal value encodings and category counts
//! - `example`: Record encoding into labeled points
//! - `seed`: Shared seed source
//! - `dispatch`: Classification/regression selection and trainer interface
//! - `evaluation`: Accuracy and RMSE on held-out data
//! - `update`: The end-to-end update stage

pub mod config;
pub mod dispatch;
pub mod distinct;
pub mod encoding;
pub mod errors;
pub mod evaluation;
pub mod example;
pub mod hyperparams;
pub mod parse;
pub mod partition;
pub mod schema;
pub mod seed;
pub mod update;

pub use config::RdfConfig;
pub use dispatch::{FeatureSubsetStrategy, ForestParams, ForestTrainer, TrainingDispatcher};
pub use distinct::{collect_distinct_values, merge_distinct, DistinctValues};
pub use encoding::{CategoricalValueEncodings, CategoryCounts, ValueEncoding};
pub use errors::{ErrorKind, RdfError, Result};
pub use evaluation::Predictor;
pub use example::{LabeledPoint, RecordEncoder};
pub use hyperparams::{HyperParamSet, HyperParamValue, HyperParams, Impurity};
pub use parse::RecordParser;
pub use partition::Partitioned;
pub use schema::{InputSchema, SchemaConfig};
pub use seed::SeedSource;
pub use update::{RdfUpdate, TrainedForest};
