//! Random decision forest update: parse, encode, train and evaluate
//!
//! One call to [`RdfUpdate::build_model`] is a single unit of work:
//! hyperparameters are checked, a seed is drawn, the records are scanned
//! once for distinct categorical values and a second time to encode them,
//! and the encoded examples are handed to the trainer. Any failure aborts
//! the whole invocation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RdfConfig;
use crate::dispatch::{ForestTrainer, TrainingDispatcher};
use crate::distinct::collect_distinct_values;
use crate::encoding::{CategoricalValueEncodings, CategoryCounts};
use crate::errors::{RdfError, Result};
use crate::evaluation::{accuracy, rmse, Predictor};
use crate::example::{LabeledPoint, RecordEncoder};
use crate::hyperparams::HyperParams;
use crate::parse::RecordParser;
use crate::partition::Partitioned;
use crate::schema::InputSchema;
use crate::seed::SeedSource;

/// A trained model together with the encodings it was trained under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedForest<M> {
    pub model: M,
    pub encodings: CategoricalValueEncodings,
    /// Levels per categorical column, keyed by column index
    pub category_counts: CategoryCounts,
    pub hyper_params: HyperParams,
    pub seed: u64,
}

/// Forest update stage bound to one schema and trainer
pub struct RdfUpdate<T> {
    num_trees: u32,
    hyper_params: Vec<HyperParams>,
    schema: InputSchema,
    parser: RecordParser,
    num_partitions: usize,
    trainer: T,
}

impl<T: ForestTrainer> RdfUpdate<T> {
    /// Validate the configuration and bind it to a trainer
    pub fn new(config: &RdfConfig, trainer: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            num_trees: config.num_trees,
            hyper_params: config.hyper_params()?,
            schema: config.schema()?,
            parser: RecordParser::new(config.delimiter_byte()?),
            num_partitions: config.partitions,
            trainer,
        })
    }

    /// Candidate hyperparameter sets in configuration order
    pub fn hyper_parameter_values(&self) -> &[HyperParams] {
        &self.hyper_params
    }

    pub fn schema(&self) -> &InputSchema {
        &self.schema
    }

    pub fn num_trees(&self) -> u32 {
        self.num_trees
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Shard raw lines the way this update is configured to
    pub fn partition_lines(&self, lines: Vec<String>) -> Partitioned<String> {
        Partitioned::from_vec(lines, self.num_partitions)
    }

    /// Split every non-blank line into fields
    pub fn parse_records(&self, lines: &Partitioned<String>) -> Result<Partitioned<Vec<String>>> {
        let parser = self.parser;
        let records = lines.try_map_partitions(|partition| {
            partition
                .iter()
                .filter(|line| !line.trim().is_empty())
                .map(|line| parser.parse_line(line))
                .collect()
        })?;
        let skipped = lines.len() - records.len();
        if skipped > 0 {
            debug!("Skipped {} blank lines", skipped);
        }
        Ok(records)
    }

    /// Train one forest over the raw training lines
    pub fn build_model(
        &self,
        train_data: &Partitioned<String>,
        hyper_params: &HyperParams,
        seeds: &SeedSource,
    ) -> Result<TrainedForest<T::Model>> {
        hyper_params.validate_for_task(self.schema.is_classification())?;
        let dispatcher = TrainingDispatcher::new(&self.schema, self.num_trees)?;
        let seed = seeds.next_seed();
        debug!("Drew training seed {}", seed);

        let records = self.parse_records(train_data)?;
        if records.is_empty() {
            return Err(RdfError::EmptyDataset);
        }
        info!(
            "Parsed {} records in {} partitions",
            records.len(),
            records.num_partitions()
        );

        let distinct = collect_distinct_values(&records, &self.schema)?;
        let encodings = CategoricalValueEncodings::build(distinct);
        let category_counts = encodings.category_counts();
        info!("Category counts by feature: {:?}", category_counts);

        let points = RecordEncoder::new(&self.schema, &encodings).encode_all(&records)?;
        drop(records);

        let model = dispatcher.dispatch(&self.trainer, &points, &encodings, hyper_params, seed)?;

        Ok(TrainedForest {
            model,
            encodings,
            category_counts,
            hyper_params: *hyper_params,
            seed,
        })
    }

    /// Encode held-out lines with the encodings a forest was trained under
    pub fn encode_test_data(
        &self,
        forest: &TrainedForest<T::Model>,
        test_data: &Partitioned<String>,
    ) -> Result<Partitioned<LabeledPoint>> {
        let records = self.parse_records(test_data)?;
        RecordEncoder::new(&self.schema, &forest.encodings).encode_all(&records)
    }
}

impl<T> RdfUpdate<T>
where
    T: ForestTrainer,
    T::Model: Predictor,
{
    /// Score a forest on held-out lines; higher is better
    ///
    /// Classification returns accuracy, regression the negated RMSE.
    pub fn evaluate(
        &self,
        forest: &TrainedForest<T::Model>,
        test_data: &Partitioned<String>,
    ) -> Result<f64> {
        let points = self.encode_test_data(forest, test_data)?;
        if self.schema.is_classification() {
            let accuracy = accuracy(&forest.model, &points)?;
            info!("Accuracy: {}", accuracy);
            Ok(accuracy)
        } else {
            let rmse = rmse(&forest.model, &points)?;
            info!("RMSE: {}", rmse);
            Ok(-rmse)
        }
    }
}
