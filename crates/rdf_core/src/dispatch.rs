//! Chooses between forest classification and regression and invokes the trainer

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encoding::{CategoricalValueEncodings, CategoryCounts};
use crate::errors::{RdfError, Result};
use crate::example::LabeledPoint;
use crate::hyperparams::{HyperParams, Impurity};
use crate::partition::Partitioned;
use crate::schema::InputSchema;

/// How many features are considered at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSubsetStrategy {
    /// All features for a single tree, otherwise sqrt (classification) or one third (regression)
    Auto,
    All,
    Sqrt,
    OneThird,
}

impl FeatureSubsetStrategy {
    /// Number of features sampled per split, never below one
    pub fn features_per_split(&self, num_features: usize, num_trees: u32, classification: bool) -> usize {
        let strategy = match self {
            FeatureSubsetStrategy::Auto if num_trees == 1 => FeatureSubsetStrategy::All,
            FeatureSubsetStrategy::Auto if classification => FeatureSubsetStrategy::Sqrt,
            FeatureSubsetStrategy::Auto => FeatureSubsetStrategy::OneThird,
            other => *other,
        };
        let count = match strategy {
            FeatureSubsetStrategy::Sqrt => (num_features as f64).sqrt().ceil() as usize,
            FeatureSubsetStrategy::OneThird => (num_features as f64 / 3.0).ceil() as usize,
            _ => num_features,
        };
        count.clamp(1, num_features.max(1))
    }
}

/// Everything the forest trainer needs besides the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub num_trees: u32,
    pub feature_subset_strategy: FeatureSubsetStrategy,
    pub impurity: Impurity,
    pub max_depth: u32,
    pub max_split_candidates: u32,
    pub seed: u64,
}

/// Tree-ensemble trainer consumed as a black box
///
/// `categorical_features_info` maps feature-vector slots to their number of
/// levels; slots not listed are continuous.
pub trait ForestTrainer: Sync {
    type Model;

    fn train_classifier(
        &self,
        data: &Partitioned<LabeledPoint>,
        num_classes: usize,
        categorical_features_info: &CategoryCounts,
        params: &ForestParams,
    ) -> Result<Self::Model>;

    fn train_regressor(
        &self,
        data: &Partitioned<LabeledPoint>,
        categorical_features_info: &CategoryCounts,
        params: &ForestParams,
    ) -> Result<Self::Model>;
}

/// Routes encoded examples to the classifier or regressor entry point
#[derive(Debug, Clone, Copy)]
pub struct TrainingDispatcher<'a> {
    schema: &'a InputSchema,
    num_trees: u32,
}

impl<'a> TrainingDispatcher<'a> {
    pub fn new(schema: &'a InputSchema, num_trees: u32) -> Result<Self> {
        if num_trees < 1 {
            return Err(RdfError::Config("num_trees must be >= 1".to_string()));
        }
        Ok(Self { schema, num_trees })
    }

    pub fn num_trees(&self) -> u32 {
        self.num_trees
    }

    /// Train one forest with the given hyperparameters and seed
    pub fn dispatch<T: ForestTrainer>(
        &self,
        trainer: &T,
        data: &Partitioned<LabeledPoint>,
        encodings: &CategoricalValueEncodings,
        hyper_params: &HyperParams,
        seed: u64,
    ) -> Result<T::Model> {
        hyper_params.validate()?;

        let categorical_features_info = encodings.categorical_features_info(self.schema);
        let params = ForestParams {
            num_trees: self.num_trees,
            feature_subset_strategy: FeatureSubsetStrategy::Auto,
            impurity: hyper_params.impurity,
            max_depth: hyper_params.max_depth,
            max_split_candidates: hyper_params.max_split_candidates,
            seed,
        };

        if self.schema.is_classification() {
            let target_index = self.schema.target_index();
            let num_classes = encodings
                .target_class_count(self.schema)
                .ok_or(RdfError::MissingTargetEncoding(target_index))?;
            info!(
                "Training classification forest: {} classes, {} trees, impurity {}, depth {}, {} split candidates",
                num_classes, params.num_trees, params.impurity, params.max_depth, params.max_split_candidates
            );
            trainer.train_classifier(data, num_classes, &categorical_features_info, &params)
        } else {
            info!(
                "Training regression forest: {} trees, impurity {}, depth {}, {} split candidates",
                params.num_trees, params.impurity, params.max_depth, params.max_split_candidates
            );
            trainer.train_regressor(data, &categorical_features_info, &params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distinct::DistinctValues;
    use parking_lot::Mutex;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Classifier { num_classes: usize, info: CategoryCounts, params: ForestParams },
        Regressor { info: CategoryCounts, params: ForestParams },
    }

    #[derive(Default)]
    struct RecordingTrainer {
        calls: Mutex<Vec<Call>>,
    }

    impl ForestTrainer for RecordingTrainer {
        type Model = usize;

        fn train_classifier(
            &self,
            data: &Partitioned<LabeledPoint>,
            num_classes: usize,
            categorical_features_info: &CategoryCounts,
            params: &ForestParams,
        ) -> Result<usize> {
            self.calls.lock().push(Call::Classifier {
                num_classes,
                info: categorical_features_info.clone(),
                params: *params,
            });
            Ok(data.len())
        }

        fn train_regressor(
            &self,
            data: &Partitioned<LabeledPoint>,
            categorical_features_info: &CategoryCounts,
            params: &ForestParams,
        ) -> Result<usize> {
            self.calls.lock().push(Call::Regressor {
                info: categorical_features_info.clone(),
                params: *params,
            });
            Ok(data.len())
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn encodings(columns: &[(usize, &[&str])]) -> CategoricalValueEncodings {
        let distinct: DistinctValues = columns
            .iter()
            .map(|(index, values)| (*index, names(values).into_iter().collect::<BTreeSet<_>>()))
            .collect();
        CategoricalValueEncodings::build(distinct)
    }

    fn data() -> Partitioned<LabeledPoint> {
        Partitioned::from_vec(
            vec![
                LabeledPoint { label: 0.0, features: vec![1.0, 2.0] },
                LabeledPoint { label: 1.0, features: vec![0.0, 3.0] },
            ],
            2,
        )
    }

    #[test]
    fn test_classification_dispatch() {
        let schema = InputSchema::new(
            names(&["color", "x", "label"]),
            [0, 2].into_iter().collect(),
            2,
        )
        .unwrap();
        let encodings = encodings(&[(0, &["red", "blue", "green"]), (2, &["yes", "no"])]);
        let hyper = HyperParams { max_split_candidates: 8, max_depth: 5, impurity: Impurity::Gini };
        let trainer = RecordingTrainer::default();

        let dispatcher = TrainingDispatcher::new(&schema, 20).unwrap();
        let model = dispatcher.dispatch(&trainer, &data(), &encodings, &hyper, 99).unwrap();
        assert_eq!(model, 2);

        let calls = trainer.calls.lock();
        assert_eq!(
            calls[..],
            [Call::Classifier {
                num_classes: 2,
                info: [(0, 3)].into_iter().collect(),
                params: ForestParams {
                    num_trees: 20,
                    feature_subset_strategy: FeatureSubsetStrategy::Auto,
                    impurity: Impurity::Gini,
                    max_depth: 5,
                    max_split_candidates: 8,
                    seed: 99,
                },
            }]
        );
    }

    #[test]
    fn test_regression_dispatch() {
        let schema = InputSchema::new(
            names(&["y", "color", "x"]),
            [1].into_iter().collect(),
            0,
        )
        .unwrap();
        let encodings = encodings(&[(1, &["red", "blue"])]);
        let hyper = HyperParams { max_split_candidates: 4, max_depth: 3, impurity: Impurity::Variance };
        let trainer = RecordingTrainer::default();

        let dispatcher = TrainingDispatcher::new(&schema, 1).unwrap();
        dispatcher.dispatch(&trainer, &data(), &encodings, &hyper, 5).unwrap();

        let calls = trainer.calls.lock();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Regressor { info, params } => {
                // column 1 lands in slot 0 once the target is removed
                assert_eq!(info, &[(0, 2)].into_iter().collect::<CategoryCounts>());
                assert_eq!(params.seed, 5);
            }
            other => panic!("expected regressor call, got {:?}", other),
        }
    }

    #[test]
    fn test_classification_without_target_encoding() {
        let schema = InputSchema::new(names(&["x", "label"]), [1].into_iter().collect(), 1).unwrap();
        let hyper = HyperParams { max_split_candidates: 4, max_depth: 3, impurity: Impurity::Gini };
        let trainer = RecordingTrainer::default();

        let dispatcher = TrainingDispatcher::new(&schema, 3).unwrap();
        let result = dispatcher.dispatch(
            &trainer,
            &data(),
            &CategoricalValueEncodings::default(),
            &hyper,
            1,
        );
        assert!(matches!(result, Err(RdfError::MissingTargetEncoding(1))));
        assert!(trainer.calls.lock().is_empty());
    }

    #[test]
    fn test_zero_trees_rejected() {
        let schema = InputSchema::new(names(&["x", "y"]), BTreeSet::new(), 1).unwrap();
        assert!(TrainingDispatcher::new(&schema, 0).is_err());
    }

    #[test]
    fn test_invalid_hyper_params_rejected() {
        let schema = InputSchema::new(names(&["x", "y"]), BTreeSet::new(), 1).unwrap();
        let hyper = HyperParams { max_split_candidates: 0, max_depth: 3, impurity: Impurity::Variance };
        let trainer = RecordingTrainer::default();

        let dispatcher = TrainingDispatcher::new(&schema, 3).unwrap();
        let result = dispatcher.dispatch(
            &trainer,
            &data(),
            &CategoricalValueEncodings::default(),
            &hyper,
            1,
        );
        assert!(matches!(result, Err(RdfError::Config(_))));
        assert!(trainer.calls.lock().is_empty());
    }

    #[test]
    fn test_auto_feature_subset() {
        let auto = FeatureSubsetStrategy::Auto;
        assert_eq!(auto.features_per_split(9, 1, true), 9);
        assert_eq!(auto.features_per_split(9, 10, true), 3);
        assert_eq!(auto.features_per_split(10, 10, true), 4);
        assert_eq!(auto.features_per_split(9, 10, false), 3);
        assert_eq!(auto.features_per_split(1, 10, false), 1);
        assert_eq!(FeatureSubsetStrategy::All.features_per_split(5, 10, true), 5);
    }
}
