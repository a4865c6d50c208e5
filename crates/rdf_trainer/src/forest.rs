//! Random decision forest trainer
//!
//! Trees are grown independently in parallel. Each tree draws its own
//! bootstrap sample and split-feature subsets from a seed derived from the
//! forest seed and its position, so a forest depends only on the data, the
//! parameters and the seed.

use rayon::prelude::*;
use rdf_core::{
    CategoryCounts, ForestParams, ForestTrainer, LabeledPoint, Partitioned, Predictor, RdfError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartBuilder, Tree, TreeConfig};
use crate::deterministic::{tree_seed, LcgRng};
use crate::errors::TrainerError;

/// Learning task a forest was trained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Classification { num_classes: usize },
    Regression,
}

/// Trained ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub task: Task,
    pub feature_count: usize,
    pub categorical_features_info: CategoryCounts,
    pub params: ForestParams,
    pub trees: Vec<Tree>,
}

impl RandomForestModel {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Deepest tree in the forest
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::depth).max().unwrap_or(0)
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(|t| t.nodes.len()).sum()
    }
}

impl Predictor for RandomForestModel {
    /// Majority vote (lowest class on ties) or mean of tree outputs
    fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        match self.task {
            Task::Classification { num_classes } => {
                let mut votes = vec![0usize; num_classes.max(1)];
                for tree in &self.trees {
                    let class = tree.predict(features) as usize;
                    if let Some(v) = votes.get_mut(class) {
                        *v += 1;
                    }
                }
                let mut best = 0usize;
                for (class, &count) in votes.iter().enumerate() {
                    if count > votes[best] {
                        best = class;
                    }
                }
                best as f64
            }
            Task::Regression => {
                let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
                sum / self.trees.len() as f64
            }
        }
    }
}

/// Reference in-process forest trainer
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomForestTrainer;

impl RandomForestTrainer {
    pub fn new() -> Self {
        Self
    }

    /// Train a forest on the given data
    pub fn train(
        &self,
        data: &Partitioned<LabeledPoint>,
        task: Task,
        categorical_features_info: &CategoryCounts,
        params: &ForestParams,
    ) -> Result<RandomForestModel, TrainerError> {
        let points: Vec<&LabeledPoint> = data.iter().collect();
        if points.is_empty() {
            return Err(TrainerError::Dataset("no training points".to_string()));
        }

        let feature_count = points[0].features.len();
        if let Some(bad) = points.iter().find(|p| p.features.len() != feature_count) {
            return Err(TrainerError::Dataset(format!(
                "expected {} features, found {}",
                feature_count,
                bad.features.len()
            )));
        }

        let num_classes = match task {
            Task::Classification { num_classes } => {
                if num_classes == 0 {
                    return Err(TrainerError::Training("num_classes must be >= 1".to_string()));
                }
                if let Some(bad) = points
                    .iter()
                    .find(|p| p.label < 0.0 || p.label.fract() != 0.0 || p.label >= num_classes as f64)
                {
                    return Err(TrainerError::Dataset(format!(
                        "label {} is not a class in 0..{}",
                        bad.label, num_classes
                    )));
                }
                Some(num_classes)
            }
            Task::Regression => None,
        };

        let classification = num_classes.is_some();
        let tree_config = TreeConfig {
            max_depth: params.max_depth as usize,
            max_split_candidates: params.max_split_candidates as usize,
            features_per_split: params.feature_subset_strategy.features_per_split(
                feature_count,
                params.num_trees,
                classification,
            ),
            impurity: params.impurity,
            num_classes,
        };
        info!(
            "Growing {} trees on {} points, {} of {} features per split",
            params.num_trees,
            points.len(),
            tree_config.features_per_split,
            feature_count
        );

        let builder = CartBuilder::new(&points, categorical_features_info, tree_config);
        let bootstrap = params.num_trees > 1;
        let trees: Vec<Tree> = (0..params.num_trees as usize)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = LcgRng::new(tree_seed(params.seed, tree_idx));
                let sample = if bootstrap {
                    rng.bootstrap(points.len())
                } else {
                    (0..points.len()).collect()
                };
                let tree = builder.build(&sample, &mut rng);
                debug!(
                    "Tree {}/{}: {} nodes, depth {}",
                    tree_idx + 1,
                    params.num_trees,
                    tree.nodes.len(),
                    tree.depth()
                );
                tree
            })
            .collect();

        Ok(RandomForestModel {
            task,
            feature_count,
            categorical_features_info: categorical_features_info.clone(),
            params: *params,
            trees,
        })
    }
}

impl ForestTrainer for RandomForestTrainer {
    type Model = RandomForestModel;

    fn train_classifier(
        &self,
        data: &Partitioned<LabeledPoint>,
        num_classes: usize,
        categorical_features_info: &CategoryCounts,
        params: &ForestParams,
    ) -> rdf_core::Result<RandomForestModel> {
        if data.is_empty() {
            return Err(RdfError::EmptyDataset);
        }
        self.train(
            data,
            Task::Classification { num_classes },
            categorical_features_info,
            params,
        )
        .map_err(RdfError::from)
    }

    fn train_regressor(
        &self,
        data: &Partitioned<LabeledPoint>,
        categorical_features_info: &CategoryCounts,
        params: &ForestParams,
    ) -> rdf_core::Result<RandomForestModel> {
        if data.is_empty() {
            return Err(RdfError::EmptyDataset);
        }
        self.train(data, Task::Regression, categorical_features_info, params)
            .map_err(RdfError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::{FeatureSubsetStrategy, Impurity};

    fn params(num_trees: u32, impurity: Impurity, seed: u64) -> ForestParams {
        ForestParams {
            num_trees,
            feature_subset_strategy: FeatureSubsetStrategy::Auto,
            impurity,
            max_depth: 4,
            max_split_candidates: 16,
            seed,
        }
    }

    // label is 1 only for large odd x
    fn step_data() -> Partitioned<LabeledPoint> {
        let points = (0..40)
            .map(|i| {
                let x = (i % 10) as f64;
                let c = (i % 2) as f64;
                LabeledPoint {
                    label: if x < 5.0 { 0.0 } else { c },
                    features: vec![x, c],
                }
            })
            .collect();
        Partitioned::from_vec(points, 3)
    }

    #[test]
    fn test_single_tree_fits_training_data() {
        let data = step_data();
        let info: CategoryCounts = [(1, 2)].into_iter().collect();
        let model = RandomForestTrainer::new()
            .train_classifier(&data, 2, &info, &params(1, Impurity::Gini, 7))
            .unwrap();

        assert_eq!(model.num_trees(), 1);
        assert!(model.max_depth() <= 4);
        for p in data.iter() {
            assert_eq!(model.predict(&p.features), p.label);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let data = step_data();
        let info = CategoryCounts::new();
        let trainer = RandomForestTrainer::new();
        let a = trainer.train_classifier(&data, 2, &info, &params(8, Impurity::Entropy, 11)).unwrap();
        let b = trainer.train_classifier(&data, 2, &info, &params(8, Impurity::Entropy, 11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_regression_forest_averages() {
        let points: Vec<LabeledPoint> = (0..30)
            .map(|i| LabeledPoint {
                label: if i < 15 { 1.0 } else { 5.0 },
                features: vec![i as f64],
            })
            .collect();
        let data = Partitioned::from_vec(points, 2);
        let model = RandomForestTrainer::new()
            .train_regressor(&data, &CategoryCounts::new(), &params(5, Impurity::Variance, 3))
            .unwrap();

        assert_eq!(model.task, Task::Regression);
        let low = model.predict(&[0.0]);
        let high = model.predict(&[29.0]);
        assert!(low < high);
        assert!((1.0..=5.0).contains(&low));
        assert!((1.0..=5.0).contains(&high));
    }

    #[test]
    fn test_label_out_of_range_rejected() {
        let data = Partitioned::from_vec(
            vec![LabeledPoint {
                label: 3.0,
                features: vec![1.0],
            }],
            1,
        );
        let result = RandomForestTrainer::new().train_classifier(
            &data,
            2,
            &CategoryCounts::new(),
            &params(1, Impurity::Gini, 1),
        );
        assert!(matches!(result, Err(RdfError::Training(_))));
    }

    #[test]
    fn test_empty_data_rejected() {
        let data: Partitioned<LabeledPoint> = Partitioned::from_vec(Vec::new(), 2);
        let result = RandomForestTrainer::new().train_regressor(
            &data,
            &CategoryCounts::new(),
            &params(1, Impurity::Variance, 1),
        );
        assert!(matches!(result, Err(RdfError::EmptyDataset)));
    }

    #[test]
    fn test_vote_ties_pick_lowest_class() {
        let leaf = |prediction: f64| Tree {
            nodes: vec![crate::cart::Node {
                split: None,
                left: 0,
                right: 0,
                prediction,
            }],
        };
        let model = RandomForestModel {
            task: Task::Classification { num_classes: 3 },
            feature_count: 1,
            categorical_features_info: CategoryCounts::new(),
            params: params(2, Impurity::Gini, 0),
            trees: vec![leaf(2.0), leaf(1.0)],
        };
        assert_eq!(model.predict(&[0.0]), 1.0);
    }
}
