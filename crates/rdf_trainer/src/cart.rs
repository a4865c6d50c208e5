//! CART (Classification and Regression Tree) builder
//!
//! Greedy decision tree construction over encoded labeled points. Continuous
//! features split on `value <= threshold`, categorical features split one
//! category against the rest.

use rdf_core::{CategoryCounts, Impurity, LabeledPoint};
use serde::{Deserialize, Serialize};

use crate::deterministic::{LcgRng, SplitTieBreaker};

/// Gains at or below this are treated as no improvement
const MIN_GAIN: f64 = 1e-12;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub max_split_candidates: usize,
    pub features_per_split: usize,
    pub impurity: Impurity,
    /// `Some` for classification
    pub num_classes: Option<usize>,
}

/// How a decision node routes a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Split {
    Continuous { feature: usize, threshold: f64 },
    Categorical { feature: usize, category: f64 },
}

impl Split {
    pub fn feature(&self) -> usize {
        match self {
            Split::Continuous { feature, .. } | Split::Categorical { feature, .. } => *feature,
        }
    }

    pub fn goes_left(&self, features: &[f64]) -> bool {
        match self {
            Split::Continuous { feature, threshold } => features[*feature] <= *threshold,
            Split::Categorical { feature, category } => features[*feature] == *category,
        }
    }
}

/// Tree node; leaves carry no split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub split: Option<Split>,
    pub left: u32,
    pub right: u32,
    /// Majority class or mean label of the training points reaching this node
    pub prediction: f64,
}

/// Flat-array decision tree rooted at node 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        while let Some(node) = self.nodes.get(idx) {
            match &node.split {
                None => return node.prediction,
                Some(split) => {
                    idx = if split.goes_left(features) {
                        node.left as usize
                    } else {
                        node.right as usize
                    };
                }
            }
        }
        0.0
    }

    /// Longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx).and_then(|n| n.split.as_ref().map(|_| n)) {
                Some(node) => 1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize)),
                None => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Label statistics of a set of points
#[derive(Clone, Debug)]
enum LabelStats {
    Classes(Vec<f64>),
    Moments { count: f64, sum: f64, sum_sq: f64 },
}

impl LabelStats {
    fn empty(num_classes: Option<usize>) -> Self {
        match num_classes {
            Some(n) => LabelStats::Classes(vec![0.0; n]),
            None => LabelStats::Moments {
                count: 0.0,
                sum: 0.0,
                sum_sq: 0.0,
            },
        }
    }

    fn add(&mut self, label: f64) {
        match self {
            LabelStats::Classes(counts) => {
                if let Some(c) = counts.get_mut(label as usize) {
                    *c += 1.0;
                }
            }
            LabelStats::Moments { count, sum, sum_sq } => {
                *count += 1.0;
                *sum += label;
                *sum_sq += label * label;
            }
        }
    }

    fn count(&self) -> f64 {
        match self {
            LabelStats::Classes(counts) => counts.iter().sum(),
            LabelStats::Moments { count, .. } => *count,
        }
    }

    fn impurity(&self, impurity: Impurity) -> f64 {
        let total = self.count();
        if total == 0.0 {
            return 0.0;
        }
        match (self, impurity) {
            (LabelStats::Classes(counts), Impurity::Entropy) => counts
                .iter()
                .filter(|&&c| c > 0.0)
                .map(|&c| {
                    let p = c / total;
                    -p * p.log2()
                })
                .sum(),
            (LabelStats::Classes(counts), _) => {
                1.0 - counts.iter().map(|&c| (c / total) * (c / total)).sum::<f64>()
            }
            (LabelStats::Moments { sum, sum_sq, .. }, _) => {
                let mean = sum / total;
                (sum_sq / total - mean * mean).max(0.0)
            }
        }
    }

    /// Majority class (lowest on ties) or mean
    fn prediction(&self) -> f64 {
        match self {
            LabelStats::Classes(counts) => {
                let mut best = 0usize;
                for (class, &c) in counts.iter().enumerate() {
                    if c > counts[best] {
                        best = class;
                    }
                }
                best as f64
            }
            LabelStats::Moments { count, sum, .. } => {
                if *count == 0.0 {
                    0.0
                } else {
                    sum / count
                }
            }
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    split: Split,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

/// Build one decision tree over a sample of points
pub struct CartBuilder<'a> {
    config: TreeConfig,
    points: &'a [&'a LabeledPoint],
    categorical_features_info: &'a CategoryCounts,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        points: &'a [&'a LabeledPoint],
        categorical_features_info: &'a CategoryCounts,
        config: TreeConfig,
    ) -> Self {
        let feature_count = points.first().map(|p| p.features.len()).unwrap_or(0);
        Self {
            config,
            points,
            categorical_features_info,
            feature_count,
        }
    }

    /// Build a tree from the given point indices (duplicates allowed)
    pub fn build(&self, sample: &[usize], rng: &mut LcgRng) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(sample, 0, &mut nodes, rng);
        Tree { nodes }
    }

    fn stats(&self, indices: &[usize]) -> LabelStats {
        let mut stats = LabelStats::empty(self.config.num_classes);
        for &idx in indices {
            stats.add(self.points[idx].label);
        }
        stats
    }

    /// Recursively build tree nodes
    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut LcgRng,
    ) -> u32 {
        let current_idx = nodes.len() as u32;
        let stats = self.stats(indices);
        let prediction = stats.prediction();
        let parent_impurity = stats.impurity(self.config.impurity);

        let leaf = Node {
            split: None,
            left: 0,
            right: 0,
            prediction,
        };

        if depth >= self.config.max_depth || indices.len() < 2 || parent_impurity <= MIN_GAIN {
            nodes.push(leaf);
            return current_idx;
        }

        let candidate = match self.find_best_split(indices, parent_impurity, rng) {
            Some(c) => c,
            None => {
                nodes.push(leaf);
                return current_idx;
            }
        };

        let (left_indices, right_indices) = self.split_samples(indices, &candidate.split);

        // Reserve space for current node
        nodes.push(Node {
            split: Some(candidate.split),
            left: 0,
            right: 0,
            prediction,
        });

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, rng);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Best impurity-reducing split among a random subset of features
    fn find_best_split(
        &self,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let features = rng.sample_without_replacement(self.feature_count, self.config.features_per_split);
        let total = indices.len() as f64;
        let mut best_split: Option<SplitCandidate> = None;

        for feature_idx in features {
            for (candidate_idx, split) in self.candidate_splits(indices, feature_idx).into_iter().enumerate() {
                let (left_indices, right_indices) = self.split_samples(indices, &split);
                if left_indices.is_empty() || right_indices.is_empty() {
                    continue;
                }

                let left_impurity = self.stats(&left_indices).impurity(self.config.impurity);
                let right_impurity = self.stats(&right_indices).impurity(self.config.impurity);
                let gain = parent_impurity
                    - (left_indices.len() as f64 / total) * left_impurity
                    - (right_indices.len() as f64 / total) * right_impurity;
                if gain <= MIN_GAIN {
                    continue;
                }

                let candidate = SplitCandidate {
                    split,
                    gain,
                    tie_breaker: SplitTieBreaker::new(feature_idx, candidate_idx),
                };

                best_split = match best_split {
                    None => Some(candidate),
                    Some(current) => {
                        // Deterministic tie-breaking
                        if gain > current.gain
                            || (gain == current.gain && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }

        best_split
    }

    /// Splits worth evaluating for one feature at this node
    fn candidate_splits(&self, indices: &[usize], feature_idx: usize) -> Vec<Split> {
        let mut values: Vec<f64> = indices
            .iter()
            .map(|&idx| self.points[idx].features[feature_idx])
            .filter(|v| !v.is_nan())
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        if values.len() < 2 {
            return Vec::new();
        }

        if self.categorical_features_info.contains_key(&feature_idx) {
            return values
                .into_iter()
                .map(|category| Split::Categorical {
                    feature: feature_idx,
                    category,
                })
                .collect();
        }

        // The largest value would send everything left
        values.pop();
        quantile_thresholds(&values, self.config.max_split_candidates.saturating_sub(1).max(1))
            .into_iter()
            .map(|threshold| Split::Continuous {
                feature: feature_idx,
                threshold,
            })
            .collect()
    }

    /// Split samples based on a split rule
    fn split_samples(&self, indices: &[usize], split: &Split) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .partition(|&&idx| split.goes_left(&self.points[idx].features))
    }
}

/// At most `limit` evenly spaced values from an ascending, deduplicated list
fn quantile_thresholds(sorted: &[f64], limit: usize) -> Vec<f64> {
    if sorted.len() <= limit {
        return sorted.to_vec();
    }
    let mut picked: Vec<f64> = (0..limit)
        .map(|j| sorted[(j * sorted.len()) / limit])
        .collect();
    picked.dedup();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: f64, features: &[f64]) -> LabeledPoint {
        LabeledPoint {
            label,
            features: features.to_vec(),
        }
    }

    fn config(impurity: Impurity, num_classes: Option<usize>, max_depth: usize) -> TreeConfig {
        TreeConfig {
            max_depth,
            max_split_candidates: 32,
            features_per_split: 2,
            impurity,
            num_classes,
        }
    }

    #[test]
    fn test_classification_tree_separates_classes() {
        let points = vec![
            point(0.0, &[1.0, 0.0]),
            point(0.0, &[2.0, 1.0]),
            point(1.0, &[8.0, 0.0]),
            point(1.0, &[9.0, 1.0]),
        ];
        let refs: Vec<&LabeledPoint> = points.iter().collect();
        let info = CategoryCounts::new();
        let builder = CartBuilder::new(&refs, &info, config(Impurity::Gini, Some(2), 3));
        let tree = builder.build(&[0, 1, 2, 3], &mut LcgRng::new(1));

        assert_eq!(tree.depth(), 1);
        assert_eq!(
            tree.nodes[0].split,
            Some(Split::Continuous {
                feature: 0,
                threshold: 2.0
            })
        );
        for p in &points {
            assert_eq!(tree.predict(&p.features), p.label);
        }
    }

    #[test]
    fn test_categorical_split_is_one_vs_rest() {
        let points = vec![
            point(1.0, &[0.0]),
            point(1.0, &[0.0]),
            point(0.0, &[1.0]),
            point(0.0, &[2.0]),
        ];
        let refs: Vec<&LabeledPoint> = points.iter().collect();
        let info: CategoryCounts = [(0, 3)].into_iter().collect();
        let mut cfg = config(Impurity::Entropy, Some(2), 2);
        cfg.features_per_split = 1;
        let tree = CartBuilder::new(&refs, &info, cfg).build(&[0, 1, 2, 3], &mut LcgRng::new(9));

        assert_eq!(
            tree.nodes[0].split,
            Some(Split::Categorical {
                feature: 0,
                category: 0.0
            })
        );
        assert_eq!(tree.predict(&[0.0]), 1.0);
        assert_eq!(tree.predict(&[2.0]), 0.0);
    }

    #[test]
    fn test_regression_tree_predicts_means() {
        let points = vec![
            point(1.0, &[1.0]),
            point(3.0, &[2.0]),
            point(10.0, &[10.0]),
            point(12.0, &[11.0]),
        ];
        let refs: Vec<&LabeledPoint> = points.iter().collect();
        let info = CategoryCounts::new();
        let mut cfg = config(Impurity::Variance, None, 1);
        cfg.features_per_split = 1;
        let tree = CartBuilder::new(&refs, &info, cfg).build(&[0, 1, 2, 3], &mut LcgRng::new(2));

        assert_eq!(tree.predict(&[1.5]), 2.0);
        assert_eq!(tree.predict(&[10.5]), 11.0);
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let points = vec![point(0.0, &[1.0]), point(1.0, &[2.0]), point(1.0, &[3.0])];
        let refs: Vec<&LabeledPoint> = points.iter().collect();
        let info = CategoryCounts::new();
        let tree = CartBuilder::new(&refs, &info, config(Impurity::Gini, Some(2), 0))
            .build(&[0, 1, 2], &mut LcgRng::new(4));

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].prediction, 1.0);
    }

    #[test]
    fn test_max_depth_respected() {
        let points: Vec<LabeledPoint> = (0..64)
            .map(|i| point((i % 2) as f64, &[i as f64]))
            .collect();
        let refs: Vec<&LabeledPoint> = points.iter().collect();
        let info = CategoryCounts::new();
        let sample: Vec<usize> = (0..points.len()).collect();
        let tree = CartBuilder::new(&refs, &info, config(Impurity::Gini, Some(2), 3))
            .build(&sample, &mut LcgRng::new(5));

        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_split_candidates_bounded() {
        let sorted: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let picked = quantile_thresholds(&sorted, 7);
        assert_eq!(picked.len(), 7);
        assert_eq!(picked[0], 0.0);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(quantile_thresholds(&[1.0, 2.0], 7), vec![1.0, 2.0]);
    }

    #[test]
    fn test_tied_classes_predict_lowest() {
        let stats = {
            let mut s = LabelStats::empty(Some(3));
            s.add(2.0);
            s.add(1.0);
            s
        };
        assert_eq!(stats.prediction(), 1.0);
        assert!((stats.impurity(Impurity::Gini) - 0.5).abs() < 1e-12);
        assert!((stats.impurity(Impurity::Entropy) - 1.0).abs() < 1e-12);
    }
}
