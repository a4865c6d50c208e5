//! Input schema describing which columns are categorical and which is the target

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::errors::{RdfError, Result};

/// Schema section of the configuration, by feature name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Column names, in input order
    pub feature_names: Vec<String>,
    /// Column count when names are not given; columns are then named "0", "1", ...
    pub num_features: Option<usize>,
    /// Categorical columns; mutually exclusive with `numeric_features`
    pub categorical_features: Option<Vec<String>>,
    /// Numeric columns; mutually exclusive with `categorical_features`
    pub numeric_features: Option<Vec<String>>,
    /// Name of the target column
    pub target_feature: Option<String>,
}

/// Read-only view of the input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSchema {
    feature_names: Vec<String>,
    categorical: BTreeSet<usize>,
    target_index: usize,
}

impl InputSchema {
    /// Build a schema from explicit column indices
    pub fn new(
        feature_names: Vec<String>,
        categorical: BTreeSet<usize>,
        target_index: usize,
    ) -> Result<Self> {
        let count = feature_names.len();
        if count < 2 {
            return Err(RdfError::Schema(format!(
                "at least 2 features are required (target plus one predictor), got {}",
                count
            )));
        }
        if target_index >= count {
            return Err(RdfError::Schema(format!(
                "target index {} out of range for {} features",
                target_index, count
            )));
        }
        if let Some(&bad) = categorical.iter().find(|&&i| i >= count) {
            return Err(RdfError::Schema(format!(
                "categorical index {} out of range for {} features",
                bad, count
            )));
        }
        let mut seen = BTreeSet::new();
        for name in &feature_names {
            if !seen.insert(name.as_str()) {
                return Err(RdfError::Schema(format!("duplicate feature name {:?}", name)));
            }
        }
        Ok(Self {
            feature_names,
            categorical,
            target_index,
        })
    }

    /// Resolve a name-based schema configuration
    pub fn from_config(config: &SchemaConfig) -> Result<Self> {
        let feature_names = if !config.feature_names.is_empty() {
            if let Some(n) = config.num_features {
                if n != config.feature_names.len() {
                    return Err(RdfError::Schema(format!(
                        "num_features is {} but {} feature names were given",
                        n,
                        config.feature_names.len()
                    )));
                }
            }
            config.feature_names.clone()
        } else {
            match config.num_features {
                Some(n) => (0..n).map(|i| i.to_string()).collect(),
                None => {
                    return Err(RdfError::Schema(
                        "either feature_names or num_features must be set".to_string(),
                    ))
                }
            }
        };

        let positions: HashMap<&str, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let lookup = |name: &str| -> Result<usize> {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| RdfError::Schema(format!("unknown feature {:?}", name)))
        };

        let target_name = config
            .target_feature
            .as_deref()
            .ok_or_else(|| RdfError::Schema("target_feature must be set".to_string()))?;
        let target_index = lookup(target_name)?;

        let categorical = match (&config.categorical_features, &config.numeric_features) {
            (Some(_), Some(_)) => {
                return Err(RdfError::Schema(
                    "only one of categorical_features and numeric_features may be set".to_string(),
                ))
            }
            (Some(names), None) => names
                .iter()
                .map(|name| lookup(name))
                .collect::<Result<BTreeSet<_>>>()?,
            (None, Some(names)) => {
                let numeric = names
                    .iter()
                    .map(|name| lookup(name))
                    .collect::<Result<BTreeSet<_>>>()?;
                (0..feature_names.len())
                    .filter(|i| !numeric.contains(i))
                    .collect()
            }
            // Everything numeric
            (None, None) => BTreeSet::new(),
        };

        Self::new(feature_names, categorical, target_index)
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn is_categorical(&self, index: usize) -> bool {
        self.categorical.contains(&index)
    }

    pub fn is_target(&self, index: usize) -> bool {
        index == self.target_index
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// A categorical target means classification, a numeric one regression
    pub fn is_classification(&self) -> bool {
        self.is_categorical(self.target_index)
    }

    /// Categorical column indices in ascending order
    pub fn categorical_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.categorical.iter().copied()
    }

    /// Position of a column in the encoded feature vector, `None` for the target
    pub fn feature_slot(&self, index: usize) -> Option<usize> {
        match index.cmp(&self.target_index) {
            std::cmp::Ordering::Less => Some(index),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(index - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_config_categorical_names() {
        let config = SchemaConfig {
            feature_names: names(&["color", "size", "label"]),
            categorical_features: Some(names(&["color", "label"])),
            target_feature: Some("label".to_string()),
            ..Default::default()
        };
        let schema = InputSchema::from_config(&config).unwrap();

        assert_eq!(schema.feature_count(), 3);
        assert!(schema.is_categorical(0));
        assert!(!schema.is_categorical(1));
        assert!(schema.is_target(2));
        assert!(schema.is_classification());
        assert_eq!(schema.categorical_indices().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_numeric_features_infer_categorical_complement() {
        let config = SchemaConfig {
            num_features: Some(4),
            numeric_features: Some(names(&["0", "3"])),
            target_feature: Some("3".to_string()),
            ..Default::default()
        };
        let schema = InputSchema::from_config(&config).unwrap();

        assert_eq!(schema.feature_names(), &names(&["0", "1", "2", "3"])[..]);
        assert_eq!(schema.categorical_indices().collect::<Vec<_>>(), vec![1, 2]);
        assert!(!schema.is_classification());
    }

    #[test]
    fn test_missing_target_is_rejected() {
        let config = SchemaConfig {
            num_features: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            InputSchema::from_config(&config),
            Err(RdfError::Schema(_))
        ));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let config = SchemaConfig {
            feature_names: names(&["a", "b"]),
            target_feature: Some("c".to_string()),
            ..Default::default()
        };
        assert!(InputSchema::from_config(&config).is_err());
    }

    #[test]
    fn test_feature_slots_skip_target() {
        let schema = InputSchema::new(names(&["a", "b", "c", "d"]), BTreeSet::new(), 1).unwrap();
        assert_eq!(schema.feature_slot(0), Some(0));
        assert_eq!(schema.feature_slot(1), None);
        assert_eq!(schema.feature_slot(2), Some(1));
        assert_eq!(schema.feature_slot(3), Some(2));
    }
}
