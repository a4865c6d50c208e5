//! Ordinal encodings for categorical columns
//!
//! Values are ranked by their lexicographic order, so the same set of
//! distinct values always produces the same codes regardless of the order
//! or partition it was discovered in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::distinct::DistinctValues;
use crate::schema::InputSchema;

/// Column index (or feature slot) to number of categorical levels
pub type CategoryCounts = BTreeMap<usize, usize>;

/// Bijection between one column's distinct values and `0..len()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ValueEncoding {
    values: Vec<String>,
    codes: BTreeMap<String, usize>,
}

impl ValueEncoding {
    /// Rank the given values in ascending order; duplicates collapse
    pub fn from_distinct<I>(distinct: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut values: Vec<String> = distinct.into_iter().collect();
        values.sort();
        values.dedup();

        let codes = values
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();

        Self { values, codes }
    }

    /// Ordinal code of a value
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    /// Value behind an ordinal code
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(String::as_str)
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in code order
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl From<Vec<String>> for ValueEncoding {
    fn from(values: Vec<String>) -> Self {
        Self::from_distinct(values)
    }
}

impl From<ValueEncoding> for Vec<String> {
    fn from(encoding: ValueEncoding) -> Self {
        encoding.values
    }
}

/// Encodings for every categorical column of one training invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalValueEncodings {
    encodings: BTreeMap<usize, ValueEncoding>,
}

impl CategoricalValueEncodings {
    /// Turn each column's distinct values into its ordinal encoding
    pub fn build(distinct: DistinctValues) -> Self {
        let encodings = distinct
            .into_iter()
            .map(|(index, values)| (index, ValueEncoding::from_distinct(values)))
            .collect();
        Self { encodings }
    }

    /// Encoding for a column, `None` for numeric columns
    pub fn get(&self, index: usize) -> Option<&ValueEncoding> {
        self.encodings.get(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ValueEncoding)> {
        self.encodings.iter().map(|(&index, encoding)| (index, encoding))
    }

    /// Number of levels per categorical column, keyed by column index
    pub fn category_counts(&self) -> CategoryCounts {
        self.encodings
            .iter()
            .map(|(&index, encoding)| (index, encoding.len()))
            .collect()
    }

    /// Number of levels per categorical predictor, keyed by feature-vector slot
    ///
    /// The target column is left out and later columns shift down by one,
    /// matching the layout produced by the record encoder.
    pub fn categorical_features_info(&self, schema: &InputSchema) -> CategoryCounts {
        self.encodings
            .iter()
            .filter_map(|(&index, encoding)| {
                schema.feature_slot(index).map(|slot| (slot, encoding.len()))
            })
            .collect()
    }

    /// Distinct target values, when the target is categorical
    pub fn target_class_count(&self, schema: &InputSchema) -> Option<usize> {
        self.get(schema.target_index()).map(ValueEncoding::len)
    }
}
