//! Turns parsed records into labeled numeric training examples

use serde::{Deserialize, Serialize};

use crate::distinct::check_record_length;
use crate::encoding::CategoricalValueEncodings;
use crate::errors::{RdfError, Result};
use crate::partition::Partitioned;
use crate::schema::InputSchema;

/// One encoded training example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub label: f64,
    /// One value per non-target column, in column order
    pub features: Vec<f64>,
}

/// Applies categorical encodings and numeric parsing to records
#[derive(Debug, Clone, Copy)]
pub struct RecordEncoder<'a> {
    schema: &'a InputSchema,
    encodings: &'a CategoricalValueEncodings,
}

impl<'a> RecordEncoder<'a> {
    pub fn new(schema: &'a InputSchema, encodings: &'a CategoricalValueEncodings) -> Self {
        Self { schema, encodings }
    }

    /// Encode a single field of column `index`
    pub fn encode_value(&self, index: usize, value: &str) -> Result<f64> {
        match self.encodings.get(index) {
            Some(encoding) => encoding
                .encode(value)
                .map(|code| code as f64)
                .ok_or_else(|| RdfError::UnseenCategory {
                    index,
                    value: value.to_string(),
                }),
            None => value.trim().parse::<f64>().map_err(|_| RdfError::InvalidNumber {
                index,
                value: value.to_string(),
            }),
        }
    }

    /// Encode a full record into its label and feature vector
    pub fn encode(&self, record: &[String]) -> Result<LabeledPoint> {
        let feature_count = self.schema.feature_count();
        check_record_length(record, feature_count)?;

        let mut features = vec![0.0; feature_count - 1];
        let mut label = None;
        let mut offset = 0;

        for (index, value) in record.iter().enumerate() {
            let encoded = self.encode_value(index, value)?;
            if self.schema.is_target(index) {
                label = Some(encoded);
                // Columns after the target move up one slot
                offset = 1;
            } else {
                features[index - offset] = encoded;
            }
        }

        // NaN parses as a number but is the missing-value marker
        let label = label.filter(|l| !l.is_nan()).ok_or(RdfError::MissingLabel)?;
        Ok(LabeledPoint { label, features })
    }

    /// Encode every record of a partitioned collection in parallel
    pub fn encode_all(&self, records: &Partitioned<Vec<String>>) -> Result<Partitioned<LabeledPoint>> {
        records.try_map(|record| self.encode(record))
    }
}
