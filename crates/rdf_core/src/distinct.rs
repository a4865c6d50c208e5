//! Distinct categorical value discovery
//!
//! Each partition collects the values it sees for every categorical column,
//! then the per-partition sets are unioned pairwise into the global sets.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::errors::{RdfError, Result};
use crate::partition::Partitioned;
use crate::schema::InputSchema;

/// Categorical column index to the distinct values observed for it
pub type DistinctValues = BTreeMap<usize, BTreeSet<String>>;

/// Fail unless the record carries exactly one field per schema feature
pub fn check_record_length(record: &[String], feature_count: usize) -> Result<()> {
    if record.len() != feature_count {
        return Err(RdfError::RecordLength {
            expected: feature_count,
            found: record.len(),
        });
    }
    Ok(())
}

/// Collect distinct values of the given columns within one partition
///
/// Every requested column gets an entry, even if the partition is empty.
pub fn collect_partition(
    records: &[Vec<String>],
    categorical: &[usize],
    feature_count: usize,
) -> Result<DistinctValues> {
    let mut distinct: DistinctValues = categorical
        .iter()
        .map(|&index| (index, BTreeSet::new()))
        .collect();

    for record in records {
        check_record_length(record, feature_count)?;
        for (&index, values) in distinct.iter_mut() {
            if !values.contains(&record[index]) {
                values.insert(record[index].clone());
            }
        }
    }

    Ok(distinct)
}

/// Union two partial results column by column
///
/// Associative and commutative: any pairing order over any number of
/// partitions yields the same sets.
pub fn merge_distinct(mut left: DistinctValues, right: DistinctValues) -> DistinctValues {
    for (index, values) in right {
        let target = left.entry(index).or_default();
        if target.len() < values.len() {
            let smaller = std::mem::replace(target, values);
            target.extend(smaller);
        } else {
            target.extend(values);
        }
    }
    left
}

/// Collect the distinct values of every categorical column across all partitions
pub fn collect_distinct_values(
    records: &Partitioned<Vec<String>>,
    schema: &InputSchema,
) -> Result<DistinctValues> {
    let categorical: Vec<usize> = schema.categorical_indices().collect();
    let feature_count = schema.feature_count();

    let merged = records.try_aggregate(
        |partition| collect_partition(partition, &categorical, feature_count),
        merge_distinct,
    )?;

    // No partitions at all still yields one (empty) set per categorical column
    let distinct = merged.unwrap_or_else(|| {
        categorical
            .iter()
            .map(|&index| (index, BTreeSet::new()))
            .collect()
    });

    for (index, values) in &distinct {
        debug!("Feature {}: {} distinct values", index, values.len());
    }

    Ok(distinct)
}
