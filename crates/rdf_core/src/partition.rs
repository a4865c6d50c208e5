//! Partitioned in-memory collection processed with one task per partition
//!
//! Per-partition work runs on the rayon pool with no shared mutable state.
//! Results are combined with caller-supplied associative merges, so the
//! outcome never depends on how rayon pairs partitions up.

use rayon::prelude::*;

use crate::errors::Result;

/// A collection split into independently processed shards
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned<T> {
    partitions: Vec<Vec<T>>,
}

impl<T> Partitioned<T> {
    /// Wrap pre-split shards as-is
    pub fn new(partitions: Vec<Vec<T>>) -> Self {
        Self { partitions }
    }

    /// Split items into `num_partitions` contiguous shards of near-equal size
    pub fn from_vec(items: Vec<T>, num_partitions: usize) -> Self {
        let num_partitions = num_partitions.max(1);
        let total = items.len();
        let base = total / num_partitions;
        let extra = total % num_partitions;

        let mut partitions = Vec::with_capacity(num_partitions);
        let mut iter = items.into_iter();
        for i in 0..num_partitions {
            let size = base + usize::from(i < extra);
            partitions.push(iter.by_ref().take(size).collect());
        }
        Self { partitions }
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of items across partitions
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(Vec::is_empty)
    }

    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    /// Iterate over all items in partition order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flatten()
    }

    /// Flatten into a single vector in partition order
    pub fn into_vec(self) -> Vec<T> {
        self.partitions.into_iter().flatten().collect()
    }
}

impl<T: Sync> Partitioned<T> {
    /// Transform each partition in parallel, keeping the partition layout
    pub fn try_map_partitions<U, F>(&self, f: F) -> Result<Partitioned<U>>
    where
        U: Send,
        F: Fn(&[T]) -> Result<Vec<U>> + Sync + Send,
    {
        let partitions = self
            .partitions
            .par_iter()
            .map(|partition| f(partition))
            .collect::<Result<Vec<Vec<U>>>>()?;
        Ok(Partitioned { partitions })
    }

    /// Map every item in parallel, failing on the first error
    pub fn try_map<U, F>(&self, f: F) -> Result<Partitioned<U>>
    where
        U: Send,
        F: Fn(&T) -> Result<U> + Sync + Send,
    {
        self.try_map_partitions(|partition| partition.iter().map(&f).collect())
    }

    /// Build one accumulator per partition and fold them with `merge`
    ///
    /// `merge` must be associative and commutative. Returns `None` when
    /// there are no partitions.
    pub fn try_aggregate<A, L, M>(&self, local: L, merge: M) -> Result<Option<A>>
    where
        A: Send,
        L: Fn(&[T]) -> Result<A> + Sync + Send,
        M: Fn(A, A) -> A + Sync + Send,
    {
        self.partitions
            .par_iter()
            .map(|partition| local(partition))
            .try_reduce_with(|a, b| Ok(merge(a, b)))
            .transpose()
    }
}
