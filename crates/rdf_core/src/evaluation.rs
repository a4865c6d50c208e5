//! Scoring trained forests against held-out examples

use crate::errors::{RdfError, Result};
use crate::example::LabeledPoint;
use crate::partition::Partitioned;

/// A trained model that can score an encoded feature vector
pub trait Predictor: Sync {
    /// Class index for classifiers, estimate for regressors
    fn predict(&self, features: &[f64]) -> f64;
}

/// Fraction of examples whose predicted class equals the label
pub fn accuracy<P: Predictor>(model: &P, data: &Partitioned<LabeledPoint>) -> Result<f64> {
    let (correct, total) = data
        .try_aggregate(
            |partition| {
                let correct = partition
                    .iter()
                    .filter(|point| model.predict(&point.features) == point.label)
                    .count();
                Ok((correct, partition.len()))
            },
            |a, b| (a.0 + b.0, a.1 + b.1),
        )?
        .unwrap_or((0, 0));

    if total == 0 {
        return Err(RdfError::EmptyDataset);
    }
    Ok(correct as f64 / total as f64)
}

/// Root mean squared error of the predictions
pub fn rmse<P: Predictor>(model: &P, data: &Partitioned<LabeledPoint>) -> Result<f64> {
    let (sum_sq, total) = data
        .try_aggregate(
            |partition| {
                let sum_sq: f64 = partition
                    .iter()
                    .map(|point| {
                        let diff = model.predict(&point.features) - point.label;
                        diff * diff
                    })
                    .sum();
                Ok((sum_sq, partition.len()))
            },
            |a, b| (a.0 + b.0, a.1 + b.1),
        )?
        .unwrap_or((0.0, 0));

    if total == 0 {
        return Err(RdfError::EmptyDataset);
    }
    Ok((sum_sq / total as f64).sqrt())
}
