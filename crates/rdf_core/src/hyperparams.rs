//! Hyperparameters for a single forest training invocation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{RdfError, Result};

/// Node impurity measure used to score splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impurity {
    Gini,
    Entropy,
    Variance,
}

impl Impurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impurity::Gini => "gini",
            Impurity::Entropy => "entropy",
            Impurity::Variance => "variance",
        }
    }

    /// Gini and entropy apply to classification, variance to regression
    pub fn supports_classification(&self) -> bool {
        !matches!(self, Impurity::Variance)
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Impurity {
    type Err = RdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gini" => Ok(Impurity::Gini),
            "entropy" => Ok(Impurity::Entropy),
            "variance" => Ok(Impurity::Variance),
            other => Err(RdfError::Config(format!("unknown impurity {:?}", other))),
        }
    }
}

/// A single positional hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HyperParamValue {
    Int(i64),
    Str(String),
}

impl HyperParamValue {
    fn as_int(&self, name: &str) -> Result<i64> {
        match self {
            HyperParamValue::Int(v) => Ok(*v),
            HyperParamValue::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| RdfError::Config(format!("{} must be an integer, got {:?}", name, s))),
        }
    }
}

/// Per-invocation hyperparameter triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperParams {
    pub max_split_candidates: u32,
    pub max_depth: u32,
    pub impurity: Impurity,
}

impl HyperParams {
    /// Resolve a positional value set: max split candidates, max depth, impurity
    pub fn from_values(values: &[HyperParamValue]) -> Result<Self> {
        if values.len() != 3 {
            return Err(RdfError::Config(format!(
                "expected 3 hyperparameter values, got {}",
                values.len()
            )));
        }
        let max_split_candidates = values[0].as_int("max_split_candidates")?;
        let max_depth = values[1].as_int("max_depth")?;
        let impurity = match &values[2] {
            HyperParamValue::Str(s) => s.parse()?,
            HyperParamValue::Int(v) => {
                return Err(RdfError::Config(format!(
                    "impurity must be a name, got {}",
                    v
                )))
            }
        };

        let to_u32 = |name: &str, v: i64| -> Result<u32> {
            u32::try_from(v).map_err(|_| RdfError::Config(format!("{} must be > 0, got {}", name, v)))
        };
        let params = Self {
            max_split_candidates: to_u32("max_split_candidates", max_split_candidates)?,
            max_depth: to_u32("max_depth", max_depth)?,
            impurity,
        };
        params.validate()?;
        Ok(params)
    }

    /// Reject non-positive split candidate counts and depths
    pub fn validate(&self) -> Result<()> {
        if self.max_split_candidates == 0 {
            return Err(RdfError::Config(
                "max_split_candidates must be > 0".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(RdfError::Config("max_depth must be > 0".to_string()));
        }
        Ok(())
    }

    /// Check the impurity measure against the task chosen by the schema
    pub fn validate_for_task(&self, classification: bool) -> Result<()> {
        self.validate()?;
        if self.impurity.supports_classification() != classification {
            return Err(RdfError::Config(format!(
                "impurity {} cannot be used for {}",
                self.impurity,
                if classification { "classification" } else { "regression" }
            )));
        }
        Ok(())
    }
}

/// One configured candidate, either as named fields or as a positional
/// `[max_split_candidates, max_depth, impurity]` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HyperParamSet {
    Named(HyperParams),
    Positional(Vec<HyperParamValue>),
}

impl HyperParamSet {
    /// Resolve to a validated hyperparameter triple
    pub fn resolve(&self) -> Result<HyperParams> {
        match self {
            HyperParamSet::Named(params) => {
                params.validate()?;
                Ok(*params)
            }
            HyperParamSet::Positional(values) => HyperParams::from_values(values),
        }
    }
}

impl From<HyperParams> for HyperParamSet {
    fn from(params: HyperParams) -> Self {
        HyperParamSet::Named(params)
    }
}
