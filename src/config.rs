//! Splitter configuration.

use crate::error::{IoiError, IoiResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default minimum number of distinct subjects required on each side of a split.
pub const DEFAULT_MIN_SUBJECTS_PER_LEAF: usize = 10;

/// Threshold recorded for binary splits. Display only; binary splits compare
/// against 0 and 1, never against this value.
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Side of a split a record is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a covariate is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovariateKind {
    /// One candidate per distinct observed value, `value <= threshold` goes left.
    #[default]
    Continuous,
    /// A single 0/1 candidate, `value == 0` goes left.
    Binary,
}

impl CovariateKind {
    /// Applies the split rule to one value.
    ///
    /// Anything that does not satisfy the left-hand condition goes right,
    /// including `NaN`, so a partition never drops a row.
    pub fn direction(&self, threshold: f64, value: f64) -> Direction {
        let left = match self {
            CovariateKind::Continuous => value <= threshold,
            CovariateKind::Binary => value == 0.0,
        };
        if left {
            Direction::Left
        } else {
            Direction::Right
        }
    }
}

/// A column considered as a split variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Covariate {
    pub name: String,
    #[serde(default)]
    pub kind: CovariateKind,
}

impl Covariate {
    pub fn continuous(name: impl Into<String>) -> Self {
        Covariate {
            name: name.into(),
            kind: CovariateKind::Continuous,
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Covariate {
            name: name.into(),
            kind: CovariateKind::Binary,
        }
    }
}

/// Features to stratify on, covariates to split by, and the leaf-size rule.
///
/// # Example
///
/// ```
/// use stratified_ioi_rs::config::{Covariate, SplitterConfig};
///
/// let config = SplitterConfig::new(
///     vec!["feature1".to_string(), "feature2".to_string()],
///     vec![Covariate::continuous("age"), Covariate::binary("sex")],
/// )
/// .with_min_subjects_per_leaf(2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitterConfig {
    pub features: Vec<String>,
    pub covariates: Vec<Covariate>,
    #[serde(default = "default_min_subjects_per_leaf")]
    pub min_subjects_per_leaf: usize,
}

fn default_min_subjects_per_leaf() -> usize {
    DEFAULT_MIN_SUBJECTS_PER_LEAF
}

impl SplitterConfig {
    pub fn new(features: Vec<String>, covariates: Vec<Covariate>) -> Self {
        SplitterConfig {
            features,
            covariates,
            min_subjects_per_leaf: DEFAULT_MIN_SUBJECTS_PER_LEAF,
        }
    }

    pub fn with_min_subjects_per_leaf(mut self, min_subjects_per_leaf: usize) -> Self {
        self.min_subjects_per_leaf = min_subjects_per_leaf;
        self
    }

    /// Parses a JSON document and validates it.
    ///
    /// ```json
    /// {
    ///   "features": ["feature1", "feature2"],
    ///   "covariates": [{"name": "age"}, {"name": "sex", "kind": "binary"}],
    ///   "min_subjects_per_leaf": 2
    /// }
    /// ```
    pub fn from_json(json: &str) -> IoiResult<Self> {
        let config: SplitterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IoiResult<()> {
        if self.covariates.is_empty() {
            return Err(IoiError::Configuration(
                "at least one covariate is required".into(),
            ));
        }
        if self.features.is_empty() {
            return Err(IoiError::Configuration(
                "at least one feature is required".into(),
            ));
        }
        if self.min_subjects_per_leaf == 0 {
            return Err(IoiError::Configuration(
                "min_subjects_per_leaf must be positive".into(),
            ));
        }
        let mut seen = HashSet::new();
        for covariate in &self.covariates {
            if !seen.insert(covariate.name.as_str()) {
                return Err(IoiError::Configuration(format!(
                    "covariate {} is listed more than once",
                    covariate.name
                )));
            }
        }
        Ok(())
    }
}
