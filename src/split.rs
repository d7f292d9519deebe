//! Greedy search for the covariate split that maximizes the weighted IOI.

use crate::config::{BINARY_THRESHOLD, CovariateKind, Direction};
use crate::dataset::Subset;
use crate::objective::ioi_scalar;
use rayon::prelude::*;
use std::collections::HashSet;

/// A covariate bound to its column in the dataset being split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitVariable {
    pub name: String,
    pub column: usize,
    pub kind: CovariateKind,
}

/// A (covariate, threshold) pair and the direction rule that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRule {
    pub covariate: String,
    pub column: usize,
    pub kind: CovariateKind,
    pub threshold: f64,
}

impl SplitRule {
    pub fn direction(&self, value: f64) -> Direction {
        self.kind.direction(self.threshold, value)
    }

    /// Partitions `subset` into (left, right). Every row lands on exactly one side.
    pub fn partition<'a>(&self, subset: &Subset<'a>) -> (Subset<'a>, Subset<'a>) {
        let data = subset.data();
        let (left, right): (Vec<usize>, Vec<usize>) = subset
            .rows()
            .iter()
            .partition(|&&row| self.direction(subset.value(row, self.column)) == Direction::Left);
        (data.subset(left), data.subset(right))
    }
}

/// Outcome of [`find_best_split`].
#[derive(Debug, Clone, PartialEq)]
pub struct BestSplit {
    /// The winning rule, or `None` when no candidate met the leaf-size rule.
    pub rule: Option<SplitRule>,
    /// Weighted objective of the winner, `f64::NEG_INFINITY` when there is none.
    pub objective: f64,
}

impl BestSplit {
    pub fn none() -> Self {
        BestSplit {
            rule: None,
            objective: f64::NEG_INFINITY,
        }
    }

    pub fn is_none(&self) -> bool {
        self.rule.is_none()
    }
}

/// Candidate thresholds for one covariate, in enumeration order.
///
/// Binary covariates have exactly one candidate. Continuous covariates have one
/// per distinct observed value, in order of first appearance; `NaN` is never a
/// candidate since nothing compares `<=` to it.
fn candidate_thresholds(subset: &Subset<'_>, variable: &SplitVariable) -> Vec<f64> {
    match variable.kind {
        CovariateKind::Binary => vec![BINARY_THRESHOLD],
        CovariateKind::Continuous => {
            let mut seen = HashSet::new();
            subset
                .rows()
                .iter()
                .map(|&row| subset.value(row, variable.column))
                .filter(|v| !v.is_nan())
                // -0.0 and 0.0 are the same threshold
                .filter(|v| seen.insert((v + 0.0).to_bits()))
                .collect()
        }
    }
}

/// Weighted objective of one candidate, or `None` if either side has fewer than
/// `min_subjects_per_leaf` distinct subjects.
///
/// Weights are each side's subject count over the sum of both counts. A subject
/// whose visits fall on both sides of the threshold is counted on both sides,
/// so the denominator can exceed the parent's subject count.
fn evaluate_candidate(
    subset: &Subset<'_>,
    rule: &SplitRule,
    features: &[usize],
    min_subjects_per_leaf: usize,
) -> Option<f64> {
    let (left, right) = rule.partition(subset);
    let left_subjects = left.unique_subjects();
    let right_subjects = right.unique_subjects();
    if left_subjects < min_subjects_per_leaf || right_subjects < min_subjects_per_leaf {
        return None;
    }

    let total = (left_subjects + right_subjects) as f64;
    let left_weight = left_subjects as f64 / total;
    let right_weight = right_subjects as f64 / total;
    Some(left_weight * ioi_scalar(&left, features) + right_weight * ioi_scalar(&right, features))
}

/// Finds the split with the largest weighted IOI across all covariates.
///
/// Candidates are evaluated in parallel but reduced in enumeration order
/// (covariates as given, thresholds by first appearance) with a strict `>`,
/// so ties keep the first candidate found and a `NaN` objective never wins.
pub fn find_best_split(
    subset: &Subset<'_>,
    variables: &[SplitVariable],
    features: &[usize],
    min_subjects_per_leaf: usize,
) -> BestSplit {
    let candidates: Vec<SplitRule> = variables
        .iter()
        .flat_map(|variable| {
            candidate_thresholds(subset, variable)
                .into_iter()
                .map(move |threshold| SplitRule {
                    covariate: variable.name.clone(),
                    column: variable.column,
                    kind: variable.kind,
                    threshold,
                })
        })
        .collect();

    let objectives: Vec<Option<f64>> = candidates
        .par_iter()
        .map(|rule| evaluate_candidate(subset, rule, features, min_subjects_per_leaf))
        .collect();

    let mut best = BestSplit::none();
    for (rule, objective) in candidates.into_iter().zip(objectives) {
        if let Some(objective) = objective {
            if objective > best.objective {
                best = BestSplit {
                    rule: Some(rule),
                    objective,
                };
            }
        }
    }
    best
}
