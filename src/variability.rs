//! Within- and between-subject variability over a set of features.
//!
//! Both metrics group the rows of a subset, take the sample standard deviation
//! (ddof = 1) of each feature inside every group, then average the per-group
//! values. Missing values are skipped inside a group; a group with fewer than
//! two observed values has an undefined deviation and is left out of the
//! average. When no group is defined the result for that feature is `NaN`.

use crate::dataset::Subset;
use ndarray::Array1;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Mean over subjects of each subject's standard deviation across visits.
///
/// Returns one value per entry of `features` (column indices).
pub fn within_subject_variability(subset: &Subset<'_>, features: &[usize]) -> Array1<f64> {
    mean_group_std(subset, &subset.group_by_subject(), features)
}

/// Mean over visits of the standard deviation across subjects at that visit.
///
/// Returns one value per entry of `features` (column indices).
pub fn between_subject_variability(subset: &Subset<'_>, features: &[usize]) -> Array1<f64> {
    mean_group_std(subset, &subset.group_by_visit(), features)
}

fn mean_group_std(
    subset: &Subset<'_>,
    groups: &BTreeMap<usize, Vec<usize>>,
    features: &[usize],
) -> Array1<f64> {
    features
        .iter()
        .map(|&column| {
            let stds: Vec<f64> = groups
                .values()
                .map(|rows| {
                    let observed: Vec<f64> = rows
                        .iter()
                        .map(|&row| subset.value(row, column))
                        .filter(|v| !v.is_nan())
                        .collect();
                    observed.std_dev()
                })
                .filter(|s| !s.is_nan())
                .collect();
            stds.mean()
        })
        .collect()
}
