//! Index of Individuality (IOI) objective.
//!
//! The IOI of a feature is the ratio of within-subject to between-subject
//! variability. Ratios are left as computed: a zero between-subject
//! variability yields an infinite or `NaN` ratio, and that value is what the
//! split search sees.

use crate::dataset::Subset;
use crate::variability::{between_subject_variability, within_subject_variability};
use ndarray::Array1;
use statrs::statistics::Statistics;

/// Per-feature IOI for a subset, one value per entry of `features`.
pub fn ioi(subset: &Subset<'_>, features: &[usize]) -> Array1<f64> {
    let within = within_subject_variability(subset, features);
    let between = between_subject_variability(subset, features);
    within / between
}

/// Mean IOI across features, ignoring `NaN` entries.
///
/// Returns `NaN` when every feature's IOI is `NaN`.
pub fn ioi_scalar(subset: &Subset<'_>, features: &[usize]) -> f64 {
    nan_mean(&ioi(subset, features))
}

pub(crate) fn nan_mean(values: &Array1<f64>) -> f64 {
    values.iter().filter(|v| !v.is_nan()).mean()
}
