//! Synthetic longitudinal datasets shared by the integration tests.

#![allow(dead_code)]

use ndarray::Array1;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stratified_ioi_rs::{Covariate, Dataset, SplitterConfig};

/// 5 subjects x 4 visits, two standard-normal features, age and sex per subject.
pub fn toy_data() -> Dataset {
    let mut rng = StdRng::seed_from_u64(0);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let feature1 = Array1::random_using(20, normal, &mut rng);
    let feature2 = Array1::random_using(20, normal, &mut rng);

    let ages = [30.0, 40.0, 35.0, 50.0, 45.0];
    let sexes = [0.0, 1.0, 0.0, 1.0, 0.0];

    Dataset::builder()
        .subject_ids((0..5).flat_map(|s| std::iter::repeat_n(s, 4)))
        .visit_numbers((0..5).flat_map(|_| 0..4))
        .column("feature1", feature1)
        .column("feature2", feature2)
        .column("age", repeat_each(&ages, 4))
        .column("sex", repeat_each(&sexes, 4))
        .build()
        .unwrap()
}

/// Larger cohort where within-subject spread depends on age and sex, so there
/// is real structure to split on.
pub fn cohort(n_subjects: usize, n_visits: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_rows = n_subjects * n_visits;
    let noise1 = Array1::random_using(n_rows, Normal::new(0.0, 1.0).unwrap(), &mut rng);
    let noise2 = Array1::random_using(n_rows, Normal::new(0.0, 1.0).unwrap(), &mut rng);
    let baseline = Array1::random_using(n_subjects, Normal::new(0.0, 3.0).unwrap(), &mut rng);

    let mut subjects = Vec::with_capacity(n_rows);
    let mut visits = Vec::with_capacity(n_rows);
    let mut feature1 = Vec::with_capacity(n_rows);
    let mut feature2 = Vec::with_capacity(n_rows);
    let mut age = Vec::with_capacity(n_rows);
    let mut sex = Vec::with_capacity(n_rows);
    for s in 0..n_subjects {
        let subject_age = 20.0 + ((s * 37) % 50) as f64;
        let subject_sex = (s % 2) as f64;
        let spread = 0.5 + subject_age / 25.0 + subject_sex;
        for v in 0..n_visits {
            let i = s * n_visits + v;
            subjects.push(format!("S{s:03}"));
            visits.push(v);
            feature1.push(baseline[s] + spread * noise1[i]);
            feature2.push(baseline[s] * 0.5 + noise2[i]);
            age.push(subject_age);
            sex.push(subject_sex);
        }
    }

    Dataset::builder()
        .subject_ids(subjects)
        .visit_numbers(visits)
        .column("feature1", feature1)
        .column("feature2", feature2)
        .column("age", age)
        .column("sex", sex)
        .build()
        .unwrap()
}

pub fn config(min_subjects_per_leaf: usize) -> SplitterConfig {
    SplitterConfig::new(
        vec!["feature1".to_string(), "feature2".to_string()],
        vec![Covariate::continuous("age"), Covariate::binary("sex")],
    )
    .with_min_subjects_per_leaf(min_subjects_per_leaf)
}

fn repeat_each(values: &[f64], times: usize) -> Vec<f64> {
    values
        .iter()
        .flat_map(|&v| std::iter::repeat_n(v, times))
        .collect()
}
