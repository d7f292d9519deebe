//! Benchmarks for split search and tree fitting.
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- split_search

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::Array1;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::SeedableRng;
use rand::rngs::StdRng;

use stratified_ioi_rs::split::SplitVariable;
use stratified_ioi_rs::{
    Covariate, CovariateKind, Dataset, IoiSplitter, SplitterConfig, find_best_split, ioi_scalar,
};

// ============================================================================
// Data Generation Utilities
// ============================================================================

/// Generate a cohort of `n_subjects` with `n_visits` each and three features.
fn generate_cohort(n_subjects: usize, n_visits: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let n_rows = n_subjects * n_visits;
    let noise = Array1::random_using(n_rows * 3, Normal::new(0.0, 1.0).unwrap(), &mut rng);

    let mut subjects = Vec::with_capacity(n_rows);
    let mut visits = Vec::with_capacity(n_rows);
    let mut features = vec![Vec::with_capacity(n_rows); 3];
    let mut age = Vec::with_capacity(n_rows);
    let mut sex = Vec::with_capacity(n_rows);
    for s in 0..n_subjects {
        let subject_age = 18.0 + ((s * 31) % 60) as f64;
        for v in 0..n_visits {
            let i = s * n_visits + v;
            subjects.push(s);
            visits.push(v);
            for (j, feature) in features.iter_mut().enumerate() {
                feature.push(s as f64 * 0.1 + (1.0 + subject_age / 30.0) * noise[i * 3 + j]);
            }
            age.push(subject_age);
            sex.push((s % 2) as f64);
        }
    }

    let mut builder = Dataset::builder()
        .subject_ids(subjects)
        .visit_numbers(visits)
        .column("age", age)
        .column("sex", sex);
    for (j, feature) in features.into_iter().enumerate() {
        builder = builder.column(format!("feature{j}"), feature);
    }
    builder.build().unwrap()
}

fn config(min_subjects_per_leaf: usize) -> SplitterConfig {
    SplitterConfig::new(
        vec!["feature0".into(), "feature1".into(), "feature2".into()],
        vec![Covariate::continuous("age"), Covariate::binary("sex")],
    )
    .with_min_subjects_per_leaf(min_subjects_per_leaf)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_objective(c: &mut Criterion) {
    let mut group = c.benchmark_group("objective");
    for n_subjects in [50, 200, 1000] {
        let data = generate_cohort(n_subjects, 6);
        let features = data.column_indices(["feature0", "feature1", "feature2"]).unwrap();
        let subset = data.all();
        group.throughput(Throughput::Elements(data.n_rows() as u64));
        group.bench_with_input(BenchmarkId::new("ioi_scalar", n_subjects), &n_subjects, |b, _| {
            b.iter(|| ioi_scalar(black_box(&subset), black_box(&features)))
        });
    }
    group.finish();
}

fn bench_split_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_search");
    group.sample_size(20);
    for n_subjects in [50, 200] {
        let data = generate_cohort(n_subjects, 6);
        let features = data.column_indices(["feature0", "feature1", "feature2"]).unwrap();
        let variables = vec![
            SplitVariable {
                name: "age".into(),
                column: data.column_index("age").unwrap(),
                kind: CovariateKind::Continuous,
            },
            SplitVariable {
                name: "sex".into(),
                column: data.column_index("sex").unwrap(),
                kind: CovariateKind::Binary,
            },
        ];
        let subset = data.all();
        group.bench_with_input(
            BenchmarkId::new("find_best_split", n_subjects),
            &n_subjects,
            |b, _| b.iter(|| find_best_split(black_box(&subset), &variables, &features, 10)),
        );
    }
    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);
    for n_subjects in [100, 400] {
        let splitter = IoiSplitter::new(generate_cohort(n_subjects, 5), config(10)).unwrap();
        group.bench_with_input(BenchmarkId::new("fit", n_subjects), &n_subjects, |b, _| {
            b.iter(|| splitter.fit())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_objective, bench_split_search, bench_fit);
criterion_main!(benches);
