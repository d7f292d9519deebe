//! End-to-end behavior of the splitter on small longitudinal datasets.

mod common;

use approx::assert_relative_eq;
use common::{config, toy_data};
use std::collections::HashSet;
use stratified_ioi_rs::{
    Covariate, Dataset, IoiError, IoiSplitter, SplitterConfig, TreeNode,
    between_subject_variability, ioi, within_subject_variability,
};

// ============================================================================
// Variability metrics
// ============================================================================

#[test]
fn test_within_subject_variability_defined() {
    let data = toy_data();
    let features = data.column_indices(["feature1", "feature2"]).unwrap();
    let wsv = within_subject_variability(&data.all(), &features);
    assert_eq!(wsv.len(), 2);
    assert!(wsv.iter().all(|v| v.is_finite() && *v > 0.0));
}

#[test]
fn test_between_subject_variability_defined() {
    let data = toy_data();
    let features = data.column_indices(["feature1", "feature2"]).unwrap();
    let bsv = between_subject_variability(&data.all(), &features);
    assert_eq!(bsv.len(), 2);
    assert!(bsv.iter().all(|v| v.is_finite() && *v > 0.0));
}

#[test]
fn test_ioi_per_feature() {
    let data = toy_data();
    let features = data.column_indices(["feature1", "feature2"]).unwrap();
    let subset = data.all();
    let ratio = ioi(&subset, &features);
    let wsv = within_subject_variability(&subset, &features);
    let bsv = between_subject_variability(&subset, &features);
    for j in 0..2 {
        assert_relative_eq!(ratio[j], wsv[j] / bsv[j], epsilon = 1e-12);
    }
}

// ============================================================================
// Fitting
// ============================================================================

#[test]
fn test_fit_splits_toy_data() {
    let splitter = IoiSplitter::new(toy_data(), config(2)).unwrap();
    let tree = splitter.fit();

    match tree.node(tree.root()) {
        TreeNode::Split { rule, objective, .. } => {
            assert!(rule.covariate == "age" || rule.covariate == "sex");
            assert!(objective.is_finite());
        }
        TreeNode::Leaf { .. } => panic!("5 subjects with a leaf minimum of 2 should split"),
    }

    let summary = splitter.summarize(&tree);
    assert_eq!(summary.rows[0].depth, 0);
    assert_eq!(summary.rows[0].node_id, 1);
}

#[test]
fn test_assign_all_rows() {
    let splitter = IoiSplitter::new(toy_data(), config(2)).unwrap();
    let tree = splitter.fit();
    let summary = splitter.summarize(&tree);

    let labels = splitter.assign_rows(&summary).unwrap();
    assert_eq!(labels.len(), 20);

    let distinct: HashSet<String> = labels.iter().map(|l| l.to_string()).collect();
    assert!(distinct.len() <= 2 * summary.len());
    for label in &distinct {
        let (id, direction) = label.split_once('_').unwrap();
        assert!(id.parse::<u64>().is_ok());
        assert!(direction == "left" || direction == "right");
    }
}

#[test]
fn test_stopping_rule_returns_input_as_leaf() {
    // 5 subjects < 2 * 3
    let splitter = IoiSplitter::new(toy_data(), config(3)).unwrap();
    let tree = splitter.fit();
    assert!(tree.is_leaf());
    assert_eq!(tree.leaf_rows()[0], (0..20).collect::<Vec<_>>().as_slice());
    assert!(splitter.summarize(&tree).is_empty());
}

#[test]
fn test_constant_covariate_yields_leaf() {
    let data = Dataset::builder()
        .subject_ids((0..6).flat_map(|s| std::iter::repeat_n(s, 3)))
        .visit_numbers((0..6).flat_map(|_| 0..3))
        .column("feature1", (0..18).map(|i| ((i * 7) % 5) as f64).collect::<Vec<_>>())
        .column("age", vec![40.0; 18])
        .build()
        .unwrap();
    let config = SplitterConfig::new(vec!["feature1".into()], vec![Covariate::continuous("age")])
        .with_min_subjects_per_leaf(2);
    let splitter = IoiSplitter::new(data, config).unwrap();
    let tree = splitter.fit();
    assert!(tree.is_leaf());
    assert_eq!(tree.leaf_rows()[0].len(), 18);
}

#[test]
fn test_leaf_reports() {
    let splitter = IoiSplitter::new(toy_data(), config(2)).unwrap();
    let tree = splitter.fit();
    let reports = splitter.leaf_reports(&tree);

    assert_eq!(reports.len(), tree.n_leaves());
    assert_eq!(reports.iter().map(|r| r.n_rows).sum::<usize>(), 20);
    for report in &reports {
        assert!(report.label.is_some());
        assert_eq!(report.ioi.len(), 2);
        assert!(report.n_subjects >= 2);
        assert!(report.depth >= 1);
    }

    let first = tree.leaves()[0];
    let leaf_data = splitter.leaf_data(&tree, first).unwrap();
    assert_eq!(leaf_data.n_rows(), reports[0].n_rows);
    assert_eq!(leaf_data.n_subjects(), reports[0].n_subjects);
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_empty_covariates_fail_fast() {
    let config = SplitterConfig::new(vec!["feature1".into()], Vec::new());
    let err = IoiSplitter::new(toy_data(), config).unwrap_err();
    assert!(matches!(err, IoiError::Configuration(_)));
}

#[test]
fn test_zero_leaf_minimum_fails_fast() {
    let err = IoiSplitter::new(toy_data(), config(0)).unwrap_err();
    assert!(matches!(err, IoiError::Configuration(_)));
}

#[test]
fn test_unknown_columns_fail_fast() {
    let config = SplitterConfig::new(vec!["feature9".into()], vec![Covariate::continuous("age")]);
    let err = IoiSplitter::new(toy_data(), config).unwrap_err();
    assert!(matches!(err, IoiError::UnknownColumn(name) if name == "feature9"));

    let config = SplitterConfig::new(vec!["feature1".into()], vec![Covariate::binary("smoker")]);
    let err = IoiSplitter::new(toy_data(), config).unwrap_err();
    assert!(matches!(err, IoiError::UnknownColumn(name) if name == "smoker"));
}
