//! High-level API: bind a configuration to a dataset, fit, summarize, route.

use crate::config::SplitterConfig;
use crate::dataset::{Dataset, Record};
use crate::error::IoiResult;
use crate::objective::{ioi, nan_mean};
use crate::router::Router;
use crate::split::SplitVariable;
use crate::summary::{LeafLabel, Summary, flat_leaves, flatten_from};
use crate::tree::{NodeId, Tree, TreeBuilder, TreeNode};
use ndarray::Array1;
use serde::Serialize;

/// Stratifies a longitudinal dataset by recursively splitting on covariates
/// to maximize the Index of Individuality.
///
/// # Example
///
/// ```
/// use stratified_ioi_rs::{Covariate, Dataset, IoiSplitter, SplitterConfig};
///
/// let mut subjects = Vec::new();
/// let mut visits = Vec::new();
/// let mut feature = Vec::new();
/// let mut age = Vec::new();
/// for s in 0..8 {
///     for v in 0..3 {
///         subjects.push(s);
///         visits.push(v);
///         feature.push(((s * 5 + v * 3) % 7) as f64 * (1.0 + s as f64));
///         age.push(30.0 + s as f64);
///     }
/// }
/// let data = Dataset::builder()
///     .subject_ids(subjects)
///     .visit_numbers(visits)
///     .column("feature", feature)
///     .column("age", age)
///     .build()
///     .unwrap();
///
/// let config = SplitterConfig::new(vec!["feature".into()], vec![Covariate::continuous("age")])
///     .with_min_subjects_per_leaf(2);
/// let splitter = IoiSplitter::new(data, config).unwrap();
/// let tree = splitter.fit();
/// assert!(!tree.is_leaf(), "8 subjects with a leaf minimum of 2 should split");
/// let summary = splitter.summarize(&tree);
/// assert_eq!(summary.rows[0].depth, 0);
///
/// let label = splitter.assign_to_leaf(&summary, &splitter.data().row(0)).unwrap();
/// assert!(label.to_string().ends_with("_left"));
/// ```
#[derive(Debug, Clone)]
pub struct IoiSplitter {
    data: Dataset,
    config: SplitterConfig,
    features: Vec<usize>,
    variables: Vec<SplitVariable>,
}

/// Per-leaf outcome of a fit, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafReport {
    /// Router label of the leaf; `None` when the tree never split.
    pub label: Option<LeafLabel>,
    pub depth: usize,
    pub n_rows: usize,
    pub n_subjects: usize,
    /// IOI of each configured feature, in configuration order.
    pub ioi: Array1<f64>,
    /// Mean of `ioi`, ignoring `NaN`.
    pub mean_ioi: f64,
}

impl IoiSplitter {
    /// Validates `config` and resolves its columns in `data`.
    pub fn new(data: Dataset, config: SplitterConfig) -> IoiResult<Self> {
        config.validate()?;
        let features = data.column_indices(&config.features)?;
        let columns = data.column_indices(config.covariates.iter().map(|c| c.name.as_str()))?;
        let variables = config
            .covariates
            .iter()
            .zip(columns)
            .map(|(covariate, column)| SplitVariable {
                name: covariate.name.clone(),
                column,
                kind: covariate.kind,
            })
            .collect();

        Ok(IoiSplitter {
            data,
            config,
            features,
            variables,
        })
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Covariates bound to their dataset columns, in configuration order.
    pub fn split_variables(&self) -> &[SplitVariable] {
        &self.variables
    }

    /// Column indices of the configured features.
    pub fn feature_columns(&self) -> &[usize] {
        &self.features
    }

    /// Builds the split tree over the whole dataset.
    pub fn fit(&self) -> Tree {
        TreeBuilder::new(
            &self.variables,
            &self.features,
            self.config.min_subjects_per_leaf,
        )
        .build(self.data.all())
    }

    /// Flattens `tree` with node ids starting at 1.
    pub fn summarize(&self, tree: &Tree) -> Summary {
        self.summarize_from(tree, 1)
    }

    /// Flattens `tree` with node ids starting at `first_id`.
    pub fn summarize_from(&self, tree: &Tree, first_id: u64) -> Summary {
        flatten_from(tree, first_id)
    }

    pub fn assign_to_leaf<R: Record + ?Sized>(
        &self,
        summary: &Summary,
        record: &R,
    ) -> IoiResult<LeafLabel> {
        Router::new(summary)?.route(record)
    }

    /// Leaf label of every dataset row, in row order.
    pub fn assign_rows(&self, summary: &Summary) -> IoiResult<Vec<LeafLabel>> {
        let router = Router::new(summary)?;
        (0..self.data.n_rows())
            .map(|i| router.route(&self.data.row(i)))
            .collect()
    }

    /// Per-feature IOI and sizes of each leaf of `tree`, in pre-order.
    ///
    /// Labels match a summary produced by [`IoiSplitter::summarize`].
    pub fn leaf_reports(&self, tree: &Tree) -> Vec<LeafReport> {
        flat_leaves(tree, 1)
            .into_iter()
            .filter_map(|leaf| match tree.node(leaf.node) {
                TreeNode::Leaf { rows, depth } => {
                    let subset = self.data.subset(rows.clone());
                    let per_feature = ioi(&subset, &self.features);
                    Some(LeafReport {
                        label: leaf.label,
                        depth: *depth,
                        n_rows: subset.len(),
                        n_subjects: subset.unique_subjects(),
                        mean_ioi: nan_mean(&per_feature),
                        ioi: per_feature,
                    })
                }
                TreeNode::Split { .. } => None,
            })
            .collect()
    }

    /// Copies the rows of one leaf into a standalone dataset.
    pub fn leaf_data(&self, tree: &Tree, leaf: NodeId) -> Option<Dataset> {
        match tree.node(leaf) {
            TreeNode::Leaf { rows, .. } => Some(self.data.select(rows)),
            TreeNode::Split { .. } => None,
        }
    }
}
