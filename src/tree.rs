//! Binary split tree and its builder.
//!
//! Nodes live in an arena (`Vec<TreeNode>`) and refer to their children by
//! [`NodeId`]. The root is always `NodeId(0)`. Building uses an explicit work
//! stack, so deeply unbalanced trees do not grow the call stack.

use crate::dataset::Subset;
use crate::split::{SplitRule, SplitVariable, find_best_split};
use tracing::{debug, info};

/// Index of a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// Terminal node holding the dataset rows routed to it.
    Leaf { rows: Vec<usize>, depth: usize },
    /// Internal node with the winning rule and the weighted IOI it achieved.
    Split {
        rule: SplitRule,
        objective: f64,
        left: NodeId,
        right: NodeId,
        depth: usize,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { depth, .. } | TreeNode::Split { depth, .. } => *depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }
}

/// A fitted split tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Total number of nodes, leaves included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when no split was ever made.
    pub fn is_leaf(&self) -> bool {
        self.node(self.root()).is_leaf()
    }

    pub fn n_splits(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_leaf()).count()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Leaves in pre-order (left subtree before right subtree).
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.node(id).is_leaf())
            .collect()
    }

    /// Row indices of each leaf, in pre-order.
    pub fn leaf_rows(&self) -> Vec<&[usize]> {
        self.leaves()
            .into_iter()
            .filter_map(|id| match self.node(id) {
                TreeNode::Leaf { rows, .. } => Some(rows.as_slice()),
                TreeNode::Split { .. } => None,
            })
            .collect()
    }

    /// Node ids in pre-order: node, left subtree, right subtree.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let TreeNode::Split { left, right, .. } = self.node(id) {
                stack.push(*right);
                stack.push(*left);
            }
        }
        order
    }
}

/// Grows a [`Tree`] by repeated greedy splitting.
#[derive(Debug, Clone)]
pub struct TreeBuilder<'v> {
    variables: &'v [SplitVariable],
    features: &'v [usize],
    min_subjects_per_leaf: usize,
}

impl<'v> TreeBuilder<'v> {
    pub fn new(
        variables: &'v [SplitVariable],
        features: &'v [usize],
        min_subjects_per_leaf: usize,
    ) -> Self {
        TreeBuilder {
            variables,
            features,
            min_subjects_per_leaf,
        }
    }

    /// Builds the tree for `subset`.
    ///
    /// A node becomes a leaf when it has fewer than `2 * min_subjects_per_leaf`
    /// distinct subjects, or when no candidate split leaves at least
    /// `min_subjects_per_leaf` subjects on both sides.
    pub fn build(&self, subset: Subset<'_>) -> Tree {
        let data = subset.data();
        let mut nodes = vec![TreeNode::Leaf {
            rows: subset.into_rows(),
            depth: 0,
        }];
        let mut pending = vec![NodeId(0)];

        while let Some(id) = pending.pop() {
            let (rows, depth) = match &mut nodes[id.0] {
                TreeNode::Leaf { rows, depth } => (std::mem::take(rows), *depth),
                TreeNode::Split { .. } => continue,
            };
            let subset = data.subset(rows);

            match self.split_node(&subset, depth) {
                Some((rule, objective)) => {
                    let (left_rows, right_rows) = rule.partition(&subset);
                    let left = NodeId(nodes.len());
                    nodes.push(TreeNode::Leaf {
                        rows: left_rows.into_rows(),
                        depth: depth + 1,
                    });
                    let right = NodeId(nodes.len());
                    nodes.push(TreeNode::Leaf {
                        rows: right_rows.into_rows(),
                        depth: depth + 1,
                    });
                    nodes[id.0] = TreeNode::Split {
                        rule,
                        objective,
                        left,
                        right,
                        depth,
                    };
                    // Left is popped first, so nodes are expanded in pre-order.
                    pending.push(right);
                    pending.push(left);
                }
                None => {
                    nodes[id.0] = TreeNode::Leaf {
                        rows: subset.into_rows(),
                        depth,
                    };
                }
            }
        }

        Tree { nodes }
    }

    fn split_node(&self, subset: &Subset<'_>, depth: usize) -> Option<(SplitRule, f64)> {
        let n_subjects = subset.unique_subjects();
        if n_subjects < self.min_subjects_per_leaf.saturating_mul(2) {
            debug!(depth, n_subjects, "too few subjects to split");
            return None;
        }

        let best = find_best_split(
            subset,
            self.variables,
            self.features,
            self.min_subjects_per_leaf,
        );
        let Some(rule) = best.rule else {
            info!(depth, n_subjects, n_rows = subset.len(), "no viable split");
            return None;
        };

        debug!(
            depth,
            covariate = %rule.covariate,
            threshold = rule.threshold,
            objective = best.objective,
            "split accepted"
        );
        Some((rule, best.objective))
    }
}
