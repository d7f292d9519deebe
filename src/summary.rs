//! Flat, tabular form of a fitted tree.
//!
//! Split nodes are numbered in pre-order starting from a caller-chosen id.
//! Leaves get no row of their own; a leaf is named by its parent's id and the
//! direction it hangs off, e.g. `"3_left"`.

use crate::config::{CovariateKind, Direction};
use crate::tree::{NodeId, Tree, TreeNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One split node of a flattened tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub node_id: u64,
    pub depth: usize,
    pub covariate: String,
    pub kind: CovariateKind,
    #[serde(with = "non_finite")]
    pub threshold: f64,
    /// Weighted IOI of the split. Infinite when a child has no between-subject spread.
    #[serde(with = "non_finite")]
    pub ioi: f64,
    pub parent_id: Option<u64>,
    pub direction: Option<Direction>,
}

/// Floats that may be infinite or `NaN`, written as `"inf"`, `"-inf"` or
/// `"NaN"` since JSON numbers cannot hold them.
mod non_finite {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(de::Error::custom(format!("not a float: {other}"))),
            },
        }
    }
}

/// Flattened split nodes plus the next unused node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub next_node_id: u64,
}

impl Summary {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows at depth 0.
    pub fn roots(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(|row| row.depth == 0)
    }

    pub fn children(&self, node_id: u64) -> impl Iterator<Item = &SummaryRow> {
        self.rows
            .iter()
            .filter(move |row| row.parent_id == Some(node_id))
    }
}

/// Identifies a leaf by its parent split and the side it hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeafLabel {
    pub node_id: u64,
    pub direction: Direction,
}

impl fmt::Display for LeafLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.node_id, self.direction)
    }
}

/// A leaf of a flattened tree and the label a router assigns to it.
///
/// `label` is `None` only when the whole tree is a single leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatLeaf {
    pub node: NodeId,
    pub label: Option<LeafLabel>,
}

/// Flattens `tree`, numbering split nodes from 1.
pub fn flatten(tree: &Tree) -> Summary {
    flatten_from(tree, 1)
}

/// Flattens `tree`, numbering split nodes from `first_id`.
///
/// Use the returned `next_node_id` as `first_id` of the next tree to keep ids
/// disjoint across several trees.
pub fn flatten_from(tree: &Tree, first_id: u64) -> Summary {
    walk(tree, first_id).0
}

/// Leaves of `tree` in pre-order, labelled as if flattened from `first_id`.
pub fn flat_leaves(tree: &Tree, first_id: u64) -> Vec<FlatLeaf> {
    walk(tree, first_id).1
}

struct Frame {
    node: NodeId,
    parent: Option<(u64, Direction)>,
}

fn walk(tree: &Tree, first_id: u64) -> (Summary, Vec<FlatLeaf>) {
    let mut rows = Vec::new();
    let mut leaves = Vec::new();
    let mut next_id = first_id;
    let mut stack = vec![Frame {
        node: tree.root(),
        parent: None,
    }];

    while let Some(frame) = stack.pop() {
        match tree.node(frame.node) {
            TreeNode::Leaf { .. } => leaves.push(FlatLeaf {
                node: frame.node,
                label: frame.parent.map(|(node_id, direction)| LeafLabel {
                    node_id,
                    direction,
                }),
            }),
            TreeNode::Split {
                rule,
                objective,
                left,
                right,
                depth,
            } => {
                let node_id = next_id;
                next_id += 1;
                rows.push(SummaryRow {
                    node_id,
                    depth: *depth,
                    covariate: rule.covariate.clone(),
                    kind: rule.kind,
                    threshold: rule.threshold,
                    ioi: *objective,
                    parent_id: frame.parent.map(|(id, _)| id),
                    direction: frame.parent.map(|(_, d)| d),
                });
                stack.push(Frame {
                    node: *right,
                    parent: Some((node_id, Direction::Right)),
                });
                stack.push(Frame {
                    node: *left,
                    parent: Some((node_id, Direction::Left)),
                });
            }
        }
    }

    (
        Summary {
            rows,
            next_node_id: next_id,
        },
        leaves,
    )
}
