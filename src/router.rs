//! Routes records down a flattened tree to their leaf label.

use crate::config::Direction;
use crate::dataset::Record;
use crate::error::{IoiError, IoiResult};
use crate::summary::{LeafLabel, Summary, SummaryRow};
use std::collections::HashMap;

/// A summary indexed for repeated routing.
///
/// Building a router checks that the summary has exactly one depth-0 row.
/// A summary of a tree that never split has no rows and is rejected.
#[derive(Debug, Clone)]
pub struct Router<'s> {
    rows: &'s [SummaryRow],
    root: usize,
    children: HashMap<(u64, Direction), usize>,
}

impl<'s> Router<'s> {
    pub fn new(summary: &'s Summary) -> IoiResult<Self> {
        let rows = summary.rows.as_slice();
        let mut roots = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.depth == 0)
            .map(|(i, _)| i);
        let root = roots
            .next()
            .ok_or_else(|| IoiError::MalformedSummary("summary has no root row".into()))?;
        if roots.next().is_some() {
            return Err(IoiError::MalformedSummary(
                "summary has more than one root row".into(),
            ));
        }

        let mut children = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let (Some(parent), Some(direction)) = (row.parent_id, row.direction) {
                // First match wins, as a row-order scan would.
                children.entry((parent, direction)).or_insert(i);
            }
        }

        Ok(Router {
            rows,
            root,
            children,
        })
    }

    /// Follows the split rules from the root until no child row exists in the
    /// chosen direction.
    ///
    /// A covariate that is missing from the record, or `NaN`, goes right.
    pub fn route<R: Record + ?Sized>(&self, record: &R) -> IoiResult<LeafLabel> {
        let mut current = &self.rows[self.root];
        // A tree of n split rows is at most n steps deep.
        for _ in 0..=self.rows.len() {
            let value = record.value(&current.covariate).unwrap_or(f64::NAN);
            let direction = current.kind.direction(current.threshold, value);
            match self.children.get(&(current.node_id, direction)) {
                Some(&next) => current = &self.rows[next],
                None => {
                    return Ok(LeafLabel {
                        node_id: current.node_id,
                        direction,
                    });
                }
            }
        }
        Err(IoiError::MalformedSummary(
            "routing did not reach a leaf; parent links form a cycle".into(),
        ))
    }
}

/// Routes a single record. Prefer [`Router`] when routing many records.
pub fn assign_to_leaf<R: Record + ?Sized>(summary: &Summary, record: &R) -> IoiResult<LeafLabel> {
    Router::new(summary)?.route(record)
}
