//! Structural deep cloning.
//!
//! A clone runs in two phases: the source subtree is walked and copied into a
//! flat plan (validating every link on the way), then the plan is grafted
//! into the destination. Nothing is inserted until the whole source has been
//! read, so a malformed source never leaves a half-built copy behind.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::MeldTree;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{NodeData, NodeId};

/// Order in which the source subtree is walked. Both produce identical copies.
///
/// Deserializes through [`FromStr`], so config files accept the same
/// spellings as environment overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum CloneStrategy {
    #[default]
    DepthFirst,
    BreadthFirst,
}

impl fmt::Display for CloneStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneStrategy::DepthFirst => write!(f, "depth_first"),
            CloneStrategy::BreadthFirst => write!(f, "breadth_first"),
        }
    }
}

impl FromStr for CloneStrategy {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "depth_first" | "dfs" => Ok(CloneStrategy::DepthFirst),
            "breadth_first" | "bfs" => Ok(CloneStrategy::BreadthFirst),
            other => Err(TreeError::InvalidArgument(format!(
                "unknown clone strategy: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for CloneStrategy {
    type Error = TreeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug)]
struct PlannedNode {
    data: NodeData,
    /// Position of the parent's copy in the plan, None for the clone root
    parent_slot: Option<usize>,
}

impl MeldTree {
    /// Deep-copies `node`'s subtree within this tree. With a parent the copy
    /// is appended as its last child, otherwise it is a detached root; the
    /// document root is never changed.
    pub fn clone_node(&mut self, node: NodeId, parent: Option<NodeId>) -> TreeResult<NodeId> {
        self.clone_with(node, parent, CloneStrategy::default())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn clone_with(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        strategy: CloneStrategy,
    ) -> TreeResult<NodeId> {
        let plan = self.plan_clone(node, strategy)?;
        let copy = self.graft(plan, parent)?;
        debug!(?node, ?copy, ?parent, %strategy, "cloned subtree");
        Ok(copy)
    }

    /// Deep-copies `node`'s subtree into another tree.
    #[instrument(level = "trace", skip(self, dest))]
    pub fn clone_into(
        &self,
        node: NodeId,
        dest: &mut MeldTree,
        parent: Option<NodeId>,
        strategy: CloneStrategy,
    ) -> TreeResult<NodeId> {
        let plan = self.plan_clone(node, strategy)?;
        dest.graft(plan, parent)
    }

    /// Deep-copies `node`'s subtree into a fresh tree rooted at the copy.
    #[instrument(level = "trace", skip(self))]
    pub fn clone_tree(&self, node: NodeId) -> TreeResult<MeldTree> {
        let mut tree = MeldTree::new();
        let copy = self.clone_into(node, &mut tree, None, CloneStrategy::default())?;
        tree.set_root(copy)?;
        Ok(tree)
    }

    fn plan_clone(&self, node: NodeId, strategy: CloneStrategy) -> TreeResult<Vec<PlannedNode>> {
        let mut plan = Vec::new();
        // (source node, owner it was reached from, parent slot in plan)
        let mut pending = VecDeque::new();
        pending.push_back((node, None, None));

        loop {
            let next = match strategy {
                CloneStrategy::DepthFirst => pending.pop_back(),
                CloneStrategy::BreadthFirst => pending.pop_front(),
            };
            let Some((current, owner, parent_slot)) = next else {
                break;
            };
            let source = match owner {
                Some(owner) => self.linked_child(owner, current)?,
                None => self.node(current)?,
            };

            let slot = plan.len();
            plan.push(PlannedNode {
                data: source.data.clone(),
                parent_slot,
            });

            match strategy {
                CloneStrategy::DepthFirst => {
                    for &child in source.children().iter().rev() {
                        pending.push_back((child, Some(current), Some(slot)));
                    }
                }
                CloneStrategy::BreadthFirst => {
                    for &child in source.children() {
                        pending.push_back((child, Some(current), Some(slot)));
                    }
                }
            }
        }
        Ok(plan)
    }

    fn graft(&mut self, plan: Vec<PlannedNode>, parent: Option<NodeId>) -> TreeResult<NodeId> {
        if let Some(parent_idx) = parent {
            self.node(parent_idx)?;
        }

        let mut slots: Vec<NodeId> = Vec::with_capacity(plan.len());
        let mut copy_root = None;
        for planned in plan {
            let owner = match planned.parent_slot {
                Some(slot) => Some(slots.get(slot).copied().ok_or_else(|| {
                    TreeError::InvalidArgument(format!("clone plan refers to unknown slot {}", slot))
                })?),
                None => parent,
            };
            let idx = self.insert_unrooted(planned.data, owner)?;
            if planned.parent_slot.is_none() {
                copy_root = Some(idx);
            }
            slots.push(idx);
        }

        copy_root.ok_or_else(|| TreeError::InvalidArgument("empty clone plan".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_clone_leaves_parent_untouched() {
        let mut tree = MeldTree::new();
        let root = tree.insert_node(NodeData::element("div"), None).unwrap();
        let ul = tree.insert_node(NodeData::element("ul"), Some(root)).unwrap();
        let li = tree.insert_node(NodeData::element("li"), Some(ul)).unwrap();
        tree.insert_node(NodeData::element("li"), Some(ul)).unwrap();
        tree.free_all(&[li]);
        let before = tree.len();

        for strategy in [CloneStrategy::DepthFirst, CloneStrategy::BreadthFirst] {
            let err = tree.clone_with(ul, Some(root), strategy).unwrap_err();
            assert!(matches!(err, TreeError::StructuralViolation { .. }));
            assert_eq!(tree.node(root).unwrap().children(), &[ul]);
            assert_eq!(tree.len(), before);
        }
    }

    #[test]
    fn test_strategy_parses_from_config_spelling() {
        assert_eq!(
            "breadth-first".parse::<CloneStrategy>().unwrap(),
            CloneStrategy::BreadthFirst
        );
        assert_eq!("DFS".parse::<CloneStrategy>().unwrap(), CloneStrategy::DepthFirst);
        assert!("sideways".parse::<CloneStrategy>().is_err());
    }
}
