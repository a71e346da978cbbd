//! Meld identifier lookup and comparison.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::arena::MeldTree;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::NodeId;

/// Meld elements grouped by change kind.
///
/// `added` and `moved` hold nodes of the target tree, `removed` holds nodes
/// of the source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeldChanges {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub moved: Vec<NodeId>,
}

impl MeldChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeldDiff {
    pub unreduced: MeldChanges,
    /// Same changes without elements whose parent is already listed
    pub reduced: MeldChanges,
}

impl MeldTree {
    /// Meld identifier of a node, if it carries one.
    pub fn meld_id(&self, node: NodeId) -> TreeResult<Option<&str>> {
        Ok(self.data(node)?.meld_id())
    }

    /// First node in preorder whose meld id equals `id`.
    ///
    /// The search stops at the first match: neither the matching node's
    /// descendants nor anything after it is examined. When several nodes
    /// share an id the one closest to the start of the preorder wins.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, node: NodeId, id: &str) -> TreeResult<Option<NodeId>> {
        for item in self.iter(node) {
            let (idx, tree_node) = item?;
            if tree_node.data.meld_id() == Some(id) {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    /// Like [`find_by_id`](Self::find_by_id), but a missing id is an error.
    pub fn find_required(&self, node: NodeId, id: &str) -> TreeResult<NodeId> {
        self.find_by_id(node, id)?
            .ok_or_else(|| TreeError::MeldNotFound(id.to_string()))
    }

    /// Every node carrying a meld id, in preorder.
    #[instrument(level = "trace", skip(self))]
    pub fn find_melds(&self, node: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self.meld_pairs(node)?.into_iter().map(|(idx, _)| idx).collect())
    }

    /// Every node whose meld id equals `id`, in preorder.
    #[instrument(level = "trace", skip(self))]
    pub fn find_all_by_id(&self, node: NodeId, id: &str) -> TreeResult<Vec<NodeId>> {
        Ok(self
            .meld_pairs(node)?
            .into_iter()
            .filter(|(_, meld_id)| *meld_id == id)
            .map(|(idx, _)| idx)
            .collect())
    }

    /// Compares the meld elements under `node` (source) with those under
    /// `target_node` in `target`.
    ///
    /// Ids only in the target are added, ids only in the source are removed.
    /// An id present in both has moved when the tag chains of its ancestors
    /// differ; the first target element carrying the id is the one compared.
    #[instrument(level = "debug", skip(self, target))]
    pub fn diff_melds(
        &self,
        node: NodeId,
        target: &MeldTree,
        target_node: NodeId,
    ) -> TreeResult<MeldDiff> {
        let source_melds = self.meld_pairs(node)?;
        let target_melds = target.meld_pairs(target_node)?;

        let source_ids: HashSet<&str> = source_melds.iter().map(|(_, id)| *id).collect();
        let mut first_target: HashMap<&str, NodeId> = HashMap::new();
        for (idx, id) in &target_melds {
            first_target.entry(*id).or_insert(*idx);
        }

        let removed: Vec<NodeId> = source_melds
            .iter()
            .filter(|(_, id)| !first_target.contains_key(id))
            .map(|(idx, _)| *idx)
            .collect();

        let added: Vec<NodeId> = target_melds
            .iter()
            .filter(|(_, id)| !source_ids.contains(id))
            .map(|(idx, _)| *idx)
            .collect();

        let mut moved = Vec::new();
        for (source_idx, id) in &source_melds {
            if let Some(&target_idx) = first_target.get(id) {
                if !shared_lineage(self, *source_idx, target, target_idx)? {
                    moved.push(target_idx);
                }
            }
        }

        let reduced = MeldChanges {
            added: target.reduce_changes(&added)?,
            removed: self.reduce_changes(&removed)?,
            moved: target.reduce_changes(&moved)?,
        };
        debug!(
            added = added.len(),
            removed = removed.len(),
            moved = moved.len(),
            "diffed meld elements"
        );
        Ok(MeldDiff {
            unreduced: MeldChanges {
                added,
                removed,
                moved,
            },
            reduced,
        })
    }

    fn meld_pairs(&self, node: NodeId) -> TreeResult<Vec<(NodeId, &str)>> {
        let mut pairs = Vec::new();
        for item in self.iter(node) {
            let (idx, tree_node) = item?;
            if let Some(id) = tree_node.data.meld_id() {
                pairs.push((idx, id));
            }
        }
        Ok(pairs)
    }

    /// Drops elements whose direct parent is already kept. Expects preorder.
    fn reduce_changes(&self, elements: &[NodeId]) -> TreeResult<Vec<NodeId>> {
        let mut reduced: Vec<NodeId> = Vec::new();
        for &element in elements {
            match self.node(element)?.parent() {
                Some(parent) if reduced.contains(&parent) => continue,
                _ => reduced.push(element),
            }
        }
        Ok(reduced)
    }
}

/// True when both nodes sit under ancestor chains with the same tags all the
/// way up to their roots.
fn shared_lineage(
    source: &MeldTree,
    mut source_idx: NodeId,
    target: &MeldTree,
    mut target_idx: NodeId,
) -> TreeResult<bool> {
    let limit = source.len().max(target.len());
    for _ in 0..=limit {
        let source_parent = source.node(source_idx)?.parent();
        let target_parent = target.node(target_idx)?.parent();
        match (source_parent, target_parent) {
            (None, None) => return Ok(true),
            (Some(sp), Some(tp)) => {
                if source.data(sp)?.tag != target.data(tp)?.tag {
                    return Ok(false);
                }
                source_idx = sp;
                target_idx = tp;
            }
            _ => return Ok(false),
        }
    }
    Err(TreeError::structural(source_idx, "parent links form a cycle"))
}
