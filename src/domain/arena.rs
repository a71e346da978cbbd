use std::collections::VecDeque;

use generational_arena::Arena;
use tracing::{debug, instrument, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{NodeData, NodeId, TreeNode};

/// Arena-based document tree.
///
/// Every node is owned by the arena; ownership is still tree-shaped because a
/// node is reachable from exactly one parent's `children` list (or is a
/// detached root). Parent links are plain indices and never keep a node alive.
#[derive(Debug)]
pub struct MeldTree {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Document root, None for empty trees
    root: Option<NodeId>,
}

impl Default for MeldTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MeldTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Creates a node. With a parent it becomes that parent's last child,
    /// without one it is a detached root (and the document root if the tree
    /// has none yet).
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<NodeId>) -> TreeResult<NodeId> {
        let node_idx = self.insert_unrooted(data, parent)?;
        if parent.is_none() && self.root.is_none() {
            self.root = Some(node_idx);
        }
        Ok(node_idx)
    }

    /// Like [`insert_node`](Self::insert_node) but never claims the document
    /// root.
    pub(crate) fn insert_unrooted(
        &mut self,
        data: NodeData,
        parent: Option<NodeId>,
    ) -> TreeResult<NodeId> {
        if let Some(parent_idx) = parent {
            self.node(parent_idx)?;
        }
        let node_idx = self.arena.insert(TreeNode::new(data, parent));
        if let Some(parent_idx) = parent {
            self.node_mut(parent_idx)?.children.push(node_idx);
        }
        Ok(node_idx)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes a detached node the document root.
    #[instrument(level = "trace", skip(self))]
    pub fn set_root(&mut self, id: NodeId) -> TreeResult<()> {
        if self.node(id)?.parent.is_some() {
            return Err(TreeError::InvalidArgument(format!(
                "{:?} is attached to a parent and cannot be the root",
                id
            )));
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&TreeNode> {
        self.arena.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode> {
        self.arena.get_mut(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn data(&self, id: NodeId) -> TreeResult<&NodeData> {
        Ok(&self.node(id)?.data)
    }

    pub fn data_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeData> {
        Ok(&mut self.node_mut(id)?.data)
    }

    /// Resolves `child` as it appears in `parent`'s children list and checks
    /// that its parent link points back.
    pub(crate) fn linked_child(&self, parent: NodeId, child: NodeId) -> TreeResult<&TreeNode> {
        let node = self.arena.get(child).ok_or_else(|| {
            warn!(?parent, ?child, "dangling child index");
            TreeError::structural(parent, format!("child {:?} is not in the tree", child))
        })?;
        if node.parent != Some(parent) {
            warn!(?parent, ?child, found = ?node.parent, "parent link mismatch");
            return Err(TreeError::structural(
                child,
                format!(
                    "parent link {:?} does not match owning node {:?}",
                    node.parent, parent
                ),
            ));
        }
        Ok(node)
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    #[instrument(level = "trace", skip(self))]
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.check_attachable(parent, child)?;
        self.unlink(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.reseat_root(child)?;
        Ok(())
    }

    /// Inserts `child` at `index` in `parent`'s children, detaching it from
    /// its current parent first. `index` counts positions after the detach.
    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        self.check_attachable(parent, child)?;
        let mut len = self.node(parent)?.children.len();
        if self.node(child)?.parent == Some(parent) {
            len -= 1;
        }
        if index > len {
            return Err(TreeError::InvalidArgument(format!(
                "index {} out of range for {} children",
                index, len
            )));
        }
        self.unlink(child)?;
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.reseat_root(child)?;
        Ok(())
    }

    /// Unlinks a node from its parent and returns its former position.
    /// Roots are left alone and yield `None`.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, id: NodeId) -> TreeResult<Option<usize>> {
        self.unlink(id)
    }

    /// Position of a node in its parent's children, `None` for roots.
    #[instrument(level = "trace", skip(self))]
    pub fn parent_index(&self, id: NodeId) -> TreeResult<Option<usize>> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        let siblings = &self
            .arena
            .get(parent)
            .ok_or_else(|| TreeError::structural(id, "parent link points outside the tree"))?
            .children;
        siblings
            .iter()
            .position(|&sibling| sibling == id)
            .map(Some)
            .ok_or_else(|| TreeError::structural(id, "node is missing from its parent's children"))
    }

    /// Detaches a node and frees its whole subtree. Returns the number of
    /// freed nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> TreeResult<usize> {
        let doomed = self.postorder(id)?;
        self.unlink(id)?;
        self.free_all(&doomed);
        if self.root == Some(id) {
            self.root = None;
        }
        debug!(?id, freed = doomed.len(), "removed subtree");
        Ok(doomed.len())
    }

    /// The node followed by its ancestors, ending at the top of its tree.
    #[instrument(level = "trace", skip(self))]
    pub fn lineage(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut lineage = vec![id];
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            if lineage.len() > self.arena.len() {
                return Err(TreeError::structural(id, "parent links form a cycle"));
            }
            current = self
                .arena
                .get(parent)
                .ok_or_else(|| TreeError::structural(id, "parent link points outside the tree"))?;
            lineage.push(parent);
        }
        Ok(lineage)
    }

    /// Height of the subtree rooted at `id`, counted in levels.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        let mut max_depth = 0;
        let mut queue = VecDeque::new();
        queue.push_back((id, 1));

        while let Some((current, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for &child in self.node(current)?.children() {
                self.linked_child(current, child)?;
                queue.push_back((child, depth + 1));
            }
        }
        Ok(max_depth)
    }

    pub(crate) fn unlink(&mut self, id: NodeId) -> TreeResult<Option<usize>> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        let siblings = &mut self
            .arena
            .get_mut(parent)
            .ok_or_else(|| TreeError::structural(id, "parent link points outside the tree"))?
            .children;
        let position = siblings
            .iter()
            .position(|&sibling| sibling == id)
            .ok_or_else(|| TreeError::structural(id, "node is missing from its parent's children"))?;
        siblings.remove(position);
        self.node_mut(id)?.parent = None;
        Ok(Some(position))
    }

    pub(crate) fn free_all(&mut self, ids: &[NodeId]) {
        for &idx in ids {
            self.arena.remove(idx);
        }
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.node(child)?;
        if self.lineage(parent)?.contains(&child) {
            return Err(TreeError::CycleDetected {
                ancestor: child,
                descendant: parent,
            });
        }
        Ok(())
    }

    /// Keeps `root` pointing at a top-level node after the old root got
    /// attached somewhere.
    fn reseat_root(&mut self, attached: NodeId) -> TreeResult<()> {
        if self.root == Some(attached) {
            self.root = self.lineage(attached)?.last().copied();
        }
        Ok(())
    }
}
