//! Template slot filling.

use tracing::{debug, instrument};

use crate::domain::arena::MeldTree;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{NodeData, NodeId};

impl MeldTree {
    /// Replaces `node`'s text and children with a single [`Tag::Replace`]
    /// child carrying `payload`. The previous children are freed.
    ///
    /// Returns the id of the injected payload node.
    ///
    /// [`Tag::Replace`]: crate::domain::Tag::Replace
    #[instrument(level = "trace", skip(self, payload))]
    pub fn inject_content(
        &mut self,
        node: NodeId,
        payload: impl Into<String>,
        structure: bool,
    ) -> TreeResult<NodeId> {
        // the whole old subtree must be sound before anything changes
        let mut dropped = self.postorder(node)?;
        dropped.pop();

        let payload_idx = self.insert_node(NodeData::replace(payload, structure), Some(node))?;
        let target = self.node_mut(node)?;
        target.data.text = None;
        target.children = vec![payload_idx];

        self.free_all(&dropped);
        debug!(?node, ?payload_idx, dropped = dropped.len(), "injected content");
        Ok(payload_idx)
    }

    /// Puts a [`Tag::Replace`] node carrying `payload` at `node`'s position in
    /// its parent and frees `node`'s subtree.
    ///
    /// Returns the position, or `None` without touching anything when `node`
    /// is a root.
    ///
    /// [`Tag::Replace`]: crate::domain::Tag::Replace
    #[instrument(level = "trace", skip(self, payload))]
    pub fn replace(
        &mut self,
        node: NodeId,
        payload: impl Into<String>,
        structure: bool,
    ) -> TreeResult<Option<usize>> {
        let Some(parent) = self.node(node)?.parent() else {
            return Ok(None);
        };
        let doomed = self.postorder(node)?;
        let position = self
            .unlink(node)?
            .ok_or_else(|| TreeError::structural(node, "parent link vanished during replace"))?;

        let payload_idx = self.insert_node(NodeData::replace(payload, structure), Some(parent))?;
        self.insert(parent, position, payload_idx)?;

        self.free_all(&doomed);
        debug!(?node, ?payload_idx, position, "replaced node");
        Ok(Some(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Tag;

    #[test]
    fn test_inject_content_frees_previous_subtree() {
        let mut tree = MeldTree::new();
        let root = tree.insert_node(NodeData::element("td"), None).unwrap();
        let b = tree.insert_node(NodeData::element("b"), Some(root)).unwrap();
        let i = tree.insert_node(NodeData::element("i"), Some(b)).unwrap();

        let injected = tree.inject_content(root, "x", false).unwrap();

        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(b));
        assert!(!tree.contains(i));
        assert_eq!(tree.data(injected).unwrap().tag, Tag::Replace);
    }

    #[test]
    fn test_inject_content_on_corrupt_subtree_changes_nothing() {
        let mut tree = MeldTree::new();
        let root = tree
            .insert_node(NodeData::element("td").with_text("old"), None)
            .unwrap();
        let b = tree.insert_node(NodeData::element("b"), Some(root)).unwrap();
        let i = tree.insert_node(NodeData::element("i"), Some(b)).unwrap();
        tree.free_all(&[i]);

        assert!(tree.inject_content(root, "x", false).is_err());
        assert_eq!(tree.data(root).unwrap().text.as_deref(), Some("old"));
        assert_eq!(tree.node(root).unwrap().children(), &[b]);
        assert_eq!(tree.len(), 2);
    }
}
