//! Subtree traversal.
//!
//! Both iterators keep an explicit work stack, so traversal depth is bounded
//! by heap memory rather than the call stack. Every visited child is checked
//! against its owner's children list; on a malformed link the iterator yields
//! the error once and then stops.

use tracing::instrument;

use crate::domain::arena::MeldTree;
use crate::domain::error::TreeResult;
use crate::domain::node::{NodeId, TreeNode};

/// Matches every tag in [`MeldTree::iterate_tag`].
pub const ANY_TAG: &str = "*";

impl MeldTree {
    /// Lazy preorder traversal of the subtree rooted at `node`.
    pub fn iter(&self, node: NodeId) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, node)
    }

    /// Lazy postorder traversal (children before their parent).
    pub fn iter_postorder(&self, node: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, node)
    }

    /// Every node of the subtree in preorder, the node itself first.
    #[instrument(level = "trace", skip(self))]
    pub fn iterate(&self, node: NodeId) -> TreeResult<Vec<NodeId>> {
        self.iter(node).map(|item| item.map(|(idx, _)| idx)).collect()
    }

    /// Preorder nodes whose element name is `tag`; [`ANY_TAG`] matches all
    /// nodes including injected content.
    #[instrument(level = "trace", skip(self))]
    pub fn iterate_tag(&self, node: NodeId, tag: &str) -> TreeResult<Vec<NodeId>> {
        let mut nodes = Vec::new();
        for item in self.iter(node) {
            let (idx, tree_node) = item?;
            if tag == ANY_TAG || tree_node.data.tag.name() == Some(tag) {
                nodes.push(idx);
            }
        }
        Ok(nodes)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn postorder(&self, node: NodeId) -> TreeResult<Vec<NodeId>> {
        self.iter_postorder(node)
            .map(|item| item.map(|(idx, _)| idx))
            .collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn count_nodes(&self, node: NodeId) -> TreeResult<usize> {
        self.iter(node)
            .try_fold(0, |count, item| item.map(|_| count + 1))
    }
}

pub struct PreOrderIterator<'a> {
    tree: &'a MeldTree,
    /// (node, owner it was reached from)
    stack: Vec<(NodeId, Option<NodeId>)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a MeldTree, node: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(node, None)],
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = TreeResult<(NodeId, &'a TreeNode)>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let (current_idx, owner) = self.stack.pop()?;
        match resolve(tree, current_idx, owner) {
            Ok(node) => {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((child, Some(current_idx)));
                }
                Some(Ok((current_idx, node)))
            }
            Err(e) => {
                self.stack.clear();
                Some(Err(e))
            }
        }
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a MeldTree,
    /// (node, owner, children already pushed)
    stack: Vec<(NodeId, Option<NodeId>, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a MeldTree, node: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(node, None, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = TreeResult<(NodeId, &'a TreeNode)>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while let Some((current_idx, owner, visited)) = self.stack.pop() {
            let node = match resolve(tree, current_idx, owner) {
                Ok(node) => node,
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            };
            if visited {
                return Some(Ok((current_idx, node)));
            }
            self.stack.push((current_idx, owner, true));
            for &child in node.children.iter().rev() {
                self.stack.push((child, Some(current_idx), false));
            }
        }
        None
    }
}

fn resolve(tree: &MeldTree, node: NodeId, owner: Option<NodeId>) -> TreeResult<&TreeNode> {
    match owner {
        Some(parent) => tree.linked_child(parent, node),
        None => tree.node(node),
    }
}
