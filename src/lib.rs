//! # meldtree
//!
//! Node-tree core for meld-style templating. A [`MeldTree`] holds an
//! already-built markup document (tags, attributes, text and tail content)
//! in an arena; the templating layer mutates it through four operations
//! before the tree is serialized again:
//!
//! - [`MeldTree::clone_node`]: structural deep copy, optionally grafted
//!   under a parent
//! - [`MeldTree::iterate`]: preorder traversal of a subtree
//! - [`MeldTree::find_by_id`]: first node carrying a meld identifier
//! - [`MeldTree::inject_content`]: fill a template slot with a payload node
//!
//! ```rust
//! use meldtree::{MeldTree, NodeData, Tag};
//!
//! let mut tree = MeldTree::new();
//! let div = tree.insert_node(NodeData::element("div"), None)?;
//! let span = tree.insert_node(
//!     NodeData::element("span").with_meld_id("x").with_text("hi"),
//!     Some(div),
//! )?;
//!
//! assert_eq!(tree.find_by_id(div, "x")?, Some(span));
//! tree.inject_content(span, "hello", false)?;
//! let payload = tree.node(span)?.children()[0];
//! assert_eq!(tree.data(payload)?.tag, Tag::Replace);
//! # Ok::<(), meldtree::TreeError>(())
//! ```
//!
//! The tree is single-threaded and single-owner; callers serialize access.

use termtree::Tree;

pub mod config;
pub mod domain;
pub mod errors;
pub mod tree_traits;
pub mod util;

pub use config::{DisplayConfig, Settings};
pub use domain::{
    CloneStrategy, MeldChanges, MeldDiff, MeldTree, NodeData, NodeId, Tag, TreeError, TreeNode,
    TreeResult, MELD_ID,
};
pub use errors::{MeldError, MeldResult};
pub use tree_traits::TreeNodeConvert;

/// Clones `node` using the strategy configured in `settings`.
pub fn clone_with_settings(
    tree: &mut MeldTree,
    node: NodeId,
    parent: Option<NodeId>,
    settings: &Settings,
) -> MeldResult<NodeId> {
    Ok(tree.clone_with(node, parent, settings.clone_strategy)?)
}

/// Renders the subtree at `node` with the configured display options.
pub fn render_with_settings(
    tree: &MeldTree,
    node: NodeId,
    settings: &Settings,
) -> MeldResult<Tree<String>> {
    Ok(tree.render(node, &settings.display)?)
}
