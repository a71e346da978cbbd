//! Node payload and arena node types.

use std::collections::HashMap;
use std::fmt;

use generational_arena::Index;

/// Handle of a node inside a [`MeldTree`](crate::domain::MeldTree) arena.
pub type NodeId = Index;

pub const MELD_NS_URL: &str = "http://www.plope.com/software/meld3";

/// Reserved attribute key carrying a node's meld identifier.
pub const MELD_ID: &str = "{http://www.plope.com/software/meld3}id";

/// Element kind.
///
/// Injected content uses the dedicated `Replace` variant, so it can never
/// be confused with a markup element of any name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Element(String),
    Replace,
}

impl Tag {
    pub fn element(name: impl Into<String>) -> Self {
        Tag::Element(name.into())
    }

    /// Element name, `None` for the replace marker.
    pub fn name(&self) -> Option<&str> {
        match self {
            Tag::Element(name) => Some(name),
            Tag::Replace => None,
        }
    }

    #[inline]
    pub fn is_replace(&self) -> bool {
        matches!(self, Tag::Replace)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Element(name) => write!(f, "{}", name),
            Tag::Replace => write!(f, "<replace>"),
        }
    }
}

/// Value payload of a tree node.
///
/// Structure links (parent, children) are not part of the payload; they are
/// owned by the tree and only change through `MeldTree` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    /// Content before the first child
    pub text: Option<String>,
    /// Content after the closing tag, before the next sibling
    pub tail: Option<String>,
    /// Render `text` raw instead of escaped
    pub structure: bool,
}

impl NodeData {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            tag: Tag::element(name),
            attributes: HashMap::new(),
            text: None,
            tail: None,
            structure: false,
        }
    }

    /// Payload node used for content injection.
    pub fn replace(text: impl Into<String>, structure: bool) -> Self {
        Self {
            tag: Tag::Replace,
            attributes: HashMap::new(),
            text: Some(text.into()),
            tail: None,
            structure,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_meld_id(self, id: impl Into<String>) -> Self {
        self.with_attribute(MELD_ID, id)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_structure(mut self, structure: bool) -> Self {
        self.structure = structure;
        self
    }

    pub fn meld_id(&self) -> Option<&str> {
        self.attributes.get(MELD_ID).map(String::as_str)
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.meld_id() {
            Some(id) => write!(f, "{} (meld:id={})", self.tag, id),
            None => write!(f, "{}", self.tag),
        }
    }
}

/// Tree node in the arena-based document structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub(crate) parent: Option<NodeId>,
    /// Indices of child nodes in document order
    pub(crate) children: Vec<NodeId>,
}

impl TreeNode {
    pub(crate) fn new(data: NodeData, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_tag_is_not_an_element_name() {
        assert_ne!(Tag::Replace, Tag::element("replace"));
        assert_ne!(Tag::Replace, Tag::element("<replace>"));
        assert!(Tag::Replace.name().is_none());
    }

    #[test]
    fn test_builder_sets_meld_id_under_reserved_key() {
        let data = NodeData::element("span").with_meld_id("x").with_text("hi");
        assert_eq!(
            data.attributes.get("{http://www.plope.com/software/meld3}id"),
            Some(&"x".to_string())
        );
        assert_eq!(data.meld_id(), Some("x"));
        assert_eq!(data.to_string(), "span (meld:id=x)");
    }
}
