//! Diagnostic rendering of node trees with `termtree`.

use std::collections::HashMap;

use termtree::Tree;
use tracing::instrument;

use crate::config::DisplayConfig;
use crate::domain::{MeldTree, NodeData, NodeId, TreeError, TreeResult, MELD_ID};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for MeldTree {
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => self
                .render(root, &DisplayConfig::default())
                .unwrap_or_else(|e| Tree::new(format!("invalid tree: {}", e))),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

impl MeldTree {
    /// Renders the subtree rooted at `node`.
    ///
    /// Built bottom-up from a postorder walk: each node's rendering is
    /// assembled once all of its children are done.
    #[instrument(level = "debug", skip(self, display))]
    pub fn render(&self, node: NodeId, display: &DisplayConfig) -> TreeResult<Tree<String>> {
        let mut built: HashMap<NodeId, Tree<String>> = HashMap::new();
        for item in self.iter_postorder(node) {
            let (idx, tree_node) = item?;
            let leaves: Vec<Tree<String>> = tree_node
                .children()
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(
                idx,
                Tree::new(label(&tree_node.data, display)).with_leaves(leaves),
            );
        }
        built.remove(&node).ok_or(TreeError::NodeNotFound(node))
    }
}

fn label(data: &NodeData, display: &DisplayConfig) -> String {
    let mut label = data.tag.to_string();
    if data.tag.is_replace() && data.structure {
        label.push_str(" (raw)");
    }

    if display.show_attributes && !data.attributes.is_empty() {
        let mut attributes: Vec<(&String, &String)> = data.attributes.iter().collect();
        attributes.sort();
        let rendered: Vec<String> = attributes
            .into_iter()
            .map(|(key, value)| {
                let key = if key == MELD_ID { "meld:id" } else { key.as_str() };
                format!("{}={:?}", key, value)
            })
            .collect();
        label.push_str(&format!(" [{}]", rendered.join(" ")));
    }

    if display.show_text {
        if let Some(text) = &data.text {
            label.push_str(&format!(" {:?}", text));
        }
        if let Some(tail) = &data.tail {
            label.push_str(&format!(" tail={:?}", tail));
        }
    }
    label
}
