//! Domain layer: the node tree and its operations
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod arena;
pub mod clone;
pub mod content;
pub mod error;
pub mod iter;
pub mod meld;
pub mod node;

pub use arena::MeldTree;
pub use clone::CloneStrategy;
pub use error::{TreeError, TreeResult};
pub use iter::{PostOrderIterator, PreOrderIterator, ANY_TAG};
pub use meld::{MeldChanges, MeldDiff};
pub use node::{NodeData, NodeId, Tag, TreeNode, MELD_ID, MELD_NS_URL};
