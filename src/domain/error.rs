//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Tree errors represent violations of the node-tree contract.
///
/// A lookup that simply has no result is not an error: `find_by_id`
/// returns `Ok(None)` for that case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node not found in tree: {0:?}")]
    NodeNotFound(NodeId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("structural contract violation at {node:?}: {reason}")]
    StructuralViolation { node: NodeId, reason: String },

    #[error("operation would create cycle: {ancestor:?} is an ancestor of {descendant:?}")]
    CycleDetected {
        ancestor: NodeId,
        descendant: NodeId,
    },

    #[error("no element with meld id: {0}")]
    MeldNotFound(String),
}

impl TreeError {
    pub(crate) fn structural(node: NodeId, reason: impl Into<String>) -> Self {
        Self::StructuralViolation {
            node,
            reason: reason.into(),
        }
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
