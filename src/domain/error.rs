//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::NodeId;

/// Domain errors represent violations of tree-shape rules.
/// Validation always happens before mutation, so an error leaves the map untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node is not part of this map: {0}")]
    InvalidParent(NodeId),

    #[error("label must not be empty: {0}")]
    EmptyLabel(NodeId),

    #[error("the root node cannot be deleted")]
    CannotDeleteRoot,

    #[error("root node has no siblings")]
    RootHasNoSiblings,

    #[error("moving {node} under {target} would create a cycle")]
    CycleDetected { node: NodeId, target: NodeId },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
