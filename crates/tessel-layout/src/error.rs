//! Error types for tree edits, measurement and drop-zone geometry.

use thiserror::Error;

use crate::tree::NodeId;

/// Result alias used throughout the crate.
pub type DockResult<T> = Result<T, DockError>;

/// Why an edit or a geometry pass was rejected.
///
/// Every variant except [`DockError::Invariant`] describes bad caller input;
/// the caller's tree is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockError {
    #[error("node {node_id} not found")]
    MissingNode { node_id: NodeId },

    #[error("node {node_id} is not a container")]
    NotAContainer { node_id: NodeId },

    #[error("operation requires distinct nodes, got {node_id} twice")]
    SameNode { node_id: NodeId },

    #[error("operation would create cycle: node {ancestor} is an ancestor of {descendant}")]
    AncestorConflict {
        ancestor: NodeId,
        descendant: NodeId,
    },

    #[error("target {target} was folded away while detaching the moving node")]
    TargetRemovedByDetach { target: NodeId },

    #[error("grow for node {node_id} must be finite and positive, got {grow}")]
    InvalidGrow { node_id: NodeId, grow: f64 },

    #[error("min size for node {node_id} must be finite and non-negative, got {min_size}")]
    InvalidMinSize { node_id: NodeId, min_size: f64 },

    #[error("children of container {node_id} have zero total grow")]
    ZeroTotalGrow { node_id: NodeId },

    #[error("no measured insets for node {node_id}")]
    MissingInsets { node_id: NodeId },

    #[error("divider between {before} and {after} spans no pixels")]
    EmptyDividerSpan { before: NodeId, after: NodeId },

    #[error("invalid config value for {field}: {value}")]
    InvalidConfig { field: &'static str, value: String },

    #[error("tree invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Structural corruption detected by [`crate::DockTree::validate`].
///
/// Seeing one of these after a public operation is an engine bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root {root} is not in the node map")]
    DanglingRoot { root: NodeId },

    #[error("root {root} has parent {parent}")]
    RootHasParent { root: NodeId, parent: NodeId },

    #[error("container {parent} references missing child {child}")]
    MissingChild { parent: NodeId, child: NodeId },

    #[error("node {node_id} expected parent {expected:?}, found {actual:?}")]
    ParentMismatch {
        node_id: NodeId,
        expected: Option<NodeId>,
        actual: Option<NodeId>,
    },

    #[error("node {node_id} is not reachable from the root")]
    Unreachable { node_id: NodeId },

    #[error("container {node_id} has {children} children")]
    DegenerateContainer { node_id: NodeId, children: usize },

    #[error("container {parent} has same-direction child container {child}")]
    SameDirectionChild { parent: NodeId, child: NodeId },

    #[error("id list does not match node keys")]
    IdsOutOfSync,

    #[error("tree without a root still holds {nodes} nodes")]
    EmptyTreeNotCanonical { nodes: usize },

    #[error("node {node_id} is visited twice")]
    Cycle { node_id: NodeId },

    #[error("node {node_id} has non-positive grow")]
    NonPositiveGrow { node_id: NodeId },
}
