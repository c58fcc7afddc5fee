use infra_core::NodeId;
use thiserror::Error;

/// Errors returned by `GraphStore` mutations.
///
/// A failed mutation leaves nodes, edges, code and history untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `add_node` with an id that is already in the store.
    #[error("a node with id `{0}` already exists")]
    DuplicateId(NodeId),
    /// Targeted edit of a node that is not in the store.
    #[error("no node with id `{0}`")]
    UnknownNode(NodeId),
    /// Palette request for a kind tag the generator does not know.
    #[error("unknown resource kind `{0}`")]
    UnknownKind(String),
}
