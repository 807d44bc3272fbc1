//! The bulk-connect edge descriptor.

use serde::{Deserialize, Serialize};

use super::{NodeId, RelationId};

/// One edge in a bulk connect request.
///
/// The graph stores edges column-as-source: connecting `src` to `dest` sets
/// `A[dest, src]` in the adjacency matrix, and additionally
/// `R[dest, src]` in the relation matrix when the edge is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node.
    pub src: NodeId,
    /// Destination node.
    pub dest: NodeId,
    /// Relation type, or `None` for an untyped edge recorded only in the
    /// adjacency matrix.
    pub relation: Option<RelationId>,
}

impl Connection {
    /// Creates an untyped connection.
    #[inline]
    #[must_use]
    pub const fn untyped(src: NodeId, dest: NodeId) -> Self {
        Self {
            src,
            dest,
            relation: None,
        }
    }

    /// Creates a typed connection.
    #[inline]
    #[must_use]
    pub const fn typed(src: NodeId, dest: NodeId, relation: RelationId) -> Self {
        Self {
            src,
            dest,
            relation: Some(relation),
        }
    }
}
