//! The graph coordinator.
//!
//! [`MatrixGraph`] is the public face of the core: it owns the node block
//! pool and the matrix pool, and every mutation goes through it so the two
//! stay aligned - all matrices square at `node_count`, node IDs dense in
//! `[0, node_count)`, relation entries a subset of adjacency entries.
//!
//! Precondition violations (out-of-range IDs, unsorted deletion input,
//! missing matrices) are programmer errors and panic; there are no
//! recoverable failures at this layer.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use krado_common::{Connection, LabelId, NodeId, RelationId};
use parking_lot::{MappedRwLockWriteGuard, RwLock, RwLockWriteGuard};
use tracing::debug;

use super::block::{BlockPool, NodeIter, NodeRecord};
use super::matrices::{MatrixHandle, MatrixPool};

/// The in-memory matrix-backed graph store.
///
/// Edges are Boolean matrix entries, column-as-source: an edge from `src` to
/// `dest` is `A[dest, src]`, so following outgoing edges of `s` is a column
/// extract and external engines can run whole traversals as matrix algebra.
/// Nodes are records in a chained block pool addressed by dense ID.
///
/// # Example
///
/// ```
/// use krado_common::{Connection, NodeId};
/// use krado_core::MatrixGraph;
///
/// let graph = MatrixGraph::with_capacity(16);
/// graph.create_nodes(2);
/// graph.connect_nodes(&[Connection::untyped(NodeId::new(0), NodeId::new(1))]);
/// assert_eq!(graph.node_count(), 2);
/// ```
///
/// # Concurrency
///
/// Readers holding matrix handles and node iterators are safe against each
/// other, and every accessor re-checks matrix dimensions under the graph's
/// resize mutex before returning. Bulk mutations are *not* internally
/// serialised against each other - that is the caller's job, exactly as in
/// the single-writer engines this core is built to sit under.
pub struct MatrixGraph {
    pub(super) nodes: RwLock<BlockPool>,
    pub(super) node_count: AtomicU64,
    pub(super) matrices: MatrixPool,
}

impl MatrixGraph {
    /// Creates a graph sized for roughly `n` nodes.
    ///
    /// The hint only sizes the initial block chain and matrix allocation;
    /// the graph grows past it on demand.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    #[must_use]
    pub fn with_capacity(n: u64) -> Self {
        assert!(n > 0, "capacity hint must be positive");
        let pool = BlockPool::with_capacity(n);
        let matrices = MatrixPool::new(pool.node_cap());
        Self {
            nodes: RwLock::new(pool),
            node_count: AtomicU64::new(0),
            matrices,
        }
    }

    /// Number of live nodes. Equals every matrix's dimension as observed
    /// through the accessors.
    #[inline]
    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::Acquire)
    }

    /// Current slot capacity of the block pool.
    pub fn node_capacity(&self) -> u64 {
        self.nodes.read().node_cap()
    }

    /// Number of blocks in the node pool.
    pub fn block_count(&self) -> usize {
        self.nodes.read().block_count()
    }

    /// Number of label matrices created so far.
    pub fn label_count(&self) -> usize {
        self.matrices.label_count()
    }

    /// Number of relation matrices created so far.
    pub fn relation_count(&self) -> usize {
        self.matrices.relation_count()
    }

    /// Creates `n` unlabeled nodes and returns their ID range.
    pub fn create_nodes(&self, n: u64) -> Range<u64> {
        self.create_batch(n, None)
    }

    /// Creates one node per entry of `labels`, applying each `Some` label to
    /// its node's diagonal, and returns the ID range.
    pub fn create_labeled_nodes(&self, labels: &[Option<LabelId>]) -> Range<u64> {
        self.create_batch(labels.len() as u64, Some(labels))
    }

    fn create_batch(&self, n: u64, labels: Option<&[Option<LabelId>]>) -> Range<u64> {
        let start = self.node_count();
        self.nodes.write().grow(start + n);
        self.node_count.store(start + n, Ordering::Release);
        debug!(n, start, "created nodes");

        // Bring the adjacency matrix up to the new dimension eagerly; label
        // and relation matrices follow lazily on access.
        drop(self.adjacency_matrix());

        if let Some(labels) = labels {
            for (offset, label) in labels.iter().enumerate() {
                if let Some(label) = *label {
                    let id = start + offset as u64;
                    let m = self.label_matrix(label);
                    m.write().set(id, id);
                }
            }
        }
        start..start + n
    }

    /// Records every connection: `A[dest, src] = true`, plus the relation
    /// matrix entry when the connection is typed. Boolean matrices make
    /// repeated connects idempotent.
    pub fn connect_nodes(&self, connections: &[Connection]) {
        let adjacency = self.adjacency_matrix();
        for c in connections {
            adjacency.write().set(c.dest.as_u64(), c.src.as_u64());
            if let Some(relation) = c.relation {
                let m = self.relation_matrix(relation);
                m.write().set(c.dest.as_u64(), c.src.as_u64());
            }
        }
        debug!(edges = connections.len(), "connected nodes");
    }

    /// Sets `label` on every node in the *inclusive* range `[start, end]`
    /// and returns the covered IDs as a half-open range.
    pub fn label_nodes(&self, start: NodeId, end: NodeId, label: LabelId) -> Range<u64> {
        let count = self.node_count();
        assert!(
            start <= end && end.as_u64() < count,
            "label range {start}..={end} out of range {count}"
        );

        let m = self.label_matrix(label);
        let mut m = m.write();
        for id in start.as_u64()..=end.as_u64() {
            m.set(id, id);
        }
        start.as_u64()..end.as_u64() + 1
    }

    /// O(1) copy of the record for `id`, with the `id` field stamped.
    pub fn node(&self, id: NodeId) -> NodeRecord {
        assert!(
            id.as_u64() < self.node_count(),
            "node {id} out of range {}",
            self.node_count()
        );
        self.nodes.read().node(id.as_u64())
    }

    /// Mutable access to the record for `id`.
    ///
    /// The guard holds the pool's write lock; drop it before starting a scan
    /// or another mutation.
    pub fn node_mut(&self, id: NodeId) -> MappedRwLockWriteGuard<'_, NodeRecord> {
        assert!(
            id.as_u64() < self.node_count(),
            "node {id} out of range {}",
            self.node_count()
        );
        RwLockWriteGuard::map(self.nodes.write(), |pool| pool.node_mut(id.as_u64()))
    }

    /// Iterates every live node in ascending ID order.
    pub fn scan_nodes(&self) -> NodeIter<'_> {
        NodeIter::new(self.nodes.read(), 0, self.node_count(), 1)
    }

    /// Iterates the nodes in `range`, which must lie within the live ID
    /// space. Pair this with the range returned by a create call to walk
    /// exactly the nodes it made.
    pub fn nodes_in(&self, range: Range<u64>) -> NodeIter<'_> {
        assert!(
            range.end <= self.node_count(),
            "range end {} out of range {}",
            range.end,
            self.node_count()
        );
        NodeIter::new(self.nodes.read(), range.start, range.end, 1)
    }

    /// Like [`nodes_in`](Self::nodes_in), but visiting every `stride`-th ID.
    pub fn nodes_in_strided(&self, range: Range<u64>, stride: u64) -> NodeIter<'_> {
        assert!(
            range.end <= self.node_count(),
            "range end {} out of range {}",
            range.end,
            self.node_count()
        );
        NodeIter::new(self.nodes.read(), range.start, range.end, stride)
    }

    /// Allocates a fresh label matrix at the current node capacity and
    /// returns its index.
    pub fn add_label_matrix(&self) -> LabelId {
        self.matrices.add_label(self.node_capacity())
    }

    /// Allocates a fresh relation matrix at the current node capacity and
    /// returns its index.
    pub fn add_relation_matrix(&self) -> RelationId {
        self.matrices.add_relation(self.node_capacity())
    }

    /// The adjacency matrix, resized to the current node count.
    pub fn adjacency_matrix(&self) -> MatrixHandle {
        self.matrices.adjacency(self.node_count())
    }

    /// The matrix for `label`, resized to the current node count.
    ///
    /// # Panics
    ///
    /// Panics if no such label matrix exists.
    pub fn label_matrix(&self, label: LabelId) -> MatrixHandle {
        self.matrices.label(label, self.node_count())
    }

    /// The matrix for `relation`, resized to the current node count.
    ///
    /// # Panics
    ///
    /// Panics if no such relation matrix exists.
    pub fn relation_matrix(&self, relation: RelationId) -> MatrixHandle {
        self.matrices.relation(relation, self.node_count())
    }

    /// Forces materialisation of deferred kernel work in every matrix by
    /// querying its entry count. Call before handing matrices to an external
    /// reader that bypasses this API.
    pub fn commit_pending_ops(&self) {
        self.matrices.materialize(self.node_count());
    }
}

impl Default for MatrixGraph {
    fn default() -> Self {
        Self::with_capacity(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::block::NODEBLOCK_CAP;

    #[test]
    fn test_create_nodes_assigns_dense_ids() {
        let graph = MatrixGraph::with_capacity(8);
        assert_eq!(graph.create_nodes(3), 0..3);
        assert_eq!(graph.create_nodes(2), 3..5);
        assert_eq!(graph.node_count(), 5);

        let ids: Vec<u64> = graph.scan_nodes().map(|n| n.id.as_u64()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_create_grows_blocks_and_capacity() {
        let graph = MatrixGraph::with_capacity(1);
        assert_eq!(graph.node_capacity(), NODEBLOCK_CAP as u64);

        graph.create_nodes(NODEBLOCK_CAP as u64 + 1);
        assert_eq!(graph.block_count(), 3);
        assert_eq!(
            graph.node_capacity(),
            graph.block_count() as u64 * NODEBLOCK_CAP as u64
        );
    }

    #[test]
    fn test_connect_sets_dest_row_src_col() {
        let graph = MatrixGraph::with_capacity(8);
        graph.create_nodes(3);
        graph.connect_nodes(&[Connection::untyped(NodeId::new(2), NodeId::new(0))]);

        let adjacency = graph.adjacency_matrix();
        let mut adjacency = adjacency.write();
        assert!(adjacency.get(0, 2));
        assert!(!adjacency.get(2, 0));
        assert_eq!(adjacency.nvals(), 1);
    }

    #[test]
    fn test_labeled_creation_sets_diagonal() {
        let graph = MatrixGraph::with_capacity(8);
        let person = graph.add_label_matrix();
        graph.create_labeled_nodes(&[Some(person), None, Some(person)]);

        let m = graph.label_matrix(person);
        let mut m = m.write();
        assert!(m.get(0, 0));
        assert!(!m.get(1, 1));
        assert!(m.get(2, 2));
        assert_eq!(m.nvals(), 2);
    }

    #[test]
    fn test_label_nodes_inclusive_range() {
        let graph = MatrixGraph::with_capacity(8);
        graph.create_nodes(5);
        let label = graph.add_label_matrix();
        let range = graph.label_nodes(NodeId::new(1), NodeId::new(3), label);
        assert_eq!(range, 1..4);

        let m = graph.label_matrix(label);
        let m = m.read();
        assert!(!m.get(0, 0));
        assert!(m.get(1, 1) && m.get(2, 2) && m.get(3, 3));
        assert!(!m.get(4, 4));
    }

    #[test]
    fn test_matrix_accessors_track_node_count() {
        let graph = MatrixGraph::with_capacity(8);
        let label = graph.add_label_matrix();
        let relation = graph.add_relation_matrix();
        graph.create_nodes(4);

        assert_eq!(graph.adjacency_matrix().read().nrows(), 4);
        assert_eq!(graph.label_matrix(label).read().nrows(), 4);
        assert_eq!(graph.relation_matrix(relation).read().nrows(), 4);
    }

    #[test]
    fn test_node_mut_roundtrip() {
        let graph = MatrixGraph::with_capacity(8);
        graph.create_nodes(2);
        graph.node_mut(NodeId::new(1)).props_offset = 99;
        assert_eq!(graph.node(NodeId::new(1)).props_offset, 99);
        assert_eq!(graph.node(NodeId::new(0)).props_offset, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_node_lookup_past_count_panics() {
        let graph = MatrixGraph::with_capacity(8);
        graph.create_nodes(2);
        graph.node(NodeId::new(2));
    }
}
