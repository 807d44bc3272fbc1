//! The node block pool: pointer-stable chained storage for node records.

use krado_common::NodeId;
use parking_lot::RwLockReadGuard;
use tracing::trace;

/// Number of node slots per block. Power of two, so the id-to-slot division
/// compiles to shifts.
pub const NODEBLOCK_CAP: usize = 4096;

/// Index of the block containing `id`.
#[inline]
fn block_index(id: u64) -> usize {
    (id as usize) / NODEBLOCK_CAP
}

/// Position of `id` within its block.
#[inline]
fn slot_index(id: u64) -> usize {
    (id as usize) % NODEBLOCK_CAP
}

/// The compact node record stored in the block pool.
///
/// Properties live outside the core; the record only carries an opaque handle
/// into external property storage. The `id` field is rewritten whenever the
/// deletion engine relocates the record into a lower slot, and lookups stamp
/// it before returning, so the field is always authoritative on a record
/// obtained from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord {
    /// The node's current ID. Dense in `[0, node_count)`.
    pub id: NodeId,
    /// Offset into external property storage. Opaque to the core.
    pub props_offset: u32,
    /// Number of properties at the offset. Opaque to the core.
    pub props_count: u16,
}

impl NodeRecord {
    /// The record an unoccupied slot holds.
    pub const EMPTY: Self = Self {
        id: NodeId::new(0),
        props_offset: 0,
        props_count: 0,
    };
}

/// A fixed-capacity run of node slots.
///
/// The slot buffer is heap-allocated once and never moves, so a record's
/// address is stable for as long as it stays in its slot. Blocks are chained
/// by position in the pool's block index; growth appends blocks and never
/// touches existing ones.
#[derive(Debug)]
struct NodeBlock {
    nodes: Box<[NodeRecord]>,
}

impl NodeBlock {
    fn new() -> Self {
        Self {
            nodes: vec![NodeRecord::EMPTY; NODEBLOCK_CAP].into_boxed_slice(),
        }
    }
}

/// Chained block storage plus a flat block index for O(1) ID lookup.
///
/// Slots fill in ID order. The pool itself does not know how many slots are
/// live - `node_count` belongs to the graph coordinator, which bounds-checks
/// before calling in.
#[derive(Debug)]
pub(crate) struct BlockPool {
    blocks: Vec<NodeBlock>,
}

impl BlockPool {
    /// Creates a pool sized for roughly `n` nodes.
    pub fn with_capacity(n: u64) -> Self {
        let block_count = (n / NODEBLOCK_CAP as u64).max(1) as usize;
        Self {
            blocks: (0..block_count).map(|_| NodeBlock::new()).collect(),
        }
    }

    /// Number of blocks in the chain.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total slot capacity: `block_count * NODEBLOCK_CAP`.
    pub fn node_cap(&self) -> u64 {
        (self.blocks.len() * NODEBLOCK_CAP) as u64
    }

    /// Ensures room for `total` nodes.
    ///
    /// A no-op while `total` is below capacity. Otherwise the block count is
    /// multiplied by the smallest factor covering the demand, and the new
    /// blocks are appended to the chain. Existing blocks never move.
    pub fn grow(&mut self, total: u64) {
        if total < self.node_cap() {
            return;
        }
        let factor = total / self.node_cap() + 2;
        let target = self.blocks.len() * factor as usize;
        trace!(
            blocks = self.blocks.len(),
            target,
            total,
            "growing node block pool"
        );
        while self.blocks.len() < target {
            self.blocks.push(NodeBlock::new());
        }
    }

    /// Copies out the record in slot `id`, with the `id` field stamped.
    pub fn node(&self, id: u64) -> NodeRecord {
        let mut record = self.blocks[block_index(id)].nodes[slot_index(id)];
        record.id = NodeId::new(id);
        record
    }

    /// Mutable access to the record in slot `id`. Stamps the `id` field so
    /// the record is authoritative even after a relocation.
    pub fn node_mut(&mut self, id: u64) -> &mut NodeRecord {
        let record = &mut self.blocks[block_index(id)].nodes[slot_index(id)];
        record.id = NodeId::new(id);
        record
    }

    /// Relocates the record in slot `src` into slot `dest`, overwriting it
    /// and rewriting its `id` field.
    pub fn migrate(&mut self, src: u64, dest: u64) {
        let mut record = self.node(src);
        record.id = NodeId::new(dest);
        self.blocks[block_index(dest)].nodes[slot_index(dest)] = record;
    }
}

/// A restartable forward cursor over a span of node IDs.
///
/// Yields records in ascending ID order, crossing block boundaries through
/// the pool's block index. The iterator holds the pool's read lock for its
/// lifetime: operations that would relocate nodes or change the node count
/// block until it is dropped, so the C-era "don't mutate while iterating"
/// contract is enforced rather than assumed.
pub struct NodeIter<'g> {
    pool: RwLockReadGuard<'g, BlockPool>,
    start: u64,
    next: u64,
    end: u64,
    stride: u64,
}

impl<'g> NodeIter<'g> {
    pub(crate) fn new(
        pool: RwLockReadGuard<'g, BlockPool>,
        start: u64,
        end: u64,
        stride: u64,
    ) -> Self {
        assert!(stride > 0, "iterator stride must be positive");
        Self {
            pool,
            start,
            next: start,
            end,
            stride,
        }
    }

    /// Rewinds the cursor to its starting ID.
    pub fn reset(&mut self) {
        self.next = self.start;
    }
}

impl Iterator for NodeIter<'_> {
    type Item = NodeRecord;

    fn next(&mut self) -> Option<NodeRecord> {
        if self.next >= self.end {
            return None;
        }
        let record = self.pool.node(self.next);
        self.next += self.stride;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next);
        let steps = remaining.div_ceil(self.stride) as usize;
        (steps, Some(steps))
    }
}

impl ExactSizeIterator for NodeIter<'_> {}
