//! The matrix pool: adjacency, per-relation, and per-label matrices, plus
//! the lazy resize that keeps all of them at the graph's node count.

use std::sync::Arc;

use krado_common::{LabelId, RelationId};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::trace;

use crate::matrix::BoolMatrix;

/// A shared handle to one of the graph's matrices.
///
/// Handles are what external query engines hold while computing traversals.
/// Consumers may read and mutate entries through the lock, but must never
/// resize - dimensions are owned by the graph coordinator.
pub type MatrixHandle = Arc<RwLock<BoolMatrix>>;

/// Initial capacity of the label and relation pools.
const MATRIX_POOL_CAP: usize = 16;

/// How many handle slots to add when a pool fills up.
const MATRIX_POOL_STEP: usize = 4;

/// Three parallel collections of Boolean matrices sharing one dimension.
///
/// Matrices are allocated at the node *capacity* and lazily shrunk to the
/// node *count* on first access, so a freshly created matrix costs nothing
/// until somebody looks at it. The resize itself is guarded by a single
/// coarse mutex with a double-checked dimension test: the cheap path (the
/// dimension already matches) takes no lock at all.
pub(crate) struct MatrixPool {
    adjacency: MatrixHandle,
    labels: RwLock<Vec<MatrixHandle>>,
    relations: RwLock<Vec<MatrixHandle>>,
    /// Serialises lazy resizes across all matrices.
    resize_lock: Mutex<()>,
}

impl MatrixPool {
    /// Creates a pool with an adjacency matrix allocated at `node_cap`.
    pub fn new(node_cap: u64) -> Self {
        Self {
            adjacency: Arc::new(RwLock::new(BoolMatrix::new(node_cap))),
            labels: RwLock::new(Vec::with_capacity(MATRIX_POOL_CAP)),
            relations: RwLock::new(Vec::with_capacity(MATRIX_POOL_CAP)),
            resize_lock: Mutex::new(()),
        }
    }

    /// Brings `m` to `dim x dim` if it is not there already, and returns a
    /// clone of the handle.
    fn synced(&self, m: &MatrixHandle, dim: u64) -> MatrixHandle {
        if m.read().nrows() != dim {
            let _resize = self.resize_lock.lock();
            let mut mat = m.write();
            // Double check now that we hold the lock.
            if mat.nrows() != dim {
                trace!(from = mat.nrows(), to = dim, "lazy matrix resize");
                mat.resize(dim);
            }
        }
        Arc::clone(m)
    }

    /// The adjacency matrix, resized to `dim`.
    pub fn adjacency(&self, dim: u64) -> MatrixHandle {
        self.synced(&self.adjacency, dim)
    }

    /// The label matrix at `label`, resized to `dim`.
    pub fn label(&self, label: LabelId, dim: u64) -> MatrixHandle {
        let labels = self.labels.read();
        assert!(
            label.as_usize() < labels.len(),
            "label {label} out of range {}",
            labels.len()
        );
        self.synced(&labels[label.as_usize()], dim)
    }

    /// The relation matrix at `relation`, resized to `dim`.
    pub fn relation(&self, relation: RelationId, dim: u64) -> MatrixHandle {
        let relations = self.relations.read();
        assert!(
            relation.as_usize() < relations.len(),
            "relation {relation} out of range {}",
            relations.len()
        );
        self.synced(&relations[relation.as_usize()], dim)
    }

    /// Appends a fresh label matrix allocated at `node_cap` and returns its
    /// index.
    pub fn add_label(&self, node_cap: u64) -> LabelId {
        let mut labels = self.labels.write();
        if labels.len() == labels.capacity() {
            labels.reserve_exact(MATRIX_POOL_STEP);
        }
        labels.push(Arc::new(RwLock::new(BoolMatrix::new(node_cap))));
        LabelId::new(labels.len() as u32 - 1)
    }

    /// Appends a fresh relation matrix allocated at `node_cap` and returns
    /// its index.
    pub fn add_relation(&self, node_cap: u64) -> RelationId {
        let mut relations = self.relations.write();
        if relations.len() == relations.capacity() {
            relations.reserve_exact(MATRIX_POOL_STEP);
        }
        relations.push(Arc::new(RwLock::new(BoolMatrix::new(node_cap))));
        RelationId::new(relations.len() as u32 - 1)
    }

    /// Number of label matrices.
    pub fn label_count(&self) -> usize {
        self.labels.read().len()
    }

    /// Number of relation matrices.
    pub fn relation_count(&self) -> usize {
        self.relations.read().len()
    }

    /// Forces materialisation of every matrix by taking its `nvals` at the
    /// given dimension. Label and relation flushes fan out across threads.
    pub fn materialize(&self, dim: u64) {
        let _ = self.adjacency(dim).write().nvals();

        let labels: Vec<MatrixHandle> = self.labels.read().iter().map(Arc::clone).collect();
        let relations: Vec<MatrixHandle> = self.relations.read().iter().map(Arc::clone).collect();
        labels
            .par_iter()
            .chain(relations.par_iter())
            .for_each(|m| {
                let m = self.synced(m, dim);
                let _ = m.write().nvals();
            });
    }
}
