//! Edge deletion and the node deletion engine.
//!
//! Node deletion is swap-compaction: every vacated low slot is refilled by
//! the highest surviving node, so the dense ID space is restored with at
//! most one row/column migration per deleted node and no matrix rebuild.

use std::sync::atomic::Ordering;

use krado_common::{LabelId, NodeId, RelationId};
use tracing::debug;

use super::matrices::MatrixHandle;
use super::store::MatrixGraph;

impl MatrixGraph {
    /// Deletes edges between `src` and `dest`.
    ///
    /// With `relation == None`, the entry is removed from the adjacency
    /// matrix and from every relation matrix holding it. With a specific
    /// relation, only that matrix loses the entry - the adjacency entry
    /// survives until no relation matrix holds the edge any more.
    ///
    /// Deleting a non-existent edge is a no-op.
    pub fn delete_edge(&self, src: NodeId, dest: NodeId, relation: Option<RelationId>) {
        let count = self.node_count();
        assert!(
            src.as_u64() < count && dest.as_u64() < count,
            "edge ({src}, {dest}) out of range {count}"
        );

        let connected = self
            .adjacency_matrix()
            .read()
            .get(dest.as_u64(), src.as_u64());
        if !connected {
            return;
        }

        match relation {
            None => self.delete_all_edges(src, dest),
            Some(relation) => self.delete_typed_edge(src, dest, relation),
        }
    }

    /// Removes the entry from the adjacency matrix and every relation matrix
    /// that carries it.
    fn delete_all_edges(&self, src: NodeId, dest: NodeId) {
        self.adjacency_matrix()
            .write()
            .remove(dest.as_u64(), src.as_u64());

        for i in 0..self.relation_count() {
            let m = self.relation_matrix(RelationId::new(i as u32));
            let mut m = m.write();
            if m.get(dest.as_u64(), src.as_u64()) {
                m.remove(dest.as_u64(), src.as_u64());
            }
        }
    }

    /// Removes the typed entry, then clears the adjacency entry if no other
    /// relation still connects the pair.
    fn delete_typed_edge(&self, src: NodeId, dest: NodeId, relation: RelationId) {
        {
            let m = self.relation_matrix(relation);
            let mut m = m.write();
            if !m.get(dest.as_u64(), src.as_u64()) {
                return;
            }
            m.remove(dest.as_u64(), src.as_u64());
        }

        // See if source is connected to destination through another relation.
        let mut connected = false;
        for i in 0..self.relation_count() {
            let m = self.relation_matrix(RelationId::new(i as u32));
            if m.read().get(dest.as_u64(), src.as_u64()) {
                connected = true;
                break;
            }
        }

        if !connected {
            self.adjacency_matrix()
                .write()
                .remove(dest.as_u64(), src.as_u64());
        }
    }

    /// Deletes the given nodes and compacts the ID space back to
    /// `[0, node_count - ids.len())`.
    ///
    /// `ids` must be sorted strictly ascending. Each vacated slot below the
    /// post-deletion count is refilled by the highest surviving node: its
    /// row and column are migrated in the adjacency matrix and every
    /// relation matrix, its label diagonal bits follow, and its block-pool
    /// record is copied down with the `id` field rewritten. The adjacency
    /// matrix is resized immediately; all other matrices shrink lazily on
    /// next access.
    ///
    /// # Panics
    ///
    /// Panics if `ids` is unsorted, contains duplicates, or reaches past the
    /// live ID space.
    pub fn delete_nodes(&self, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        let count = self.node_count();
        assert!(
            ids.windows(2).all(|w| w[0] < w[1]),
            "deletion ids must be sorted strictly ascending"
        );
        assert!(
            ids[ids.len() - 1].as_u64() < count,
            "node {} out of range {count}",
            ids[ids.len() - 1]
        );

        let post = count - ids.len() as u64;

        // Highest remaining ID in the graph: the next relocation donor.
        let mut survivor = count - 1;
        // Highest ID still scheduled for deletion.
        let mut top = ids.len() as isize - 1;
        // Lowest vacated slot, the destination for `survivor`.
        let mut replace_idx = 0;

        while ids[replace_idx].as_u64() < post {
            // Skip donors that are themselves scheduled for deletion.
            while top >= 0 && survivor == ids[top as usize].as_u64() {
                survivor -= 1;
                top -= 1;
            }

            self.replace_deleted_node(survivor, ids[replace_idx].as_u64());

            replace_idx += 1;
            if replace_idx == ids.len() {
                break;
            }
            survivor -= 1;
        }

        self.node_count.store(post, Ordering::Release);
        debug!(deleted = ids.len(), node_count = post, "deleted nodes");

        // Force the adjacency matrix down to the new dimension; the rest
        // shrink lazily.
        drop(self.adjacency_matrix());
    }

    /// Moves node `replacement` into slot `to_delete`: label diagonal first,
    /// then matrix rows/columns, then the block-pool record.
    fn replace_deleted_node(&self, replacement: u64, to_delete: u64) {
        for i in 0..self.label_count() {
            let m = self.label_matrix(LabelId::new(i as u32));
            let mut m = m.write();
            let src_has_label = m.get(replacement, replacement);
            let dest_has_label = m.get(to_delete, to_delete);

            if dest_has_label && !src_has_label {
                m.clear_col(to_delete);
            } else if !dest_has_label && src_has_label {
                m.set(to_delete, to_delete);
            }
        }

        let adjacency = self.adjacency_matrix();
        Self::migrate_row_col(&adjacency, replacement, to_delete);
        for i in 0..self.relation_count() {
            let m = self.relation_matrix(RelationId::new(i as u32));
            Self::migrate_row_col(&m, replacement, to_delete);
        }

        self.nodes.write().migrate(replacement, to_delete);
    }

    /// Relocates row and column `src` onto `dest` within one matrix: clear
    /// the destination column, copy the source row across (a transposed
    /// column extract), then copy the source column.
    fn migrate_row_col(m: &MatrixHandle, src: u64, dest: u64) {
        let mut m = m.write();
        m.clear_col(dest);

        let row = m.extract_row(src);
        m.assign_row(dest, &row);

        let col = m.extract_col(src);
        m.assign_col(dest, &col);
    }
}
