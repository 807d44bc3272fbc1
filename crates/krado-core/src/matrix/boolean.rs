//! Square Boolean sparse matrices with deferred mutation.

use krado_common::collections::{krado_set, KradoSet};

/// A sparse Boolean vector of a fixed dimension.
///
/// Produced by the matrix extraction operations and consumed by the
/// assignment operations. Entries are kept as a sorted list of indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVector {
    dim: u64,
    entries: Vec<u64>,
}

impl BoolVector {
    /// Creates an empty vector of the given dimension.
    #[must_use]
    pub fn new(dim: u64) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// The vector's dimension.
    #[inline]
    #[must_use]
    pub fn nrows(&self) -> u64 {
        self.dim
    }

    /// Number of true entries.
    #[inline]
    #[must_use]
    pub fn nvals(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Reads entry `i`. Indices past the dimension read as false.
    #[must_use]
    pub fn get(&self, i: u64) -> bool {
        self.entries.binary_search(&i).is_ok()
    }

    /// Sets entry `i` to true.
    pub fn set(&mut self, i: u64) {
        assert!(i < self.dim, "vector index {i} out of range {}", self.dim);
        if let Err(pos) = self.entries.binary_search(&i) {
            self.entries.insert(pos, i);
        }
    }

    /// Iterates the true entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied()
    }

    fn from_sorted(dim: u64, entries: Vec<u64>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0] < w[1]));
        Self { dim, entries }
    }
}

/// A square Boolean sparse matrix.
///
/// Storage is column-major: each column holds a sorted list of the row
/// indices carrying a true entry. Columns are the hot axis on purpose - the
/// graph encodes edges as `M[dest, src]`, so "outgoing edges of `src`" is a
/// single column extract.
///
/// Mutation through [`set`](Self::set) and [`remove`](Self::remove) is
/// deferred into pending delta sets and folded into the committed storage
/// when a bulk operation runs. [`get`](Self::get) merges the pending state,
/// so deferral is never observable through reads; it only means that the
/// cost of a burst of writes is paid once, at the next flush.
#[derive(Debug, Clone)]
pub struct BoolMatrix {
    dim: u64,
    /// Committed entries: `cols[j]` holds the sorted rows set in column `j`.
    cols: Vec<Vec<u64>>,
    /// Pending insertions, as `(row, col)` pairs.
    delta_plus: KradoSet<(u64, u64)>,
    /// Pending removals, as `(row, col)` pairs.
    delta_minus: KradoSet<(u64, u64)>,
}

impl BoolMatrix {
    /// Creates an empty `dim x dim` matrix.
    #[must_use]
    pub fn new(dim: u64) -> Self {
        Self {
            dim,
            cols: vec![Vec::new(); usize::try_from(dim).expect("matrix dimension overflows usize")],
            delta_plus: krado_set(),
            delta_minus: krado_set(),
        }
    }

    /// The matrix dimension (it is square, so rows == columns).
    #[inline]
    #[must_use]
    pub fn nrows(&self) -> u64 {
        self.dim
    }

    /// Number of true entries. Forces materialisation of pending work.
    pub fn nvals(&mut self) -> u64 {
        self.flush();
        self.cols.iter().map(|rows| rows.len() as u64).sum()
    }

    /// True if deferred writes have not yet been folded into the committed
    /// storage.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.delta_plus.is_empty() || !self.delta_minus.is_empty()
    }

    /// Reads entry `(row, col)`.
    ///
    /// Out-of-range coordinates read as false: a logically shrunk matrix has
    /// no entry there.
    #[must_use]
    pub fn get(&self, row: u64, col: u64) -> bool {
        if row >= self.dim || col >= self.dim {
            return false;
        }
        if self.delta_minus.contains(&(row, col)) {
            return false;
        }
        if self.delta_plus.contains(&(row, col)) {
            return true;
        }
        self.cols[col as usize].binary_search(&row).is_ok()
    }

    /// Sets entry `(row, col)` to true. Idempotent.
    pub fn set(&mut self, row: u64, col: u64) {
        self.check_bounds(row, col);
        self.delta_minus.remove(&(row, col));
        self.delta_plus.insert((row, col));
    }

    /// Removes entry `(row, col)`. Removing an absent entry is a no-op.
    pub fn remove(&mut self, row: u64, col: u64) {
        self.check_bounds(row, col);
        self.delta_plus.remove(&(row, col));
        self.delta_minus.insert((row, col));
    }

    /// Resizes to `dim x dim`. Shrinking drops every entry with a coordinate
    /// past the new dimension; growing adds empty rows and columns.
    pub fn resize(&mut self, dim: u64) {
        self.flush();
        let new_len = usize::try_from(dim).expect("matrix dimension overflows usize");
        if dim < self.dim {
            self.cols.truncate(new_len);
            for rows in &mut self.cols {
                let keep = rows.partition_point(|&row| row < dim);
                rows.truncate(keep);
            }
        } else {
            self.cols.resize_with(new_len, Vec::new);
        }
        self.dim = dim;
    }

    /// Extracts column `col` as a vector of this matrix's dimension.
    pub fn extract_col(&mut self, col: u64) -> BoolVector {
        assert!(col < self.dim, "column {col} out of range {}", self.dim);
        self.flush();
        BoolVector::from_sorted(self.dim, self.cols[col as usize].clone())
    }

    /// Extracts row `row` as a vector - the transposed column extract.
    pub fn extract_row(&mut self, row: u64) -> BoolVector {
        assert!(row < self.dim, "row {row} out of range {}", self.dim);
        self.flush();
        let entries = self
            .cols
            .iter()
            .enumerate()
            .filter(|(_, rows)| rows.binary_search(&row).is_ok())
            .map(|(col, _)| col as u64)
            .collect();
        BoolVector::from_sorted(self.dim, entries)
    }

    /// Replaces column `col` with the given vector: entries absent from the
    /// vector are cleared.
    pub fn assign_col(&mut self, col: u64, v: &BoolVector) {
        assert!(col < self.dim, "column {col} out of range {}", self.dim);
        assert_eq!(v.nrows(), self.dim, "vector/matrix dimension mismatch");
        self.flush();
        self.cols[col as usize] = v.entries.clone();
    }

    /// Replaces row `row` with the given vector: entries absent from the
    /// vector are cleared.
    pub fn assign_row(&mut self, row: u64, v: &BoolVector) {
        assert!(row < self.dim, "row {row} out of range {}", self.dim);
        assert_eq!(v.nrows(), self.dim, "vector/matrix dimension mismatch");
        self.flush();
        for (col, rows) in self.cols.iter_mut().enumerate() {
            let want = v.get(col as u64);
            match rows.binary_search(&row) {
                Ok(pos) if !want => {
                    rows.remove(pos);
                }
                Err(pos) if want => rows.insert(pos, row),
                _ => {}
            }
        }
    }

    /// Clears every entry in column `col`.
    pub fn clear_col(&mut self, col: u64) {
        assert!(col < self.dim, "column {col} out of range {}", self.dim);
        self.flush();
        self.cols[col as usize].clear();
    }

    /// Iterates all true entries as `(row, col)` pairs, grouped by column in
    /// ascending order. Forces materialisation of pending work.
    pub fn entries(&mut self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.flush();
        self.cols
            .iter()
            .enumerate()
            .flat_map(|(col, rows)| rows.iter().map(move |&row| (row, col as u64)))
    }

    /// Folds the pending delta sets into the committed column storage.
    fn flush(&mut self) {
        if self.has_pending() {
            for (row, col) in self.delta_plus.drain() {
                let rows = &mut self.cols[col as usize];
                if let Err(pos) = rows.binary_search(&row) {
                    rows.insert(pos, row);
                }
            }
            for (row, col) in self.delta_minus.drain() {
                let rows = &mut self.cols[col as usize];
                if let Ok(pos) = rows.binary_search(&row) {
                    rows.remove(pos);
                }
            }
        }
    }

    fn check_bounds(&self, row: u64, col: u64) {
        assert!(
            row < self.dim && col < self.dim,
            "entry ({row}, {col}) out of range {}",
            self.dim
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut m = BoolMatrix::new(4);
        assert!(!m.get(1, 0));

        m.set(1, 0);
        assert!(m.get(1, 0));
        assert!(m.has_pending());

        m.set(1, 0);
        assert_eq!(m.nvals(), 1);
        assert!(!m.has_pending());

        m.remove(1, 0);
        assert!(!m.get(1, 0));
        assert_eq!(m.nvals(), 0);

        // Removing an absent entry is a no-op.
        m.remove(3, 3);
        assert_eq!(m.nvals(), 0);
    }

    #[test]
    fn test_get_merges_pending_state() {
        let mut m = BoolMatrix::new(3);
        m.set(2, 1);
        assert!(m.get(2, 1), "pending insert must be visible");

        m.nvals();
        m.remove(2, 1);
        assert!(!m.get(2, 1), "pending removal must be visible");
    }

    #[test]
    fn test_out_of_range_reads_false() {
        let mut m = BoolMatrix::new(3);
        m.set(2, 2);
        m.resize(2);
        assert!(!m.get(2, 2));
        assert_eq!(m.nrows(), 2);
    }

    #[test]
    fn test_resize_shrink_prunes() {
        let mut m = BoolMatrix::new(5);
        m.set(0, 0);
        m.set(4, 0);
        m.set(1, 4);
        m.resize(3);
        assert_eq!(m.nvals(), 1);
        assert!(m.get(0, 0));
    }

    #[test]
    fn test_resize_grow() {
        let mut m = BoolMatrix::new(2);
        m.set(1, 1);
        m.resize(6);
        assert_eq!(m.nrows(), 6);
        assert!(m.get(1, 1));
        m.set(5, 5);
        assert_eq!(m.nvals(), 2);
    }

    #[test]
    fn test_extract_and_assign_col() {
        let mut m = BoolMatrix::new(4);
        m.set(1, 2);
        m.set(3, 2);

        let col = m.extract_col(2);
        assert_eq!(col.nvals(), 2);
        assert!(col.get(1) && col.get(3));

        m.assign_col(0, &col);
        assert!(m.get(1, 0) && m.get(3, 0));

        // Assignment replaces: entries not in the vector are cleared.
        let empty = BoolVector::new(4);
        m.assign_col(2, &empty);
        assert!(!m.get(1, 2) && !m.get(3, 2));
    }

    #[test]
    fn test_extract_and_assign_row() {
        let mut m = BoolMatrix::new(4);
        m.set(2, 0);
        m.set(2, 3);
        m.set(1, 1);

        let row = m.extract_row(2);
        assert_eq!(row.nvals(), 2);
        assert!(row.get(0) && row.get(3));

        m.assign_row(1, &row);
        assert!(m.get(1, 0) && m.get(1, 3));
        assert!(!m.get(1, 1), "row assignment must clear stale entries");
    }

    #[test]
    fn test_clear_col() {
        let mut m = BoolMatrix::new(3);
        m.set(0, 1);
        m.set(2, 1);
        m.set(2, 2);
        m.clear_col(1);
        assert_eq!(m.nvals(), 1);
        assert!(m.get(2, 2));
    }

    #[test]
    fn test_entries_order() {
        let mut m = BoolMatrix::new(3);
        m.set(2, 0);
        m.set(0, 0);
        m.set(1, 2);
        let entries: Vec<_> = m.entries().collect();
        assert_eq!(entries, vec![(0, 0), (2, 0), (1, 2)]);
    }

    #[test]
    fn test_vector_basic() {
        let mut v = BoolVector::new(5);
        v.set(3);
        v.set(1);
        v.set(3);
        assert_eq!(v.nvals(), 2);
        assert!(v.get(1) && v.get(3));
        assert!(!v.get(0));
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        let mut m = BoolMatrix::new(2);
        m.set(2, 0);
    }
}
