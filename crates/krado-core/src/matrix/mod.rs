//! The Boolean sparse-matrix kernel.
//!
//! Everything the graph layer knows about edges is stored here: square
//! Boolean matrices with deferred (delta-buffered) mutation, whole-row and
//! whole-column extraction/assignment, and lazy resize. The kernel is
//! dimension-checked but otherwise policy-free - the graph coordinator is
//! responsible for keeping every matrix at the same dimension.
//!
//! Writes are cheap: `set`/`remove` only touch pending delta sets, and the
//! committed column-major storage is updated when a bulk operation or an
//! explicit [`BoolMatrix::nvals`] call forces a flush. Reads always observe
//! the merged view.

mod boolean;

pub use boolean::{BoolMatrix, BoolVector};
