//! # krado-core
//!
//! The Krado graph core: an in-memory, labeled, typed property-graph store
//! whose edges live in a family of Boolean sparse matrices sharing one square
//! dimension equal to the current node count.
//!
//! Nodes occupy a dense, contiguous ID space `[0, node_count)` backed by a
//! chained block pool, so a node is addressable both by ID (O(1) through the
//! block index) and by slot (stable for its lifetime). Edges are recorded in
//! a master adjacency matrix plus one matrix per relation type; labels are
//! diagonal matrices over node IDs. External query engines consume the
//! matrices directly for linear-algebra traversal.
//!
//! ## Modules
//!
//! - [`graph`] - The [`MatrixGraph`] coordinator, node block pool, and matrix pool
//! - [`matrix`] - The Boolean sparse-matrix kernel
//!
//! ## Example
//!
//! ```
//! use krado_common::{Connection, NodeId};
//! use krado_core::MatrixGraph;
//!
//! let graph = MatrixGraph::with_capacity(64);
//! let ids = graph.create_nodes(3);
//! assert_eq!(ids, 0..3);
//!
//! graph.connect_nodes(&[Connection::untyped(NodeId::new(0), NodeId::new(1))]);
//!
//! let adjacency = graph.adjacency_matrix();
//! assert!(adjacency.read().get(1, 0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;
pub mod matrix;

pub use graph::{MatrixGraph, MatrixHandle, NodeIter, NodeRecord, NODEBLOCK_CAP};
pub use matrix::{BoolMatrix, BoolVector};
