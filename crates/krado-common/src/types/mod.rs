//! Core type definitions for Krado.
//!
//! This module contains the fundamental types used throughout the graph core:
//! - Identifier types ([`NodeId`], [`LabelId`], [`RelationId`])
//! - The bulk-connect descriptor ([`Connection`])

mod connection;
mod id;

pub use connection::Connection;
pub use id::{LabelId, NodeId, RelationId};
