//! Standard collection type aliases for Krado.
//!
//! Use these instead of direct HashMap/HashSet to allow future optimization
//! and ensure consistent hashing across the codebase.
//!
//! # Example
//!
//! ```rust
//! use krado_common::collections::{KradoMap, KradoSet};
//!
//! let mut map: KradoMap<u64, u64> = KradoMap::default();
//! map.insert(1, 42);
//!
//! let mut set: KradoSet<(u64, u64)> = KradoSet::default();
//! set.insert((0, 1));
//! ```

use rustc_hash::FxBuildHasher;

/// Standard HashMap with FxHash (fast, non-cryptographic).
///
/// FxHash is optimized for small keys and provides excellent performance
/// for the integer keys and index pairs common in graph storage.
pub type KradoMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Standard HashSet with FxHash.
pub type KradoSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Create a new empty [`KradoMap`].
#[inline]
#[must_use]
pub fn krado_map<K, V>() -> KradoMap<K, V> {
    KradoMap::with_hasher(FxBuildHasher)
}

/// Create a new [`KradoMap`] with the specified capacity.
#[inline]
#[must_use]
pub fn krado_map_with_capacity<K, V>(capacity: usize) -> KradoMap<K, V> {
    KradoMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}

/// Create a new empty [`KradoSet`].
#[inline]
#[must_use]
pub fn krado_set<T>() -> KradoSet<T> {
    KradoSet::with_hasher(FxBuildHasher)
}

/// Create a new [`KradoSet`] with the specified capacity.
#[inline]
#[must_use]
pub fn krado_set_with_capacity<T>(capacity: usize) -> KradoSet<T> {
    KradoSet::with_capacity_and_hasher(capacity, FxBuildHasher)
}
