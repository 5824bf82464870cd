//! Utility types.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion-ordered map, so that iteration order (and hence state numbering) is deterministic.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// Insertion-ordered set with positional access.
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
