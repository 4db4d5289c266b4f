//! Deterministic hashing. The standard library's `HashMap` is randomly seeded, which would make
//! iteration order (and anything derived from it) differ from run to run. Everything in this crate
//! that hashes goes through the types here instead.
//!
//! `HashMap` has no `new` method with a non-default hasher; use `HashMap::default()`.

use std::hash::BuildHasherDefault;

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::FxHasher;

pub type HashMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type HashSet<T> = std::collections::HashSet<T, BuildHasherDefault<FxHasher>>;

/// A convenience method to compute the hash of a `&str`. Used to derive a per-rng seed offset
/// from the rng's name, so it must be stable across platforms and releases.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
