//! chained-hashmap: a single-threaded map with a fixed bucket count and
//! separate chaining, built over an arena of linked nodes.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: the classic textbook chained hash table, built in safe, verifiable
//!   layers so each piece can be reasoned about independently.
//! - Layers:
//!   - Chain: a singly-linked node sequence for one bucket. Nodes live in a
//!     `slotmap` arena owned by the table; links are generational `NodeKey`s,
//!     so an unlinked node's key can never resolve again, even after its
//!     physical slot is reused.
//!   - ChainedHashMap<K, V, S>: public API. Owns the fixed bucket array, the
//!     node arena, and the hasher; computes `hash(key) mod bucket_count` and
//!     delegates the per-bucket scan and unlink to the Chain.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (no atomics).
//! - Fixed bucket count for the table's lifetime: no load-factor tracking,
//!   no rehashing. Skewed key distributions degrade to a linear scan of the
//!   hot chain; that is the documented trade, not a bug.
//! - Unique keys: at most one entry per key table-wide. `put` on an existing
//!   key overwrites the value in place and never grows the table.
//! - Absence is `Option::None` on `get`/`remove`, never an error or a
//!   sentinel. A stored value that is itself an `Option` nests and stays
//!   distinguishable from a missing key.
//! - Bucket indexing uses the `u64` output of the table's `BuildHasher`, so
//!   the modulus is always a valid index; there is no signed-hash hazard.
//!
//! Reentrancy policy
//! - Public entry points only run user code via `K: Hash`/`Eq` while probing
//!   a bucket. A debug-only guard panics if that code re-enters the map while
//!   a chain is in mid-mutation; release builds compile the guard away.
//!
//! Notes and non-goals
//! - No resizing, no ordered iteration, no cryptographic hashing, no
//!   concurrent access. Callers needing shared mutation must wrap the whole
//!   table in one external exclusive lock per operation.
//! - Public API surface is `ChainedHashMap`; the chain and arena are
//!   implementation details.

mod chain;
pub mod chained_hash_map;
mod chained_hash_map_proptest;
mod reentrancy;

// Public surface
pub use chained_hash_map::{ChainedHashMap, DEFAULT_BUCKETS};
