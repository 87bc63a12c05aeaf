//! ChainedHashMap: fixed-bucket separate-chaining map over a node arena.

use crate::chain::{Arena, Chain};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Bucket count used by [`ChainedHashMap::new`].
pub const DEFAULT_BUCKETS: usize = 16;

/// A map with a fixed number of buckets and separate chaining for collision
/// resolution.
///
/// Every entry lives in a singly-linked chain hanging off the bucket at
/// `hash(key) mod bucket_count`. The bucket count is fixed at construction
/// and never changes: there is no load-factor tracking and no rehashing, so
/// under a skewed key distribution operations degrade to a linear scan of the
/// longest chain. That trade is deliberate; pick the bucket count for the
/// expected population.
///
/// Keys are unique (at most one entry per key table-wide) and immutable once
/// inserted; values may be overwritten in place via [`put`](Self::put) or
/// mutated through [`get_mut`](Self::get_mut). Absent keys are `None`
/// results, never errors or panics. Iteration order is unspecified.
///
/// The hash is a `u64` from the table's [`BuildHasher`], so the bucket index
/// `hash % n` is always in range; there is no negative-hash hazard to guard.
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Chain>,
    nodes: Arena<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// A map with [`DEFAULT_BUCKETS`] buckets and a `RandomState` hasher.
    pub fn new() -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKETS, RandomState::new())
    }

    /// A map with `buckets` fixed bucket slots.
    ///
    /// # Panics
    ///
    /// Panics if `buckets` is zero; a zero-bucket table cannot hold any key.
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, RandomState::new())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKETS, hasher)
    }

    /// # Panics
    ///
    /// Panics if `buckets` is zero.
    pub fn with_buckets_and_hasher(buckets: usize, hasher: S) -> Self {
        assert!(buckets > 0, "bucket count must be at least 1");
        Self {
            hasher,
            buckets: vec![Chain::new(); buckets],
            nodes: Arena::with_key(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Deterministic for a given hasher instance and identical for any `Q`
    /// that hashes like `K` (the `Borrow` contract).
    fn bucket_index<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        (self.hasher.hash_one(q) % self.buckets.len() as u64) as usize
    }

    /// Number of distinct keys. O(1): the arena holds exactly one node per
    /// entry, so its population is the key count.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The fixed bucket count chosen at construction.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Insert or overwrite. If `key` is already present, its value is
    /// replaced in place and the previous value returned; the entry keeps its
    /// chain position and `len()` is unchanged. Otherwise the entry is
    /// appended to its bucket's chain, `len()` grows by one, and `None` is
    /// returned.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        let index = self.bucket_index(&key);
        let chain = &mut self.buckets[index];
        match chain.find(&self.nodes, |k| *k == key) {
            Some(node) => Some(core::mem::replace(
                &mut self.nodes[node].entry.value,
                value,
            )),
            None => {
                chain.push_back(&mut self.nodes, key, value);
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let index = self.bucket_index(key);
        let node = self.buckets[index].find(&self.nodes, |k| k.borrow() == key)?;
        Some(&self.nodes[node].entry.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let index = self.bucket_index(key);
        let node = self.buckets[index].find(&self.nodes, |k| k.borrow() == key)?;
        Some(&mut self.nodes[node].entry.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).is_some()
    }

    /// Remove the entry for `key`, returning its value, or `None` if the key
    /// is absent (including when the bucket's chain is empty). `len()` shrinks
    /// only when an entry was actually removed.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Like [`remove`](Self::remove) but also returns the owned key.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let index = self.bucket_index(key);
        let entry = self.buckets[index].remove(&mut self.nodes, |k| k.borrow() == key)?;
        Some((entry.key, entry.value))
    }

    /// Live entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.nodes.values().map(|n| (&n.entry.key, &n.entry.value))
    }

    /// Live entries with mutable values, unspecified order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.nodes
            .values_mut()
            .map(|n| (&n.entry.key, &mut n.entry.value))
    }

    /// Structural self-check used by the test suites: chain counters sum to
    /// the arena population, every node is reachable from exactly one bucket,
    /// and every key sits in the bucket its hash selects.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut reachable = 0usize;
        for (index, chain) in self.buckets.iter().enumerate() {
            let mut walked = 0usize;
            for node in chain.nodes(&self.nodes) {
                walked += 1;
                assert_eq!(
                    self.bucket_index(&self.nodes[node].entry.key),
                    index,
                    "entry stored in a bucket its hash does not select"
                );
            }
            assert_eq!(walked, chain.len(), "chain counter disagrees with traversal");
            assert_eq!(chain.is_empty(), chain.len() == 0);
            reachable += walked;
        }
        assert_eq!(reachable, self.nodes.len(), "unreachable or doubly-linked nodes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::{BuildHasher, Hasher};

    /// Routes every key to bucket 0 to force worst-case chaining.
    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    /// The original smoke scenario: three inserts, a hit, a removal, and the
    /// key is absent afterwards.
    #[test]
    fn one_two_three_scenario() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        m.put("One".to_string(), 1);
        m.put("Two".to_string(), 2);
        m.put("Three".to_string(), 3);

        assert_eq!(m.len(), 3);
        assert_eq!(m.get("Two"), Some(&2));
        assert_eq!(m.remove("Two"), Some(2));
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("Two"), None);
        m.check_invariants();
    }

    /// Invariant: putting an existing key overwrites in place — previous
    /// value returned, `len` unchanged, lookup sees the new value.
    #[test]
    fn put_existing_key_overwrites_in_place() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        assert_eq!(m.put("k".to_string(), 1), None);
        assert_eq!(m.put("k".to_string(), 2), Some(1));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("k"), Some(&2));
        m.check_invariants();
    }

    /// Invariant: absent keys are `None` on both `get` and `remove`, and a
    /// failed removal leaves `len` alone.
    #[test]
    fn absent_key_is_none_everywhere() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        assert_eq!(m.get("ghost"), None);
        assert_eq!(m.remove("ghost"), None);
        m.put("real".to_string(), 7);
        assert_eq!(m.remove("ghost"), None);
        assert_eq!(m.len(), 1);
        assert!(!m.contains_key("ghost"));
        assert!(m.contains_key("real"));
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`);
    /// the borrowed form must select the same bucket as the owned key.
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        m.put("hello".to_string(), 1);
        assert_eq!(m.get("hello"), Some(&1));
        assert_eq!(m.get(&"hello".to_string()), Some(&1));
        assert_eq!(m.get("world"), None);
        assert_eq!(m.remove("hello"), Some(1));
        assert!(m.is_empty());
    }

    /// Invariant: colliding keys are independently retrievable and removable
    /// without disturbing each other.
    #[test]
    fn collisions_stay_independent() {
        let mut m: ChainedHashMap<String, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.put("c".to_string(), 3);
        assert_eq!(m.len(), 3);
        m.check_invariants();

        assert_eq!(m.get("a"), Some(&1));
        assert_eq!(m.get("b"), Some(&2));
        assert_eq!(m.get("c"), Some(&3));

        // Remove the middle of the shared chain.
        assert_eq!(m.remove("b"), Some(2));
        assert_eq!(m.get("a"), Some(&1));
        assert_eq!(m.get("b"), None);
        assert_eq!(m.get("c"), Some(&3));
        assert_eq!(m.len(), 2);
        m.check_invariants();
    }

    /// Invariant: overwrite resolves by key equality even when every key
    /// shares a bucket; no duplicate entry is appended.
    #[test]
    fn overwrite_under_collisions_keeps_keys_unique() {
        let mut m: ChainedHashMap<String, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        m.put("x".to_string(), 1);
        m.put("y".to_string(), 2);
        assert_eq!(m.put("x".to_string(), 10), Some(1));
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("x"), Some(&10));
        m.check_invariants();
    }

    /// Edge case: a single-bucket table is one long chain and still honors
    /// the full put/get/remove contract.
    #[test]
    fn single_bucket_table() {
        let mut m: ChainedHashMap<i32, i32> = ChainedHashMap::with_buckets(1);
        assert_eq!(m.bucket_count(), 1);
        for i in 0..32 {
            m.put(i, i * 10);
        }
        assert_eq!(m.len(), 32);
        m.check_invariants();
        for i in 0..32 {
            assert_eq!(m.get(&i), Some(&(i * 10)));
        }
        for i in (0..32).step_by(2) {
            assert_eq!(m.remove(&i), Some(i * 10));
        }
        assert_eq!(m.len(), 16);
        m.check_invariants();
        for i in 0..32 {
            assert_eq!(m.get(&i).is_some(), i % 2 == 1);
        }
    }

    /// Contract: a zero-bucket table is a construction-time violation.
    #[test]
    #[should_panic(expected = "bucket count must be at least 1")]
    fn zero_buckets_panics() {
        let _ = ChainedHashMap::<i32, i32>::with_buckets(0);
    }

    /// Invariant: `get_mut` mutations persist and are seen by later reads.
    #[test]
    fn get_mut_updates_stored_value() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        m.put("n".to_string(), 1);
        *m.get_mut("n").expect("present") += 41;
        assert_eq!(m.get("n"), Some(&42));
    }

    /// Invariant: `remove_entry` hands back the owned key that was stored,
    /// not the query form.
    #[test]
    fn remove_entry_returns_owned_pair() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        m.put("pair".to_string(), 5);
        let (k, v) = m.remove_entry("pair").expect("present");
        assert_eq!(k, "pair");
        assert_eq!(v, 5);
        assert!(m.is_empty());
    }

    /// Invariant: an `Option` value nests — a key mapped to `None` is still
    /// distinguishable from an absent key.
    #[test]
    fn stored_none_is_not_absent() {
        let mut m: ChainedHashMap<String, Option<i32>> = ChainedHashMap::new();
        m.put("present".to_string(), None);
        assert_eq!(m.get("present"), Some(&None));
        assert_eq!(m.get("absent"), None);
        assert_eq!(m.remove("present"), Some(None));
        assert_eq!(m.remove("present"), None);
    }

    /// Invariant: iteration yields each live entry exactly once; `iter_mut`
    /// updates are visible to subsequent lookups.
    #[test]
    fn iteration_and_bulk_mutation() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        for (i, k) in ["k1", "k2", "k3"].iter().enumerate() {
            m.put((*k).to_string(), i as i32);
        }
        let mut seen: Vec<String> = m.iter().map(|(k, _)| k.clone()).collect();
        seen.sort();
        assert_eq!(seen, vec!["k1", "k2", "k3"]);

        for (_, v) in m.iter_mut() {
            *v += 10;
        }
        assert_eq!(m.get("k1"), Some(&10));
        assert_eq!(m.get("k2"), Some(&11));
        assert_eq!(m.get("k3"), Some(&12));
    }

    /// Invariant (debug-only): re-entering the map from `K: Eq` during a
    /// bucket scan panics via the reentrancy guard.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_probe() {
        struct ReentryKey {
            id: &'static str,
            map: *const ChainedHashMap<ReentryKey, i32, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    // Re-enter the same map mid-probe.
                    unsafe {
                        let m = &*other.map;
                        let _ = m.get(self.id);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
        impl Borrow<str> for ReentryKey {
            fn borrow(&self) -> &str {
                self.id
            }
        }

        let mut m: ChainedHashMap<ReentryKey, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        m.put(
            ReentryKey {
                id: "a",
                map: core::ptr::null(),
                trigger: false,
            },
            1,
        );

        let query = ReentryKey {
            id: "b",
            map: &m as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.put(query, 2);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
