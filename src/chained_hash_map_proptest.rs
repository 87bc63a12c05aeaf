#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can call
// the internal structural self-check after every operation.

use crate::chained_hash_map::ChainedHashMap;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (1usize..=8, proptest::collection::vec("[a-z]{0,5}", 1..=8)).prop_flat_map(
        |(buckets, pool)| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let contains_pool = proptest::sample::select(pool.clone());
            let op = prop_oneof![
                (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
                idx.clone().prop_map(OpI::Get),
                idx.clone().prop_map(OpI::Remove),
                prop_oneof![
                    contains_pool.prop_map(|s: String| s),
                    "[a-z]{0,5}".prop_map(|s| s)
                ]
                .prop_map(OpI::Contains),
                (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
                Just(OpI::Iterate),
            ];
            proptest::collection::vec(op, 1..60)
                .prop_map(move |ops| (buckets, pool.clone(), ops))
        },
    )
}

fn run_scenario<S>(buckets: usize, pool: &[String], ops: Vec<OpI>, hasher: S) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut sut: ChainedHashMap<String, i32, S> =
        ChainedHashMap::with_buckets_and_hasher(buckets, hasher);
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v);
                let model_prev = model.insert(k, v);
                prop_assert_eq!(prev, model_prev, "put must return the displaced value");
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let removed = sut.remove(k.as_str());
                let model_removed = model.remove(k);
                prop_assert_eq!(removed, model_removed);
                // A second removal of the same key is always absent.
                prop_assert_eq!(sut.remove(k.as_str()), None);
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k.as_str()), model.get_mut(k)) {
                    (Some(v), Some(mv)) => {
                        *v = v.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    (sv, mv) => {
                        prop_assert!(false, "presence mismatch: sut={:?} model={:?}", sv, mv);
                    }
                }
            }
            OpI::Iterate => {
                let s_entries: BTreeSet<(String, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m_entries: BTreeSet<(String, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_entries, m_entries);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.check_invariants();
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the displaced value and never duplicates a key.
// - `get`/`contains_key` parity with the model, including borrowed lookups.
// - `remove` returns the stored value exactly once; re-removal is absent.
// - `iter` yields each live entry exactly once with the current value.
// - `len`/`is_empty` parity and structural bucket invariants after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, pool, ops) in arb_scenario()) {
        run_scenario(
            buckets,
            &pool,
            ops,
            std::collections::hash_map::RandomState::new(),
        )?;
    }
}

// Collision variant using a constant hasher: every key lands in bucket 0 and
// the whole table is one chain, stressing unlink and overwrite paths.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((buckets, pool, ops) in arb_scenario()) {
        run_scenario(buckets, &pool, ops, ConstBuildHasher)?;
    }
}
