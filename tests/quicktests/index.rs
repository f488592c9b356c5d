use ordered_index::OrderedIndex;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

/// Applies a set of operations to an index and a map.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same set of keys in the map.
fn do_ops<K, V>(ops: &[Op<K, V>], index: &mut OrderedIndex<K, V>, map: &mut BTreeMap<K, V>)
where
    K: Clone + Ord,
    V: Clone,
{
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                index.insert(k.clone(), v.clone());
                map.entry(k.clone()).or_insert_with(|| v.clone());
            }
            Op::Remove(k) => {
                index.delete(k);
                map.remove(k);
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
    let mut index = OrderedIndex::new();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut index, &mut map);
    index.len() == map.len()
        && map.keys().all(|key| index.search(key) == map.get(key))
        && index.iter().eq(map.iter())
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut index = OrderedIndex::new();
    for x in &xs {
        index.insert(*x, *x);
    }

    xs.iter().all(|x| index.search(x) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut index = OrderedIndex::new();
    for x in &xs {
        index.insert(*x, *x);
    }
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| index.search(x).is_none())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut index = OrderedIndex::new();
    for x in &xs {
        index.insert(*x, *x);
    }
    for delete in &deletes {
        index.delete(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same key multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| index.search(x).is_none())
        && still_present.iter().all(|x| index.search(x).is_some())
}

#[quickcheck]
fn duplicates_never_change_len(xs: Vec<u8>, dup: u8) -> bool {
    let mut index: OrderedIndex<_, _> = xs.iter().map(|&x| (x, 0u8)).collect();
    index.insert(dup, 0);
    let len = index.len();

    let rejected = !index.insert(dup, 1).is_inserted();

    rejected && index.len() == len && index.search(&dup) == Some(&0)
}

#[quickcheck]
fn round_trip_is_sorted_first_occurrences(xs: Vec<(i16, u8)>) -> bool {
    let index: OrderedIndex<_, _> = xs.iter().copied().collect();

    let mut expected: Vec<(i16, u8)> = Vec::new();
    for &(k, v) in &xs {
        if !expected.iter().any(|&(seen, _)| seen == k) {
            expected.push((k, v));
        }
    }
    expected.sort_by_key(|&(k, _)| k);

    index.into_iter().eq(expected.into_iter())
}
