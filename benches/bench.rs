use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ordered_index::OrderedIndex;

/// Returns how many nodes are needed to fill a binary tree with `num_levels` levels.
fn num_nodes_in_full_tree(num_levels: usize) -> usize {
    2usize.pow(num_levels as u32) - 1
}

/// Builds an index by inserting keys in ascending order. Without rebalancing this gives a tree
/// that is one long chain of right children.
fn get_unbalanced_index(num_levels: usize) -> OrderedIndex<i32, i32> {
    (0..num_nodes_in_full_tree(num_levels) as i32)
        .map(|x| (x, x))
        .collect()
}

/// Builds an index by inserting keys in an order that leaves the tree balanced.
///
/// It ensures there are `num_levels` of nodes, all full.
fn get_balanced_index(num_levels: usize) -> OrderedIndex<i32, i32> {
    let xs = (0..num_nodes_in_full_tree(num_levels) as i32).collect::<Vec<_>>();
    let mut index = OrderedIndex::new();
    fill_balanced_index(&mut index, &xs);
    index
}

/// Recursive helper for [`get_balanced_index`].
fn fill_balanced_index(index: &mut OrderedIndex<i32, i32>, xs: &[i32]) {
    if !xs.is_empty() {
        let mid = xs.len() / 2;
        index.insert(xs[mid], xs[mid]);
        fill_balanced_index(index, &xs[..mid]);
        fill_balanced_index(index, &xs[mid + 1..]);
    }
}

/// Helper to bench a function on an index.
/// It creates a group for the given name and closure and runs it against balanced and unbalanced
/// indexes of various sizes before finishing the group. Every iteration gets a fresh clone so
/// mutating closures always see the same tree.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut OrderedIndex<i32, i32>, i32)) {
    let mut group = c.benchmark_group(name);

    // The unbalanced trees get expensive quickly so they stop growing earlier.
    for num_levels in [3, 7, 11] {
        let tree_tests = [
            ("unbalanced", get_unbalanced_index(num_levels)),
            ("balanced", get_balanced_index(num_levels)),
        ];
        let largest_key = num_nodes_in_full_tree(num_levels) as i32 - 1;
        for (shape, index) in tree_tests {
            let id = BenchmarkId::new(shape, largest_key);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let mut index = black_box(index.clone());
                        let instant = std::time::Instant::now();
                        f(&mut index, black_box(largest_key));
                        time += instant.elapsed();
                    }
                    time
                })
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "search", |index, i| {
        let _value = black_box(index.search(&i));
    });
    bench_helper(c, "delete", |index, i| {
        black_box(index.delete(&i));
    });
    bench_helper(c, "insert", |index, i| {
        index.insert(i + 1, i + 1);
    });
    bench_helper(c, "iter", |index, _| {
        black_box(index.iter().count());
    });

    bench_helper(c, "search-miss", |index, i| {
        let _value = black_box(index.search(&(i + 1)));
    });
    bench_helper(c, "delete-miss", |index, i| {
        black_box(index.delete(&(i + 1)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
