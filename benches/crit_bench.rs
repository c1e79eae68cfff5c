use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mway_btree::{Natural, Tree};

criterion_group!(
    benches,
    bench_get,
    bench_put_remove,
    bench_ref_iter,
    bench_cursor_walk,
    bench_orders
);
criterion_main!(benches);

fn build(order: usize, n: usize) -> Tree<usize, usize> {
    let mut t = Tree::new(order, Natural);
    for i in 0..n {
        t.put(i, i);
    }
    t
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("Get");
    for n in [50, 100, 200, 500, 1000].iter() {
        let n = *n;
        let exp_map = build(mway_btree::DEFAULT_ORDER, n);

        let mut std_map = std::collections::BTreeMap::new();
        for i in 0..n {
            std_map.insert(i, i);
        }

        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| {
                for i in 0..n {
                    assert!(exp_map.get(&i).unwrap() == &i);
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                for i in 0..n {
                    assert!(std_map.get(&i).unwrap() == &i);
                }
            })
        });
    }
    group.finish();
}

fn bench_put_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("PutRemove");
    for n in [1000, 10000].iter() {
        let n = *n;
        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| {
                let mut m = build(mway_btree::DEFAULT_ORDER, n);
                for i in 0..n {
                    assert!(m.remove(&i) == Some(i));
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                let mut m = std::collections::BTreeMap::new();
                for i in 0..n {
                    m.insert(i, i);
                }
                for i in 0..n {
                    assert!(m.remove(&i) == Some(i));
                }
            })
        });
    }
    group.finish();
}

fn bench_ref_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("RefIter");
    for n in [100, 1000, 10000, 100000].iter() {
        let exp_map = build(mway_btree::DEFAULT_ORDER, *n);

        let mut std_map = std::collections::BTreeMap::new();
        for i in 0..*n {
            std_map.insert(i, i);
        }

        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| {
                for (k, v) in exp_map.iter() {
                    assert!(k == v);
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                for (k, v) in std_map.iter() {
                    assert!(k == v);
                }
            })
        });
    }
    group.finish();
}

fn bench_cursor_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("CursorWalk");
    for n in [1000, 10000].iter() {
        let exp_map = build(mway_btree::DEFAULT_ORDER, *n);
        group.bench_function(BenchmarkId::new("Forward", n), |b| {
            b.iter(|| {
                let mut it = exp_map.ordered_begin();
                while it.next() {
                    assert!(it.key() == it.get());
                }
            })
        });
        group.bench_function(BenchmarkId::new("Backward", n), |b| {
            b.iter(|| {
                let mut it = exp_map.ordered_end();
                while it.previous() {
                    assert!(it.key() == it.get());
                }
            })
        });
    }
    group.finish();
}

fn bench_orders(c: &mut Criterion) {
    let mut group = c.benchmark_group("Order");
    let n = 10000;
    for order in [3, 8, 32, 128].iter() {
        let exp_map = build(*order, n);
        group.bench_function(BenchmarkId::new("Get", order), |b| {
            b.iter(|| {
                for i in 0..n {
                    assert!(exp_map.get(&i).unwrap() == &i);
                }
            })
        });
        group.bench_function(BenchmarkId::new("Build", order), |b| b.iter(|| build(*order, n)));
    }
    group.finish();
}

use mimalloc::MiMalloc;
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
