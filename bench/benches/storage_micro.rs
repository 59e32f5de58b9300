//! Storage microbenchmarks using Criterion.
//!
//! These benchmarks measure individual storage operations in isolation:
//! - Id generation and recycling
//! - Dense store insert/remove with each index backend
//! - Table churn with and without weak references to patch
//! - Class-keyed iteration, exact class and whole hierarchy

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use strata_bench::{
    churn::{Op, Plan},
    fixtures::{Mesh, Position, Velocity, register_classes},
};
use strata_engine::ecs::{
    EntityComponentDatabase, ObjectDatabase, Table,
    storage::{Allocator, DenseStore, DynamicIndex, Id, Index},
};

// =============================================================================
// Allocator Benchmarks
// =============================================================================

fn bench_allocator(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator");

    for count in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("generate", count), &count, |b, &n| {
            b.iter(|| {
                let mut ids = Allocator::<Id>::new();
                for _ in 0..n {
                    black_box(ids.generate().unwrap());
                }
            });
        });

        // Release everything, then generate again from the reuse queue
        group.bench_with_input(BenchmarkId::new("recycle", count), &count, |b, &n| {
            b.iter(|| {
                let mut ids = Allocator::<Id>::new();
                let issued: Vec<_> = (0..n).map(|_| ids.generate().unwrap()).collect();
                for id in issued {
                    ids.release(id).unwrap();
                }
                for _ in 0..n {
                    black_box(ids.generate().unwrap());
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Dense Store Benchmarks
// =============================================================================

/// Replay a churn plan against a dense store.
fn churn_store<X: Index<Id>>(store: &mut DenseStore<Position, Id, X>, plan: &Plan) {
    let mut live = Vec::new();
    let mut next = 0;
    for op in plan.ops() {
        match *op {
            Op::Create => {
                next += 1;
                let id = Id::new(next);
                store.insert(id, Position::default()).unwrap();
                live.push(id);
            }
            Op::Remove(index) => {
                black_box(store.remove(live.swap_remove(index)));
            }
        }
    }
}

fn bench_dense_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_store");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        let plan = Plan::new(count as u64, count * 2, 0.6);

        group.bench_with_input(BenchmarkId::new("hash_index", count), &plan, |b, plan| {
            b.iter(|| {
                let mut store = DenseStore::<Position, Id>::new();
                churn_store(&mut store, plan);
                black_box(store.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("dynamic_index", count), &plan, |b, plan| {
            b.iter(|| {
                let mut store = DenseStore::with_index(DynamicIndex::new());
                churn_store(&mut store, plan);
                black_box(store.len());
            });
        });
    }

    group.finish();
}

// =============================================================================
// Table Benchmarks
// =============================================================================

/// Replay a churn plan against a table, returning the ids still live.
fn churn_table(table: &mut Table<Mesh>, plan: &Plan) -> Vec<Id> {
    let mut live = Vec::new();
    for op in plan.ops() {
        match *op {
            Op::Create => live.push(table.create().unwrap()),
            Op::Remove(index) => table.remove(live.swap_remove(index)).unwrap(),
        }
    }
    live
}

fn bench_table_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_churn");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        let plan = Plan::new(7, count, 0.6);

        group.bench_with_input(BenchmarkId::new("plain", count), &plan, |b, plan| {
            b.iter(|| {
                let mut table = Table::<Mesh>::new();
                black_box(churn_table(&mut table, plan));
            });
        });

        // A referenced population is relocated by the churn, so removals patch holders
        group.bench_with_input(BenchmarkId::new("weak_refs", count), &plan, |b, plan| {
            b.iter(|| {
                let mut table = Table::<Mesh>::new();
                let refs: Vec<_> = (0..count)
                    .map(|_| {
                        let id = table.create().unwrap();
                        table.weak_ref(id).unwrap()
                    })
                    .collect();
                black_box(churn_table(&mut table, plan));
                black_box(refs.iter().filter(|r| table.resolve(r).is_ok()).count());
            });
        });
    }

    group.finish();
}

// =============================================================================
// Database Iteration Benchmarks
// =============================================================================

fn bench_database_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("database_iter");
    let classes = register_classes().unwrap();

    for count in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));

        // Setup database once for iteration benchmarks
        let mut db = ObjectDatabase::new(Arc::clone(&classes.registry));
        for _ in 0..count / 2 {
            db.create(classes.mesh).unwrap();
            db.create(classes.texture).unwrap();
        }

        group.bench_function(BenchmarkId::new("typed", count), |b| {
            b.iter(|| {
                let mut total = 0u32;
                db.for_each_of::<Mesh>(|_, mesh| total = total.wrapping_add(mesh.vertices))
                    .unwrap();
                black_box(total);
            });
        });

        group.bench_function(BenchmarkId::new("hierarchy", count), |b| {
            b.iter(|| {
                let mut visited = 0usize;
                db.for_each_of_hierarchy(classes.asset, |_, _, _| visited += 1)
                    .unwrap();
                black_box(visited);
            });
        });
    }

    group.finish();
}

fn bench_entity_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_components");
    let classes = register_classes().unwrap();

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("create_remove", count), &count, |b, &n| {
            b.iter(|| {
                let mut world = EntityComponentDatabase::new(
                    Arc::clone(&classes.registry),
                    classes.entity,
                    classes.component,
                )
                .unwrap();
                let ids: Vec<_> = (0..n)
                    .map(|_| {
                        let id = world.create_entity(classes.actor, "actor").unwrap();
                        world.create_component(classes.position, id).unwrap();
                        world.create_component(classes.velocity, id).unwrap();
                        id
                    })
                    .collect();
                for id in ids {
                    world.remove_entity(id).unwrap();
                }
                black_box(world.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("integrate", count), &count, |b, &n| {
            let mut world = EntityComponentDatabase::new(
                Arc::clone(&classes.registry),
                classes.entity,
                classes.component,
            )
            .unwrap();
            let ids: Vec<_> = (0..n)
                .map(|_| {
                    let id = world.create_entity(classes.actor, "actor").unwrap();
                    world.create_component(classes.position, id).unwrap();
                    world.create_component_of::<Velocity>(id).unwrap();
                    world.component_mut_of::<Velocity>(id).unwrap().x = 1.0;
                    id
                })
                .collect();

            b.iter(|| {
                for id in &ids {
                    let velocity = world.component_of::<Velocity>(*id).unwrap().x;
                    world.component_mut_of::<Position>(*id).unwrap().x += velocity;
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_allocator,
    bench_dense_store,
    bench_table_churn,
    bench_database_iter,
    bench_entity_components,
);
criterion_main!(benches);
