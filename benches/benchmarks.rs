//! Performance benchmarks for gramdex
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gramdex::{Engine, EngineConfig, Record};
use serde_json::json;

/// Deterministic sample records: a person object with nested tags
fn sample_records(count: usize) -> Vec<Record> {
    const FIRST: [&str; 8] = ["Peter", "Paul", "Maria", "Andreas", "Joachim", "Frank", "Grete", "Hans"];
    const LAST: [&str; 6] = ["Knerenz", "Herrfrau", "Grün", "Wurst", "Meier", "Schmidt"];

    (0..count)
        .map(|i| {
            Record::from(json!({
                "name": format!("{} {}", FIRST[i % FIRST.len()], LAST[(i / 3) % LAST.len()]),
                "id": i,
                "active": i % 2 == 0,
                "tags": [format!("team-{}", i % 17), format!("floor {}", i % 5)]
            }))
        })
        .collect()
}

fn populated_engine(k: usize, count: usize) -> Engine {
    let mut engine = Engine::new(EngineConfig::default().with_max_shingle_length(k))
        .expect("Failed to create engine");
    for record in sample_records(count) {
        engine.add(record).expect("Failed to add record");
    }
    engine
}

fn bench_shingle_cutting(c: &mut Criterion) {
    let short = "Andreas Knerenz";
    let long = short.repeat(40);

    let mut group = c.benchmark_group("shingle_cutting");
    for len in [1, 3, 12] {
        group.bench_with_input(BenchmarkId::new("short", len), &len, |b, &len| {
            b.iter(|| gramdex::utils::cut(black_box(short), len))
        });
        group.bench_with_input(BenchmarkId::new("long_600", len), &len, |b, &len| {
            b.iter(|| gramdex::utils::cut(black_box(&long), len))
        });
    }
    group.finish();
}

fn bench_add(c: &mut Criterion) {
    let records = sample_records(1_000);

    let mut group = c.benchmark_group("add");
    group.sample_size(20);
    for k in [4, 12] {
        group.bench_with_input(BenchmarkId::new("1k_records", k), &k, |b, &k| {
            b.iter(|| {
                let mut engine =
                    Engine::new(EngineConfig::default().with_max_shingle_length(k)).unwrap();
                for record in &records {
                    engine.add(record.clone()).unwrap();
                }
                engine
            })
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let engine = populated_engine(5, 5_000);

    let mut group = c.benchmark_group("search");

    // Fits a level: one lookup
    group.bench_function("direct_single_char", |b| {
        b.iter(|| engine.search(black_box("p")))
    });
    group.bench_function("direct", |b| b.iter(|| engine.search(black_box("grün"))));

    // Longer than K: decompose, count and verify
    group.bench_function("indirect", |b| {
        b.iter(|| engine.search(black_box("andreas knerenz")))
    });
    group.bench_function("indirect_miss", |b| {
        b.iter(|| engine.search(black_box("andreas wurstbrot")))
    });

    group.bench_function("number", |b| b.iter(|| engine.search(black_box(4242_i64))));

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let engine = populated_engine(5, 2_000);

    c.bench_function("remove_then_add", |b| {
        b.iter_batched(
            || engine.clone(),
            |mut engine| {
                let record = engine.remove(black_box(1_000)).unwrap();
                engine.add(record).unwrap()
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let engine = populated_engine(5, 2_000);
    let json = serde_json::to_string(&engine.export_state()).unwrap();

    let mut group = c.benchmark_group("snapshot");
    group.sample_size(20);
    group.bench_function("export", |b| b.iter(|| engine.export_state()));
    group.bench_function("import", |b| {
        b.iter(|| {
            let snapshot = serde_json::from_str(black_box(&json)).unwrap();
            Engine::import_state(snapshot).unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_shingle_cutting,
    bench_add,
    bench_search,
    bench_remove,
    bench_snapshot,
);

criterion_main!(benches);
