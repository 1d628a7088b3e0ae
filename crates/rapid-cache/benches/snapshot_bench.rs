//! Snapshot cache benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapid_cache::{SnapshotCache, TableSnapshot};
use rapid_common::{RelationKey, CACHE_ROW_THRESHOLD};
use rapid_storage::{MemRelation, ScanGuard, ScanStatus};

const ROW_LENGTH: usize = 32;

fn random_relation(name: &str, rows: usize) -> MemRelation {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<[u8; ROW_LENGTH]> = (0..rows).map(|_| rng.gen()).collect();
    MemRelation::with_rows(RelationKey::new("bench", name), ROW_LENGTH, data)
        .expect("rows have the declared length")
}

fn snapshot_build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_build");
    for rows in [100usize, 1_000, 10_000] {
        let relation = random_relation("dim", rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &relation, |b, relation| {
            b.iter(|| {
                let snapshot = TableSnapshot::build(relation, CACHE_ROW_THRESHOLD).unwrap();
                black_box(snapshot.row_count())
            })
        });
    }
    group.finish();
}

fn snapshot_iterate_benchmark(c: &mut Criterion) {
    let relation = random_relation("dim", 1_000);
    let snapshot = TableSnapshot::build(&relation, CACHE_ROW_THRESHOLD).unwrap();

    c.bench_function("snapshot_iterate_1000", |b| {
        b.iter(|| {
            let mut checksum = 0u64;
            for row in snapshot.rows() {
                checksum = checksum.wrapping_add(u64::from(row[0]));
            }
            black_box(checksum)
        })
    });
}

fn live_scan_benchmark(c: &mut Criterion) {
    let relation = random_relation("dim", 1_000);

    c.bench_function("live_scan_1000", |b| {
        b.iter(|| {
            let mut scan = ScanGuard::open(&relation, true).unwrap();
            let mut record = [0u8; ROW_LENGTH];
            let mut checksum = 0u64;
            while scan.next_row(&mut record).unwrap() != ScanStatus::EndOfData {
                checksum = checksum.wrapping_add(u64::from(record[0]));
            }
            black_box(checksum)
        })
    });
}

fn cache_hit_benchmark(c: &mut Criterion) {
    let relation = random_relation("dim", 1_000);
    let key = relation.key();
    let cache = SnapshotCache::default();
    cache.load_or_build(&key, &relation).unwrap();

    c.bench_function("cache_get_if_present", |b| {
        b.iter(|| black_box(cache.get_if_present(&key).map(|s| s.row_count())))
    });
}

criterion_group!(
    benches,
    snapshot_build_benchmark,
    snapshot_iterate_benchmark,
    live_scan_benchmark,
    cache_hit_benchmark,
);
criterion_main!(benches);
