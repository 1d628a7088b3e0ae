//! Concurrency tests for the snapshot cache.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use rapid_cache::SnapshotCache;
use rapid_common::{CacheConfig, RelationKey};
use rapid_exec::{JoinType, NestedLoopJoin, ReadStatus, RowIterator, TableScanSource};
use rapid_storage::Relation;
use rapid_test::{decode_id, init_tracing, numbered_relation, ScriptedSource};

const THREADS: usize = 8;

fn key(name: &str) -> RelationKey {
    RelationKey::new("test", name)
}

#[test]
fn test_concurrent_same_key_builds_once() {
    init_tracing();
    let cache = Arc::new(SnapshotCache::default());
    let relation = Arc::new(numbered_relation("dim", 100).unwrap());
    relation.delay_open(Some(Duration::from_millis(20)));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let relation = Arc::clone(&relation);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.load_or_build(&key("dim"), relation.as_ref())
            })
        })
        .collect();

    let snapshots: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    for snapshot in &snapshots[1..] {
        assert!(Arc::ptr_eq(&snapshots[0], snapshot));
    }
    assert_eq!(snapshots[0].row_count(), 100);
    assert_eq!(cache.counters().builds(), 1);
    assert_eq!(cache.counters().hits(), THREADS as u64 - 1);
    assert_eq!(relation.scans_opened(), 1);
    assert_eq!(relation.scans_closed(), 1);
}

#[test]
fn test_concurrent_distinct_keys() {
    let cache = Arc::new(SnapshotCache::default());
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let name = format!("dim{i}");
                let relation = numbered_relation(&name, i as u32 + 1).unwrap();
                for _ in 0..3 {
                    let snapshot = cache.load_or_build(&key(&name), &relation).unwrap();
                    assert_eq!(snapshot.row_count(), i + 1);
                }
                relation.scans_opened()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(cache.len(), THREADS);
    assert_eq!(cache.counters().builds(), THREADS as u64);
    assert_eq!(cache.stats().total_cached_rows, (1..=THREADS).sum::<usize>());
}

#[test]
fn test_oversize_never_cached_under_contention() {
    let cache = Arc::new(SnapshotCache::new(CacheConfig::with_threshold(50)));
    let relation = Arc::new(numbered_relation("fact", 51).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let relation = Arc::clone(&relation);
            thread::spawn(move || cache.load_or_build(&key("fact"), relation.as_ref()))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_none());
    }
    assert!(!cache.contains(&key("fact")));
    assert_eq!(cache.counters().oversize_skips(), THREADS as u64);
    assert_eq!(relation.scans_opened(), relation.scans_closed());
}

#[test]
fn test_threshold_boundary_default() {
    let cache = SnapshotCache::default();
    let at_limit = numbered_relation("at_limit", 10_000).unwrap();
    let over_limit = numbered_relation("over_limit", 10_001).unwrap();

    assert!(cache.should_cache(&at_limit.descriptor()));
    assert!(!cache.should_cache(&over_limit.descriptor()));
    assert_eq!(
        cache
            .load_or_build(&key("at_limit"), &at_limit)
            .unwrap()
            .row_count(),
        10_000
    );
    assert!(cache.load_or_build(&key("over_limit"), &over_limit).is_none());
}

#[test]
fn test_clear_then_rebuild() {
    let cache = SnapshotCache::default();
    let relation = numbered_relation("dim", 3).unwrap();

    let first = cache.load_or_build(&key("dim"), &relation).unwrap();
    cache.clear();
    assert!(cache.get_if_present(&key("dim")).is_none());

    relation.delete(0).unwrap();
    let second = cache.load_or_build(&key("dim"), &relation).unwrap();

    assert_eq!(cache.counters().builds(), 2);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.row_count(), 3);
    assert_eq!(second.row_count(), 2);
    assert_eq!(decode_id(second.get_row(0).unwrap()), 1);
}

#[test]
fn test_lookups_do_not_wait_for_builds() {
    let cache = Arc::new(SnapshotCache::default());
    let slow = Arc::new(numbered_relation("slow", 10).unwrap());
    slow.delay_open(Some(Duration::from_millis(500)));

    let builder = {
        let cache = Arc::clone(&cache);
        let slow = Arc::clone(&slow);
        thread::spawn(move || cache.load_or_build(&key("slow"), slow.as_ref()))
    };

    thread::sleep(Duration::from_millis(50));
    let start = Instant::now();
    assert!(cache.get_if_present(&key("slow")).is_none());
    assert_eq!(cache.stats().cached_relation_count, 0);
    assert!(start.elapsed() < Duration::from_millis(400));

    assert!(builder.join().unwrap().is_some());
    assert!(cache.get_if_present(&key("slow")).is_some());
}

#[test]
fn test_concurrent_joins_share_snapshot() {
    init_tracing();
    let cache = Arc::new(SnapshotCache::default());
    let inner: Arc<dyn Relation> = Arc::new(numbered_relation("dim", 5).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let inner = Arc::clone(&inner);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let outer = ScriptedSource::with_ids("outer", [t as u32, t as u32 + 100]);
                let mut join = NestedLoopJoin::new(
                    Box::new(outer),
                    Box::new(TableScanSource::new(inner)),
                    JoinType::Inner,
                )
                .with_cache(cache);

                barrier.wait();
                join.init().unwrap();
                let mut pairs = Vec::new();
                while join.read().unwrap() == ReadStatus::Row {
                    pairs.push((
                        decode_id(join.outer_row().as_slice()),
                        decode_id(join.inner_row().as_slice()),
                    ));
                }
                (pairs, join.stats())
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let (pairs, stats) = handle.join().unwrap();
        let expected: Vec<_> = [t as u32, t as u32 + 100]
            .into_iter()
            .flat_map(|o| (0..5).map(move |i| (o, i)))
            .collect();
        assert_eq!(pairs, expected);
        assert_eq!(stats.cache_hits, 10);
        assert_eq!(stats.inner_rows_scanned, 0);
    }
    assert_eq!(cache.counters().builds(), 1);
}
