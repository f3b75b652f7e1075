// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//! Performance benchmarks for the write and read paths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use logdex_appender::{AppenderConfig, IndexedAppender, LogRecord, MessageFieldHook};
use logdex_index::IndexSnapshot;
use logdex_query::{RangeQueryEngine, SearchConfig};

fn appender(dir: &TempDir, max_backup_index: u32) -> IndexedAppender {
    let config = AppenderConfig::new(dir.path().join("app.log"))
        .with_max_backup_index(max_backup_index)
        .with_max_file_size(u64::MAX);
    IndexedAppender::open(config).unwrap()
}

fn record(i: usize) -> LogRecord {
    LogRecord::new(format!("request {i} served in {}ms status=200\n", i % 97))
        .with_context_id(format!("sess{}", i % 50))
        .with_context("status", "ok")
}

// ============================================================================
// Write path
// ============================================================================

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Elements(1));

    group.bench_function("append_record", |b| {
        let dir = TempDir::new().unwrap();
        let appender = appender(&dir, 1);
        let mut i = 0;
        b.iter(|| {
            i += 1;
            black_box(appender.append_record(&record(i)).unwrap())
        });
    });

    group.bench_function("append_record_with_message", |b| {
        let dir = TempDir::new().unwrap();
        let config = AppenderConfig::new(dir.path().join("app.log")).with_max_file_size(u64::MAX);
        let appender = IndexedAppender::builder(config)
            .field_hook(MessageFieldHook)
            .open()
            .unwrap();
        let mut i = 0;
        b.iter(|| {
            i += 1;
            black_box(appender.append_record(&record(i)).unwrap())
        });
    });

    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for batch in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("append_then_commit", batch), &batch, |b, &batch| {
            let dir = TempDir::new().unwrap();
            let appender = appender(&dir, 1);
            b.iter(|| {
                for i in 0..batch {
                    appender.append_record(&record(i)).unwrap();
                }
                black_box(appender.commit().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation");

    for max_backup_index in [1u32, 5] {
        group.bench_with_input(
            BenchmarkId::new("rotate_now", max_backup_index),
            &max_backup_index,
            |b, &max| {
                let dir = TempDir::new().unwrap();
                let appender = appender(&dir, max);
                b.iter(|| {
                    appender.append_record(&record(0)).unwrap();
                    appender.rotate_now().unwrap()
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Read path
// ============================================================================

fn bench_search(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let config = AppenderConfig::new(dir.path().join("app.log"))
        .with_max_backup_index(2)
        .with_max_file_size(u64::MAX);
    let appender = IndexedAppender::builder(config)
        .field_hook(MessageFieldHook)
        .open()
        .unwrap();
    for generation in 0..3 {
        for i in 0..1000 {
            appender.append_record(&record(i)).unwrap();
        }
        if generation < 2 {
            appender.rotate_now().unwrap();
        }
    }
    appender.close().unwrap();

    let engine = RangeQueryEngine::new(
        SearchConfig::new(dir.path().join("app.log")).with_max_backup_index(2),
    );
    let mut group = c.benchmark_group("search");
    group.throughput(Throughput::Elements(3000));

    group.bench_function("record_id_all_generations", |b| {
        b.iter(|| black_box(engine.search("sess7").unwrap()))
    });

    group.bench_function("custom_field_all_generations", |b| {
        b.iter(|| black_box(engine.search("fields.status:ok").unwrap()))
    });

    group.bench_function("offsets_one_generation", |b| {
        let index_path = engine.generations().layout().index_path(1);
        b.iter(|| black_box(IndexSnapshot::open(&index_path).unwrap().offsets().unwrap()))
    });

    group.finish();
}

criterion_group!(write_benches, bench_append, bench_commit, bench_rotation);

criterion_group!(read_benches, bench_search);

criterion_main!(write_benches, read_benches);
