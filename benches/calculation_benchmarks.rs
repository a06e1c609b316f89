//! Performance benchmarks for the time-bank engine.
//!
//! Covers per-punch computation, batch recalculation over a month of punches
//! and the HTTP `/compute` path.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};

use timebank_engine::api::{AppState, create_router};
use timebank_engine::config::ConfigLoader;
use timebank_engine::engine::{HoursEngine, StaticDirectory, TracingSink};
use timebank_engine::models::PunchRecord;
use timebank_engine::store::{MemoryStore, Repository};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

/// Creates an engine over an empty in-memory store.
fn create_engine() -> Arc<HoursEngine> {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    let (config, employees) = loader.into_parts();
    Arc::new(HoursEngine::new(
        config,
        Arc::new(Repository::new(Arc::new(MemoryStore::new()))),
        Arc::new(StaticDirectory::new(employees)),
        Arc::new(TracingSink),
    ))
}

/// One punch per day starting 2026-01-01, alternating plain, overtime and night shifts.
fn create_punches(count: usize) -> Vec<PunchRecord> {
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let (check_in, check_out) = match i % 3 {
                0 => ("08:00", "17:00"),
                1 => ("08:00", "19:30"),
                _ => ("18:00", "01:00"),
            };
            PunchRecord::new(format!("punch_{:04}", i), "emp_001", date, check_in, check_out)
        })
        .collect()
}

/// Benchmark: Single punch computation, including persistence.
fn bench_single_punch(c: &mut Criterion) {
    let punch = create_punches(2).remove(1);

    c.bench_function("compute_single_punch", |b| {
        b.iter_batched(
            create_engine,
            |engine| black_box(engine.compute_daily_hours(&punch).unwrap()),
            BatchSize::SmallInput,
        )
    });
}

/// Benchmark: Computing a growing number of punches for one employee.
fn bench_punch_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("punch_batches");

    for count in [7, 31, 90].iter() {
        let punches = create_punches(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("punches", count), count, |b, _| {
            b.iter_batched(
                create_engine,
                |engine| {
                    for punch in &punches {
                        black_box(engine.compute_daily_hours(punch).unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark: Recalculating a month of stored punches.
fn bench_recalc_month(c: &mut Criterion) {
    let from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();

    let mut group = c.benchmark_group("recalc");
    group.throughput(Throughput::Elements(31));
    group.sample_size(20);

    group.bench_function("recalc_month", |b| {
        b.iter_batched(
            || {
                let engine = create_engine();
                engine.record_punches(create_punches(31)).unwrap();
                engine
            },
            |engine| black_box(engine.recalc_range("emp_001", from, to).unwrap()),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

/// Benchmark: `POST /compute` through the router.
fn bench_http_compute(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let body = serde_json::json!({
        "id": "punch_http",
        "employee_id": "emp_001",
        "date": "2026-01-14",
        "check_in": "08:00",
        "check_out": "18:00"
    })
    .to_string();

    c.bench_function("http_compute", |b| {
        b.to_async(&rt).iter_batched(
            || create_router(AppState::new(create_engine())),
            |router| {
                let body = body.clone();
                async move {
                    let response = router
                        .oneshot(
                            Request::builder()
                                .method("POST")
                                .uri("/compute")
                                .header("Content-Type", "application/json")
                                .body(Body::from(body))
                                .unwrap(),
                        )
                        .await
                        .unwrap();
                    black_box(response)
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_single_punch,
    bench_punch_batches,
    bench_recalc_month,
    bench_http_compute,
);
criterion_main!(benches);
