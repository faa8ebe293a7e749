//! Criterion benchmarks for safe_observability

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use safe_observability::core::serializer::{serialize_bounded, serialize_cycle_safe};
use safe_observability::prelude::*;
use std::sync::Arc;

fn buffered_logger(structured: bool) -> (Logger, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let logger = Logger::builder("Bench")
        .min_level(LogLevel::Verbose)
        .structured(structured)
        .colors(false)
        .console_target(ConsoleTarget::Buffer(buffer.clone()))
        .build();
    (logger, buffer)
}

fn nested(levels: usize) -> ContextValue {
    let mut value = ContextValue::map().with("symbol", "ACME").with("price", 42.5);
    for i in 0..levels {
        value = ContextValue::map().with(format!("level{}", i), value);
    }
    value
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder("Bench")
        .min_level(LogLevel::Error)
        .console_enabled(false)
        .build();

    group.bench_function("filtered_out", |b| {
        b.iter(|| logger.debug(black_box("dropped")));
    });

    group.bench_function("can_log", |b| {
        b.iter(|| black_box(logger.can_log(black_box(LogLevel::Info))));
    });

    group.bench_function("can_log_str", |b| {
        b.iter(|| black_box(logger.can_log_str(black_box("warn"))));
    });

    group.finish();
}

// ============================================================================
// Logging Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let (structured, buffer) = buffered_logger(true);
    let extra = ContextValue::map().with("symbol", "ACME").with("bid", 41.9).with("ask", 42.1);

    // The buffer is cleared between batches so it does not grow for the
    // whole run
    group.bench_function("structured_message", |b| {
        b.iter_batched(
            || buffer.clear(),
            |_| structured.info(black_box("Quote refreshed")),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("structured_with_extra", |b| {
        b.iter_batched(
            || buffer.clear(),
            |_| structured.info_with(black_box("Quote refreshed"), extra.clone()),
            BatchSize::SmallInput,
        );
    });

    let (pretty, pretty_buffer) = buffered_logger(false);
    group.bench_function("pretty_with_extra", |b| {
        b.iter_batched(
            || pretty_buffer.clear(),
            |_| pretty.info_with(black_box("Quote refreshed"), extra.clone()),
            BatchSize::SmallInput,
        );
    });

    let silent = Logger::builder("Bench").console_enabled(false).build();
    group.bench_function("no_sinks_enabled", |b| {
        b.iter(|| silent.info_with(black_box("Quote refreshed"), extra.clone()));
    });

    group.finish();
}

// ============================================================================
// Serializer Benchmarks
// ============================================================================

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for levels in [1usize, 10, 50] {
        let value = nested(levels);
        group.bench_with_input(BenchmarkId::new("bounded", levels), &value, |b, value| {
            b.iter(|| black_box(serialize_bounded(value, 10)));
        });
        group.bench_with_input(BenchmarkId::new("cycle_safe", levels), &value, |b, value| {
            b.iter(|| black_box(serialize_cycle_safe(value)));
        });
    }

    let ring = ContextValue::map().with("name", "ring");
    ring.insert("self", ring.clone());
    group.bench_function("cycle_safe_self_reference", |b| {
        b.iter(|| black_box(serialize_cycle_safe(&ring)));
    });
    group.bench_function("bounded_self_reference", |b| {
        b.iter(|| black_box(serialize_bounded(&ring, 10)));
    });
    ring.insert("self", ContextValue::Null);

    group.finish();
}

// ============================================================================
// Boundary Benchmarks
// ============================================================================

fn bench_normalizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalizer");
    group.throughput(Throughput::Elements(1));

    let logger = Arc::new(Logger::builder("Bench").console_enabled(false).build());
    let normalizer = ExceptionNormalizer::new(logger, Environment::Production);
    let request = RequestContext::new()
        .with_url("/api/quotes")
        .with_header("request-id", "bench");

    group.bench_function("http_failure", |b| {
        b.iter(|| black_box(normalizer.respond(Failure::http(404, "Not Found"), &request)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_level_filtering,
    bench_logging,
    bench_serialization,
    bench_normalizer,
);
criterion_main!(benches);
