// Run with `cargo bench --bench fire`. Stack capture cost depends heavily on
// debug info, see `profile.bench` in the workspace manifest.

use criterion::{criterion_group, criterion_main, Criterion};
use sentryhook::format::{Formatter, JsonFormatter};
use sentryhook::trace::{ErrorReport, TracedError};
use sentryhook::transport::NoopTransport;
use sentryhook::{LogEntry, LogLevel, SentryHook, StacktraceConfig};
use std::hint::black_box;

fn entry() -> LogEntry<'static> {
    LogEntry::new(LogLevel::Error, "payment declined")
        .with_field("order_id", 1234)
        .with_field("customer", "c-42")
        .with_field("retry", false)
}

fn criterion_benchmark(c: &mut Criterion) {
    let entry = entry();

    let plain = SentryHook::new(NoopTransport::new()).unwrap();
    c.bench_function("fire_no_stacktrace", |b| b.iter(|| plain.fire(black_box(&entry))));

    let traced = SentryHook::builder(NoopTransport::new())
        .with_stacktrace(StacktraceConfig {
            enable: true,
            ..Default::default()
        })
        .build()
        .unwrap();
    c.bench_function("fire_with_stacktrace", |b| {
        b.iter(|| traced.fire(black_box(&entry)))
    });

    let err = TracedError::new(ErrorReport::new("connection reset"));
    c.bench_function("find_stacktrace_traced_error", |b| {
        b.iter(|| plain.find_stacktrace(Some(black_box(&err))))
    });

    let formatter = JsonFormatter::new();
    c.bench_function("json_format", |b| b.iter(|| formatter.format(black_box(&entry))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
