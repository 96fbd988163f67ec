// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for the wire codec.
//!
//! Run with: `cargo bench --bench protocol`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use raglink::protocol::{decode_line, Command};

/// Benchmark command encoding.
fn bench_encode(c: &mut Criterion) {
    let bare = Command::new("detect_deadlock");
    let with_params = Command::new("add_process")
        .arg("name", "Process-7")
        .arg("priority", 50);

    let mut group = c.benchmark_group("protocol_encode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("bare_command", |b| {
        b.iter(|| black_box(&bare).encode());
    });

    group.bench_function("command_with_params", |b| {
        b.iter(|| black_box(&with_params).encode());
    });

    group.finish();
}

/// Benchmark response decoding, including the noise-rejection path.
fn bench_decode(c: &mut Criterion) {
    let success =
        r#"{"status": "success", "message": "Process added", "data": {"process_id": 1}}"#;
    let nested = r#"{"status": "success", "data": {"processes": [{"id": 0, "name": "P0"}, {"id": 1, "name": "P1"}], "resources": [], "requests": [], "assignments": []}}"#;
    let noise = "debug: scanning wait-for graph at node 3";

    let mut group = c.benchmark_group("protocol_decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("success_reply", |b| {
        b.iter(|| decode_line(black_box(success)));
    });

    group.bench_function("nested_state_reply", |b| {
        b.iter(|| decode_line(black_box(nested)));
    });

    group.bench_function("noise_line", |b| {
        b.iter(|| decode_line(black_box(noise)));
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);

criterion_main!(benches);
