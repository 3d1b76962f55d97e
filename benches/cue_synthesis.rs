// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for cue waveform synthesis.
//!
//! Rendering happens on the enqueue path, so it must stay cheap relative
//! to the admission bookkeeping it accompanies.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use toast_cue::audio::render_cue;
use toast_cue::notification::Variant;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("cue_synthesis");

    group.bench_function("render_default_cue", |b| {
        b.iter(|| {
            black_box(render_cue(black_box(Variant::Default), 48_000));
        });
    });

    group.bench_function("render_critical_cue", |b| {
        b.iter(|| {
            black_box(render_cue(black_box(Variant::Critical), 48_000));
        });
    });

    group.bench_function("render_at_44100", |b| {
        b.iter(|| {
            black_box(render_cue(black_box(Variant::Warning), 44_100));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
