// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_gesture::variants::{Pan, Tap, TapTapDrag};
use understory_gesture::{GestureArena, Touch, TouchBatch, TouchId, TouchPhase};

fn drag_path(steps: usize) -> Vec<TouchBatch> {
    let mut out = Vec::with_capacity(steps + 2);
    let touch = |phase, x: f64, t: f64| {
        TouchBatch::new(vec![Touch::new(TouchId(0), phase, Point::new(x, x * 0.5), t)])
    };
    out.push(touch(TouchPhase::Began, 0.0, 0.0));
    for i in 1..=steps {
        out.push(touch(TouchPhase::Moved, i as f64 * 2.0, i as f64 / 120.0));
    }
    out.push(touch(TouchPhase::Ended, steps as f64 * 2.0, (steps + 1) as f64 / 120.0));
    out
}

/// `n` pans on one node, each required to fail by a tap.
fn pan_arena(n: usize) -> GestureArena<u32> {
    let mut arena = GestureArena::new();
    for _ in 0..n {
        let pan = arena.insert(Pan::default(), |r| {
            black_box(r.state());
        });
        let tap = arena.insert(Tap::default(), |r| {
            black_box(r.state());
        });
        arena.attach(pan, 0).unwrap();
        arena.attach(tap, 0).unwrap();
        arena.require_to_fail(tap, pan).unwrap();
    }
    arena
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pan");
    let path = drag_path(64);
    for &n in &[1usize, 8, 32] {
        group.throughput(Throughput::Elements(path.len() as u64));
        group.bench_function(format!("drag_n{}", n), |b| {
            b.iter_batched(
                || pan_arena(n),
                |mut arena| {
                    for batch in &path {
                        arena.deliver_touch_batch(0, batch);
                    }
                    black_box(arena.next_deadline());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn tap_batches(count: usize) -> Vec<TouchBatch> {
    let mut out = Vec::with_capacity(count * 2);
    for i in 0..count {
        let t = i as f64;
        let at = Point::new(10.0, 10.0);
        let id = TouchId(i as u64);
        out.push(TouchBatch::new(vec![Touch::new(id, TouchPhase::Began, at, t)]));
        out.push(TouchBatch::new(vec![Touch::new(
            id,
            TouchPhase::Ended,
            at,
            t + 0.0625,
        )]));
    }
    out
}

fn bench_tap_race(c: &mut Criterion) {
    let mut group = c.benchmark_group("tap_race");
    let batches = tap_batches(32);
    group.throughput(Throughput::Elements(batches.len() as u64));
    group.bench_function("single_vs_double_vs_drag", |b| {
        b.iter_batched(
            || {
                let mut arena: GestureArena<u32> = GestureArena::new();
                let single = arena.insert(Tap::default(), |_| {});
                let double = arena.insert(Tap::with_taps(2), |_| {});
                let drag = arena.insert(TapTapDrag::default(), |_| {});
                for id in [single, double, drag] {
                    arena.attach(id, 0).unwrap();
                }
                arena.require_to_fail(single, double).unwrap();
                arena.require_to_fail(single, drag).unwrap();
                arena
            },
            |mut arena| {
                for batch in &batches {
                    arena.deliver_touch_batch(0, batch);
                }
                while let Some(due) = arena.next_deadline() {
                    arena.advance_time(due);
                }
                black_box(arena.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_timers(c: &mut Criterion) {
    let mut group = c.benchmark_group("timers");
    for &n in &[64usize, 512] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("pending_recognition_n{}", n), |b| {
            b.iter_batched(
                || {
                    let mut arena: GestureArena<u32> = GestureArena::new();
                    let ids: Vec<_> = (0..n).map(|_| arena.insert(Tap::default(), |_| {})).collect();
                    for (i, id) in ids.iter().enumerate() {
                        arena.schedule_pending_recognition(
                            *id,
                            understory_gesture::GestureState::Recognized,
                            (i % 17) as f64 * 0.01,
                        );
                    }
                    arena
                },
                |mut arena| {
                    arena.advance_time(1.0);
                    arena.advance_time(2.0);
                    black_box(arena.next_deadline());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pan, bench_tap_race, bench_timers);
criterion_main!(benches);
