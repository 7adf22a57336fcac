// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap, then hold and drag.
//!
//! Run:
//! - `cargo run -p understory_gesture_demos --example tap_tap_drag`

use kurbo::Point;
use tracing_subscriber::EnvFilter;
use understory_gesture::variants::TapTapDrag;
use understory_gesture::{GestureArena, Touch, TouchBatch, TouchId, TouchPhase};

fn batch(id: u64, phase: TouchPhase, x: f64, t: f64, taps: u32) -> TouchBatch {
    TouchBatch::new(vec![
        Touch::new(TouchId(id), phase, Point::new(x, 0.0), t).with_tap_count(taps),
    ])
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut arena: GestureArena<u32> = GestureArena::new();
    let drag = arena.insert(TapTapDrag::default(), |r| {
        println!("  {} with {} touch(es)", r.state(), r.number_of_touches());
    });
    arena.attach(drag, 0).unwrap();

    arena.deliver_touch_batch(0, &batch(1, TouchPhase::Began, 0.0, 0.0, 1));
    arena.deliver_touch_batch(0, &batch(1, TouchPhase::Ended, 0.0, 0.1, 1));
    arena.deliver_touch_batch(0, &batch(2, TouchPhase::Began, 0.0, 0.2, 2));
    // Hold until the drag begins.
    arena.advance_time(0.5);

    for (i, x) in [10.0, 25.0, 45.0].into_iter().enumerate() {
        let t = 0.6 + 0.1 * i as f64;
        arena.deliver_touch_batch(0, &batch(2, TouchPhase::Moved, x, t, 2));
    }
    let gesture = arena.gesture::<TapTapDrag>(drag).unwrap();
    println!(
        "  translation {:?} velocity {:?}",
        gesture.translation(),
        gesture.velocity()
    );
    arena.deliver_touch_batch(0, &batch(2, TouchPhase::Ended, 45.0, 1.0, 2));
}
