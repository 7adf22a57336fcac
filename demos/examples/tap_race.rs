// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single tap against double tap.
//!
//! Both recognizers sit on the same node and each requires the other to fail.
//! A lone tap is reported as a single tap once the tap interval has passed;
//! two quick taps are reported only as a double tap.
//!
//! Run:
//! - `cargo run -p understory_gesture_demos --example tap_race`
//! - `RUST_LOG=understory_gesture=debug cargo run -p understory_gesture_demos --example tap_race`

use kurbo::Point;
use tracing_subscriber::EnvFilter;
use understory_gesture::variants::Tap;
use understory_gesture::{GestureArena, GestureState, Touch, TouchBatch, TouchId, TouchPhase};

const NODE: u32 = 1;

fn tap(arena: &mut GestureArena<u32>, id: u64, down: f64, taps: u32) {
    let at = Point::new(20.0, 20.0);
    for (phase, t) in [(TouchPhase::Began, down), (TouchPhase::Ended, down + 0.0625)] {
        let touch = Touch::new(TouchId(id), phase, at, t).with_tap_count(taps);
        arena.deliver_touch_batch(NODE, &TouchBatch::new(vec![touch]));
    }
}

fn settle(arena: &mut GestureArena<u32>) {
    while let Some(due) = arena.next_deadline() {
        arena.advance_time(due);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut arena: GestureArena<u32> = GestureArena::new();
    let report = |r: &understory_gesture::Recognizer<u32>| {
        if r.state() == GestureState::Recognized {
            println!("  {}", r.name());
        }
    };
    let single = arena.insert(Tap::default(), report);
    let double = arena.insert(Tap::with_taps(2), report);
    for (id, name) in [(single, "single tap"), (double, "double tap")] {
        arena.set_name(id, name).unwrap();
        arena.attach(id, NODE).unwrap();
    }
    arena.require_to_fail(single, double).unwrap();
    arena.require_to_fail(double, single).unwrap();

    println!("== One tap ==");
    tap(&mut arena, 1, 0.0, 1);
    settle(&mut arena);

    println!("== Two taps ==");
    tap(&mut arena, 2, 1.0, 1);
    tap(&mut arena, 3, 1.125, 2);
    settle(&mut arena);
}
