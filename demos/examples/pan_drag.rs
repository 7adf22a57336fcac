// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan in node coordinates.
//!
//! A pan attached to a node that is scaled by two reports its translation in
//! both scene and node coordinates.
//!
//! Run:
//! - `cargo run -p understory_gesture_demos --example pan_drag`

use kurbo::{Affine, Point};
use tracing_subscriber::EnvFilter;
use understory_gesture::variants::Pan;
use understory_gesture::{
    GestureArena, GestureState, NodeTransforms, Touch, TouchBatch, TouchId, TouchPhase,
};

const NODE: u32 = 7;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut space = NodeTransforms::new();
    space.set(NODE, Affine::translate((100.0, 0.0)) * Affine::scale(2.0));
    let mut arena: GestureArena<u32, _> = GestureArena::with_space(space);
    let pan = arena.insert(Pan::default(), |r| {
        if r.state() != GestureState::Changed {
            println!("  pan {}", r.state());
        }
    });
    arena.attach(pan, NODE).unwrap();

    let path = [
        (TouchPhase::Began, 110.0, 0.0),
        (TouchPhase::Moved, 114.0, 0.05),
        (TouchPhase::Moved, 130.0, 0.1),
        (TouchPhase::Moved, 150.0, 0.15),
        (TouchPhase::Ended, 150.0, 0.2),
    ];
    for (phase, x, t) in path {
        let touch = Touch::new(TouchId(0), phase, Point::new(x, 40.0), t);
        arena.deliver_touch_batch(NODE, &TouchBatch::new(vec![touch]));

        let state = arena.state(pan).unwrap();
        if state.is_recognizing() {
            let gesture = arena.gesture::<Pan>(pan).unwrap();
            println!(
                "  t={t:.2} scene {:?} node {:?} velocity {:?}",
                gesture.translation(),
                gesture.translation_in(arena.space(), &NODE),
                gesture.velocity(),
            );
        }
    }
}
