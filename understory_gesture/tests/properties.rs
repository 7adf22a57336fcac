// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for state transitions and touch bookkeeping.

use kurbo::Point;
use proptest::prelude::*;
use understory_gesture::variants::{Pan, Tap, TapAndAHalf, TapTapDrag};
use understory_gesture::{
    Gesture, GestureArena, GestureState, Touch, TouchBatch, TouchId, TouchPhase, Transition,
};

#[derive(Debug)]
struct Scripted;

impl Gesture for Scripted {}

fn state_strategy() -> impl Strategy<Value = GestureState> {
    prop::sample::select(GestureState::ALL.to_vec())
}

fn phase_strategy() -> impl Strategy<Value = TouchPhase> {
    prop::sample::select(vec![
        TouchPhase::Began,
        TouchPhase::Moved,
        TouchPhase::Stationary,
        TouchPhase::Ended,
        TouchPhase::Cancelled,
    ])
}

/// One sample: touch id, phase, location, tap count.
fn sample_strategy() -> impl Strategy<Value = (u64, TouchPhase, (f64, f64), u32)> {
    (
        0_u64..4,
        phase_strategy(),
        (-50.0_f64..50.0, -50.0_f64..50.0),
        1_u32..4,
    )
}

/// Batches with strictly increasing timestamps, one millisecond to half a
/// second apart.
fn batches_strategy() -> impl Strategy<Value = Vec<TouchBatch>> {
    prop::collection::vec(
        (
            prop::collection::vec(sample_strategy(), 1..4),
            1_u32..500,
        ),
        1..40,
    )
    .prop_map(|steps| {
        let mut t = 0.0;
        steps
            .into_iter()
            .map(|(samples, gap_ms)| {
                t += f64::from(gap_ms) / 1000.0;
                let mut touches: Vec<Touch> = Vec::new();
                for (id, phase, (x, y), taps) in samples {
                    if touches.iter().any(|s| s.id == TouchId(id)) {
                        continue;
                    }
                    touches.push(
                        Touch::new(TouchId(id), phase, Point::new(x, y), t).with_tap_count(taps),
                    );
                }
                TouchBatch::new(touches)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn committed_states_follow_the_transition_table(
        requests in prop::collection::vec(state_strategy(), 1..30),
    ) {
        let mut arena = GestureArena::<u32>::new();
        let id = arena.insert(Scripted, |_| {});
        for to in requests {
            let from = arena.state(id).unwrap();
            arena.request_state(id, to);
            arena.advance(id);
            let after = arena.state(id).unwrap();
            if Transition::find(from, to).is_some() {
                prop_assert_eq!(after, to);
            } else {
                prop_assert_eq!(after, from);
            }
            prop_assert_eq!(arena.get(id).unwrap().requested_state(), None);
        }
    }

    #[test]
    fn ignored_touches_are_always_tracked(batches in batches_strategy()) {
        let mut arena = GestureArena::<u32>::new();
        let ids = [
            arena.insert(Tap::default(), |_| {}),
            arena.insert(Tap::with_taps(2), |_| {}),
            arena.insert(Pan::default(), |_| {}),
            arena.insert(TapAndAHalf::default(), |_| {}),
            arena.insert(TapTapDrag::default(), |_| {}),
        ];
        for id in ids {
            arena.attach(id, 0).unwrap();
        }
        for batch in &batches {
            arena.deliver_touch_batch(0, batch);
            for id in ids {
                let rec = arena.get(id).unwrap();
                let tracking: Vec<TouchId> = rec.tracking_touches().collect();
                for ignored in rec.ignored_touches() {
                    prop_assert!(tracking.contains(ignored));
                }
                prop_assert!(rec.number_of_touches() <= tracking.len());
                prop_assert_eq!(rec.requested_state(), None);
            }
        }
    }
}
