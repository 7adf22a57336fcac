// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Discrete taps: single, double, multi-finger.

use crate::recognizer::{Gesture, GestureCx};
use crate::state::GestureState;
use crate::types::Touch;

/// Configuration for [`Tap`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TapConfig {
    /// Taps in the sequence: 1 for a single tap, 2 for a double tap. Default 1.
    pub taps_required: u32,
    /// Fingers per tap. Default 1.
    pub touches_required: usize,
    /// Longest pause between taps, in seconds. A completed tap is reported
    /// after this delay, so a longer sequence can still claim it.
    /// Default 0.25.
    pub max_interval: f64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            taps_required: 1,
            touches_required: 1,
            max_interval: 0.25,
        }
    }
}

/// Recognizes a sequence of taps.
///
/// The tap count of each touch comes from the host. A touch down with more
/// taps than required fails the recognizer; lifting the required number of
/// fingers with the required tap count stages `Recognized` for
/// [`TapConfig::max_interval`]. A sequence that stalls for longer than that
/// between taps fails.
#[derive(Clone, Debug, Default)]
pub struct Tap {
    config: TapConfig,
    /// Identifies the current wait between taps; stale timers carry older values.
    window: u32,
}

impl Tap {
    /// Creates a tap recognizer.
    pub fn new(config: TapConfig) -> Self {
        Self { config, window: 0 }
    }

    /// Creates a one-finger recognizer for `taps` taps.
    pub fn with_taps(taps: u32) -> Self {
        Self::new(TapConfig {
            taps_required: taps,
            ..TapConfig::default()
        })
    }

    /// Configuration.
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Mutable configuration. Changes apply to the next touch.
    pub fn config_mut(&mut self) -> &mut TapConfig {
        &mut self.config
    }

    fn fail_and_ignore(cx: &mut GestureCx<'_>, touches: &[Touch]) {
        cx.request_state(GestureState::Failed);
        for touch in touches {
            cx.ignore_touch(touch.id);
        }
    }
}

impl Gesture for Tap {
    fn touches_began(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        self.window = self.window.wrapping_add(1);
        if touches.len() != self.config.touches_required {
            Self::fail_and_ignore(cx, touches);
            return;
        }
        if touches.iter().any(|t| t.tap_count > self.config.taps_required) {
            cx.update_pending_recognition(GestureState::Failed);
        }
    }

    fn touches_ended(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        if touches.len() != self.config.touches_required {
            Self::fail_and_ignore(cx, touches);
            return;
        }
        let taps = self.config.taps_required;
        if touches.iter().all(|t| t.tap_count == taps) {
            cx.schedule_pending_recognition(GestureState::Recognized, self.config.max_interval);
        } else if touches.iter().all(|t| t.tap_count < taps) {
            self.window = self.window.wrapping_add(1);
            cx.schedule_timer(self.config.max_interval, self.window);
        }
    }

    fn touches_cancelled(&mut self, cx: &mut GestureCx<'_>, _touches: &[Touch]) {
        cx.update_pending_recognition(GestureState::Failed);
    }

    fn timer_fired(&mut self, cx: &mut GestureCx<'_>, token: u32) {
        if token == self.window && cx.pending_terminal_state().is_none() {
            cx.request_state(GestureState::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GestureArena;
    use crate::types::{TouchBatch, TouchId, TouchPhase};
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use kurbo::Point;

    fn tap(id: u64, phase: TouchPhase, t: f64, taps: u32) -> TouchBatch {
        TouchBatch::new(vec![
            Touch::new(TouchId(id), phase, Point::new(10.0, 10.0), t).with_tap_count(taps),
        ])
    }

    fn setup(gesture: Tap) -> (GestureArena<u32>, crate::RecognizerId, Rc<Cell<u32>>) {
        let mut arena = GestureArena::new();
        let fired = Rc::new(Cell::new(0));
        let sink = fired.clone();
        let id = arena.insert(gesture, move |_| sink.set(sink.get() + 1));
        arena.attach(id, 0).unwrap();
        (arena, id, fired)
    }

    #[test]
    fn single_tap_is_reported_after_the_interval() {
        let (mut arena, id, fired) = setup(Tap::default());
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Began, 0.0, 1));
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Ended, 0.125, 1));
        assert_eq!(
            arena.get(id).unwrap().pending_terminal_state(),
            Some(GestureState::Recognized)
        );
        arena.advance_time(0.25);
        assert_eq!(fired.get(), 0);
        arena.advance_time(0.375);
        assert_eq!(fired.get(), 1);
        assert_eq!(arena.state(id), Some(GestureState::Recognized));
    }

    #[test]
    fn wrong_finger_count_fails_and_ignores() {
        let (mut arena, id, fired) = setup(Tap::default());
        let batch = TouchBatch::new(vec![
            Touch::new(TouchId(1), TouchPhase::Began, Point::ZERO, 0.0),
            Touch::new(TouchId(2), TouchPhase::Began, Point::ZERO, 0.0),
        ]);
        arena.deliver_touch_batch(0, &batch);
        assert_eq!(arena.state(id), Some(GestureState::Failed));
        let rec = arena.get(id).unwrap();
        assert_eq!(rec.ignored_touches(), &[TouchId(1), TouchId(2)]);
        assert_eq!(
            rec.tracking_touches().collect::<Vec<_>>(),
            vec![TouchId(1), TouchId(2)]
        );
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn extra_tap_turns_staged_recognition_into_failure() {
        let (mut arena, id, fired) = setup(Tap::default());
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Began, 0.0, 1));
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Ended, 0.125, 1));
        arena.deliver_touch_batch(0, &tap(2, TouchPhase::Began, 0.25, 2));
        assert_eq!(
            arena.get(id).unwrap().pending_terminal_state(),
            Some(GestureState::Failed)
        );
        arena.advance_time(0.375);
        assert_eq!(arena.state(id), Some(GestureState::Failed));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn stalled_double_tap_fails_when_window_closes() {
        let (mut arena, id, _fired) = setup(Tap::with_taps(2));
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Began, 0.0, 1));
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Ended, 0.125, 1));
        arena.advance_time(0.25);
        assert_eq!(arena.state(id), Some(GestureState::Possible));
        arena.advance_time(0.375);
        assert_eq!(arena.state(id), Some(GestureState::Failed));
    }

    #[test]
    fn double_tap_in_time_recognizes() {
        let (mut arena, id, fired) = setup(Tap::with_taps(2));
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Began, 0.0, 1));
        arena.deliver_touch_batch(0, &tap(1, TouchPhase::Ended, 0.125, 1));
        arena.deliver_touch_batch(0, &tap(2, TouchPhase::Began, 0.25, 2));
        arena.deliver_touch_batch(0, &tap(2, TouchPhase::Ended, 0.3125, 2));
        // The first window closed at 0.375, but a newer tap began before it.
        arena.advance_time(0.5);
        assert_eq!(arena.state(id), Some(GestureState::Possible));
        arena.advance_time(0.5625);
        assert_eq!(arena.state(id), Some(GestureState::Recognized));
        assert_eq!(fired.get(), 1);
    }
}
