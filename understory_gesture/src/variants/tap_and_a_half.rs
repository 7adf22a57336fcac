// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap, then press and hold.

use crate::recognizer::{Gesture, GestureCx};
use crate::state::GestureState;
use crate::types::Touch;

/// Configuration for [`TapAndAHalf`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TapAndAHalfConfig {
    /// Longest pause after the first tap, and how long the second press must
    /// be held, in seconds. Default 0.25.
    pub max_interval: f64,
}

impl Default for TapAndAHalfConfig {
    fn default() -> Self {
        Self { max_interval: 0.25 }
    }
}

/// Recognizes a tap followed by a second press held past the tap interval.
///
/// Discrete: reports `Recognized` while the second press is still down.
/// Lifting the second press early, or not pressing again in time, fails.
/// Only the first finger of each press counts; others are ignored.
#[derive(Clone, Debug, Default)]
pub struct TapAndAHalf {
    config: TapAndAHalfConfig,
    window: u32,
    holding: bool,
}

impl TapAndAHalf {
    /// Creates a tap-and-a-half recognizer.
    pub fn new(config: TapAndAHalfConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration.
    pub fn config(&self) -> &TapAndAHalfConfig {
        &self.config
    }

    /// Mutable configuration.
    pub fn config_mut(&mut self) -> &mut TapAndAHalfConfig {
        &mut self.config
    }
}

impl Gesture for TapAndAHalf {
    fn touches_began(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        let Some((first, extra)) = touches.split_first() else {
            return;
        };
        for touch in extra {
            cx.ignore_touch(touch.id);
        }
        self.window = self.window.wrapping_add(1);
        match first.tap_count {
            1 => self.holding = false,
            2 => {
                self.holding = true;
                cx.schedule_timer(self.config.max_interval, self.window);
            }
            _ => cx.request_state(GestureState::Failed),
        }
    }

    fn touches_ended(&mut self, cx: &mut GestureCx<'_>, _touches: &[Touch]) {
        if self.holding {
            cx.request_state(GestureState::Failed);
        } else {
            self.window = self.window.wrapping_add(1);
            cx.schedule_timer(self.config.max_interval, self.window);
        }
    }

    fn touches_cancelled(&mut self, cx: &mut GestureCx<'_>, _touches: &[Touch]) {
        cx.request_state(GestureState::Failed);
    }

    fn timer_fired(&mut self, cx: &mut GestureCx<'_>, token: u32) {
        if token != self.window || cx.state() != GestureState::Possible {
            return;
        }
        if self.holding {
            cx.request_state(GestureState::Recognized);
        } else {
            cx.request_state(GestureState::Failed);
        }
    }

    fn reset(&mut self) {
        self.holding = false;
    }
}
