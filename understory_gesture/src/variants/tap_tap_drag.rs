// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap, then press, hold and drag.

use kurbo::Vec2;

use crate::motion::Motion;
use crate::recognizer::{Gesture, GestureCx};
use crate::space::CoordinateSpace;
use crate::state::GestureState;
use crate::types::{Touch, TouchId};

/// Configuration for [`TapTapDrag`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TapTapDragConfig {
    /// Longest pause after the first tap, and how long the second press must
    /// be held before dragging starts, in seconds. Default 0.25.
    pub max_interval: f64,
    /// Number of recent movement samples averaged into the velocity. Default 4.
    pub velocity_samples: usize,
}

impl Default for TapTapDragConfig {
    fn default() -> Self {
        Self {
            max_interval: 0.25,
            velocity_samples: 4,
        }
    }
}

/// Recognizes a tap followed by a held second press that then drags.
///
/// Continuous: `Began` once the second press has been held for
/// [`TapTapDragConfig::max_interval`], `Changed` as the dragging finger moves,
/// `Ended` when it lifts. Only the dragging finger is followed; any other
/// finger is ignored.
#[derive(Clone, Debug)]
pub struct TapTapDrag {
    config: TapTapDragConfig,
    window: u32,
    drag: Option<TouchId>,
    motion: Motion,
}

impl Default for TapTapDrag {
    fn default() -> Self {
        Self::new(TapTapDragConfig::default())
    }
}

impl TapTapDrag {
    /// Creates a tap-tap-drag recognizer.
    pub fn new(config: TapTapDragConfig) -> Self {
        Self {
            config,
            window: 0,
            drag: None,
            motion: Motion::new(config.velocity_samples),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &TapTapDragConfig {
        &self.config
    }

    /// Mutable configuration.
    ///
    /// A new `velocity_samples` takes effect at the next reset.
    pub fn config_mut(&mut self) -> &mut TapTapDragConfig {
        &mut self.config
    }

    /// Drag distance since `Began`, in scene coordinates.
    pub fn translation(&self) -> Vec2 {
        self.motion.translation()
    }

    /// Smoothed drag velocity in scene units per second.
    pub fn velocity(&self) -> Vec2 {
        self.motion.velocity()
    }

    /// Replaces the translation, in scene coordinates, and zeroes the velocity.
    pub fn set_translation(&mut self, translation: Vec2) {
        self.motion.set_translation(translation);
    }

    /// [`translation`](Self::translation) in `node`'s coordinates.
    pub fn translation_in<K>(&self, space: &impl CoordinateSpace<K>, node: &K) -> Vec2 {
        space.vector_in(self.translation(), node)
    }

    /// [`velocity`](Self::velocity) in `node`'s coordinates.
    pub fn velocity_in<K>(&self, space: &impl CoordinateSpace<K>, node: &K) -> Vec2 {
        space.vector_in(self.velocity(), node)
    }

    /// [`set_translation`](Self::set_translation) with `translation` given in
    /// `node`'s coordinates.
    pub fn set_translation_in<K>(
        &mut self,
        translation: Vec2,
        space: &impl CoordinateSpace<K>,
        node: &K,
    ) {
        self.set_translation(space.vector_to_scene(translation, node));
    }

    fn dragged<'t>(&self, touches: &'t [Touch]) -> Option<&'t Touch> {
        let drag = self.drag?;
        touches.iter().find(|t| t.id == drag)
    }
}

impl Gesture for TapTapDrag {
    fn touches_began(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        if cx.state() != GestureState::Possible || self.drag.is_some() {
            for touch in touches {
                cx.ignore_touch(touch.id);
            }
            return;
        }
        let Some((first, extra)) = touches.split_first() else {
            return;
        };
        for touch in extra {
            cx.ignore_touch(touch.id);
        }
        self.window = self.window.wrapping_add(1);
        match first.tap_count {
            1 => {}
            2 => {
                self.drag = Some(first.id);
                cx.schedule_timer(self.config.max_interval, self.window);
            }
            _ => cx.request_state(GestureState::Failed),
        }
    }

    fn touches_moved(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        if !matches!(cx.state(), GestureState::Began | GestureState::Changed) {
            return;
        }
        if let Some(touch) = self.dragged(touches)
            && self.motion.track(touch.location, cx.now())
        {
            cx.request_state(GestureState::Changed);
        }
    }

    fn touches_ended(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        if let Some(touch) = self.dragged(touches) {
            match cx.state() {
                GestureState::Possible => cx.request_state(GestureState::Failed),
                GestureState::Began | GestureState::Changed => {
                    self.motion.track(touch.location, cx.now());
                    cx.request_state(GestureState::Ended);
                }
                _ => {}
            }
            return;
        }
        if cx.state() == GestureState::Possible && touches.iter().any(|t| t.tap_count == 1) {
            self.window = self.window.wrapping_add(1);
            cx.schedule_timer(self.config.max_interval, self.window);
        }
    }

    fn touches_cancelled(&mut self, cx: &mut GestureCx<'_>, _touches: &[Touch]) {
        match cx.state() {
            GestureState::Began | GestureState::Changed => cx.request_state(GestureState::Cancelled),
            GestureState::Possible => cx.request_state(GestureState::Failed),
            _ => {}
        }
    }

    fn timer_fired(&mut self, cx: &mut GestureCx<'_>, token: u32) {
        if token != self.window || cx.state() != GestureState::Possible {
            return;
        }
        let held = self.drag.and_then(|id| cx.touch(id)).map(|t| t.location);
        match held {
            Some(location) => {
                self.motion.anchor(location, cx.now());
                cx.request_state(GestureState::Began);
            }
            None => cx.request_state(GestureState::Failed),
        }
    }

    fn reset(&mut self) {
        self.drag = None;
        self.motion = Motion::new(self.config.velocity_samples);
    }
}
