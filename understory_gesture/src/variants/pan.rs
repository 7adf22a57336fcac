// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous panning with one or more fingers.

use kurbo::{Point, Vec2};

use crate::motion::Motion;
use crate::recognizer::{Gesture, GestureCx};
use crate::space::CoordinateSpace;
use crate::state::GestureState;
use crate::types::Touch;

/// Configuration for [`Pan`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanConfig {
    /// Fingers needed before the pan may begin. Default 1.
    pub min_touches: usize,
    /// More fingers than this before the pan begins fails it; extra fingers
    /// after it began are ignored. Default `usize::MAX`.
    pub max_touches: usize,
    /// Distance the centroid must travel before the pan begins. Default 5.
    pub min_distance: f64,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            min_touches: 1,
            max_touches: usize::MAX,
            min_distance: 5.0,
        }
    }
}

/// Recognizes a drag of the touch centroid.
///
/// `Began` once the centroid has moved [`PanConfig::min_distance`] from where
/// the touches went down, `Changed` on every later movement, `Ended` when the
/// last finger lifts and `Cancelled` if the host cancels a touch. Fingers
/// landing or lifting mid-pan shift the centroid without counting as movement.
#[derive(Clone, Debug)]
pub struct Pan {
    config: PanConfig,
    motion: Motion,
}

impl Default for Pan {
    fn default() -> Self {
        Self::new(PanConfig::default())
    }
}

impl Pan {
    /// Creates a pan recognizer.
    pub fn new(config: PanConfig) -> Self {
        Self {
            config,
            motion: Motion::new(1),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &PanConfig {
        &self.config
    }

    /// Mutable configuration.
    pub fn config_mut(&mut self) -> &mut PanConfig {
        &mut self.config
    }

    /// Centroid travel since the touches went down, in scene coordinates.
    pub fn translation(&self) -> Vec2 {
        self.motion.translation()
    }

    /// Velocity of the last movement in scene units per second.
    pub fn velocity(&self) -> Vec2 {
        self.motion.velocity()
    }

    /// Replaces the translation, in scene coordinates, and zeroes the velocity.
    ///
    /// Handlers that apply the translation incrementally set it back to zero
    /// after each update.
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
}

/// Centroid of the delivered touches that are not in `leaving`.
fn centroid_without(cx: &GestureCx<'_>, leaving: &[Touch]) -> Option<Point> {
    let mut count = 0_u32;
    let mut sum = Vec2::ZERO;
    for touch in cx.touches() {
        if leaving.iter().all(|l| l.id != touch.id) {
            count += 1;
            sum += touch.location.to_vec2();
        }
    }
    (count > 0).then(|| (sum / f64::from(count)).to_point())
}

impl Gesture for Pan {
    fn touches_began(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        let count = cx.number_of_touches();
        let possible = cx.state() == GestureState::Possible;
        if count > self.config.max_touches {
            if possible {
                cx.request_state(GestureState::Failed);
            } else {
                for touch in touches {
                    cx.ignore_touch(touch.id);
                }
            }
            return;
        }
        let Some(location) = cx.location() else {
            return;
        };
        if possible && count == touches.len() {
            self.motion.anchor(location, cx.now());
        } else {
            self.motion.rebase(location);
        }
    }

    fn touches_moved(&mut self, cx: &mut GestureCx<'_>, _touches: &[Touch]) {
        let Some(location) = cx.location() else {
            return;
        };
        let moved = self.motion.track(location, cx.now());
        match cx.state() {
            GestureState::Possible => {
                let far = self.motion.translation().hypot2()
                    >= self.config.min_distance * self.config.min_distance;
                if far && cx.number_of_touches() >= self.config.min_touches {
                    cx.request_state(GestureState::Began);
                }
            }
            GestureState::Began | GestureState::Changed if moved => {
                cx.request_state(GestureState::Changed);
            }
            _ => {}
        }
    }

    fn touches_ended(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        if let Some(location) = cx.location() {
            self.motion.track(location, cx.now());
        }
        let remaining = cx.number_of_touches().saturating_sub(touches.len());
        if remaining > 0 && remaining >= self.config.min_touches {
            if let Some(location) = centroid_without(cx, touches) {
                self.motion.rebase(location);
            }
            return;
        }
        match cx.state() {
            GestureState::Began | GestureState::Changed => cx.request_state(GestureState::Ended),
            GestureState::Possible if remaining == 0 => cx.request_state(GestureState::Failed),
            _ => {}
        }
    }

    fn touches_cancelled(&mut self, cx: &mut GestureCx<'_>, _touches: &[Touch]) {
        match cx.state() {
            GestureState::Began | GestureState::Changed => cx.request_state(GestureState::Cancelled),
            GestureState::Possible => cx.request_state(GestureState::Failed),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.motion.reset();
    }
}
