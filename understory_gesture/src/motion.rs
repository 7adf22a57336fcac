// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation and velocity bookkeeping shared by the continuous gestures.

use alloc::collections::VecDeque;
use kurbo::{Point, Vec2};

/// Accumulated translation plus a velocity averaged over the last `window`
/// samples. All values are in scene coordinates.
#[derive(Clone, Debug)]
pub(crate) struct Motion {
    last_location: Point,
    last_time: f64,
    translation: Vec2,
    velocity: Vec2,
    samples: VecDeque<Vec2>,
    window: usize,
}

impl Motion {
    pub(crate) fn new(window: usize) -> Self {
        Self {
            last_location: Point::ORIGIN,
            last_time: 0.0,
            translation: Vec2::ZERO,
            velocity: Vec2::ZERO,
            samples: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Anchors subsequent samples at `location` without changing translation.
    pub(crate) fn anchor(&mut self, location: Point, time: f64) {
        self.last_location = location;
        self.last_time = time;
    }

    /// Re-anchors after the tracked centroid jumped, e.g. when a finger was
    /// added or lifted. The jump is not counted as movement.
    pub(crate) fn rebase(&mut self, location: Point) {
        self.last_location = location;
    }

    /// Records a sample. Returns `true` if the location changed.
    ///
    /// Samples with no elapsed time still move the translation but leave the
    /// velocity alone.
    pub(crate) fn track(&mut self, location: Point, time: f64) -> bool {
        let delta = location - self.last_location;
        self.last_location = location;
        if delta == Vec2::ZERO {
            return false;
        }
        self.translation += delta;
        let dt = time - self.last_time;
        if dt > 0.0 {
            if self.samples.len() == self.window {
                self.samples.pop_front();
            }
            self.samples.push_back(delta / dt);
            let sum = self.samples.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
            self.velocity = sum / self.samples.len() as f64;
            self.last_time = time;
        }
        true
    }

    pub(crate) fn translation(&self) -> Vec2 {
        self.translation
    }

    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Replaces the translation and zeroes the velocity.
    pub(crate) fn set_translation(&mut self, translation: Vec2) {
        self.translation = translation;
        self.velocity = Vec2::ZERO;
        self.samples.clear();
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.window);
    }
}
