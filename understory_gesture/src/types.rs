// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public input types: touches, touch batches, and recognizer handles.

use alloc::vec::Vec;
use kurbo::Point;

/// Identifier of a single contact, as assigned by the host touch layer.
///
/// The same id is reported for every sample of a contact, from `Began` until
/// `Ended` or `Cancelled`. Hosts may reuse ids after a contact has finished.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TouchId(pub u64);

/// Phase of a touch sample within a batch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TouchPhase {
    /// The contact went down in this batch.
    Began,
    /// The contact moved since the previous batch.
    Moved,
    /// The contact is down and did not move.
    Stationary,
    /// The contact lifted.
    Ended,
    /// The host cancelled the contact (for example, a system gesture took over).
    Cancelled,
}

impl TouchPhase {
    /// Returns `true` for `Ended` and `Cancelled`, the phases after which a
    /// contact is no longer tracked.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// One sample of one contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touch {
    /// Contact identifier.
    pub id: TouchId,
    /// Phase of this sample.
    pub phase: TouchPhase,
    /// Location in scene coordinates.
    pub location: Point,
    /// Number of quick successive taps at roughly this location, counted by
    /// the host (1 for a first tap, 2 for the second tap of a double tap, ...).
    pub tap_count: u32,
    /// Sample time in seconds on the host clock.
    pub timestamp: f64,
}

impl Touch {
    /// Creates a sample with a tap count of 1.
    pub const fn new(id: TouchId, phase: TouchPhase, location: Point, timestamp: f64) -> Self {
        Self {
            id,
            phase,
            location,
            tap_count: 1,
            timestamp,
        }
    }

    /// Returns this sample with `tap_count` replaced.
    #[must_use]
    pub const fn with_tap_count(mut self, tap_count: u32) -> Self {
        self.tap_count = tap_count;
        self
    }
}

/// An immutable snapshot of the touches delivered to a node at one instant.
///
/// The batch timestamp drives the arena clock: timers that are due at or
/// before it fire before the batch is dispatched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchBatch {
    timestamp: f64,
    touches: Vec<Touch>,
}

impl TouchBatch {
    /// Creates a batch timestamped with the latest sample it contains.
    ///
    /// An empty batch has timestamp `0.0`; use [`TouchBatch::at`] to set it.
    pub fn new(touches: Vec<Touch>) -> Self {
        let timestamp = touches
            .iter()
            .map(|t| t.timestamp)
            .fold(0.0_f64, f64::max);
        Self { timestamp, touches }
    }

    /// Creates a batch with an explicit timestamp.
    pub fn at(timestamp: f64, touches: Vec<Touch>) -> Self {
        Self { timestamp, touches }
    }

    /// Delivery time in seconds on the host clock.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// All samples in delivery order.
    pub fn touches(&self) -> &[Touch] {
        &self.touches
    }

    /// The sample for `id`, if the batch contains one.
    pub fn get(&self, id: TouchId) -> Option<&Touch> {
        self.touches.iter().find(|t| t.id == id)
    }

    /// Samples in the given phase.
    pub fn in_phase(&self, phase: TouchPhase) -> impl Iterator<Item = &Touch> + '_ {
        self.touches.iter().filter(move |t| t.phase == phase)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.touches.len()
    }

    /// Returns `true` if the batch has no samples.
    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }
}

/// Identifier for a recognizer in a [`GestureArena`](crate::GestureArena).
///
/// Like the box tree's node handles, this is a slot index plus a generation
/// counter. Removing a recognizer frees its slot; reusing the slot bumps the
/// generation, so a stale `RecognizerId` never aliases a different live
/// recognizer. Use [`GestureArena::is_alive`](crate::GestureArena::is_alive)
/// to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RecognizerId(pub(crate) u32, pub(crate) u32);

impl RecognizerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn touch(id: u64, phase: TouchPhase, t: f64) -> Touch {
        Touch::new(TouchId(id), phase, Point::new(id as f64, 0.0), t)
    }

    #[test]
    fn batch_timestamp_is_latest_sample() {
        let batch = TouchBatch::new(vec![
            touch(1, TouchPhase::Moved, 0.5),
            touch(2, TouchPhase::Began, 0.75),
        ]);
        assert_eq!(batch.timestamp(), 0.75);
        assert_eq!(TouchBatch::new(Vec::new()).timestamp(), 0.0);
        assert_eq!(TouchBatch::at(3.0, Vec::new()).timestamp(), 3.0);
    }

    #[test]
    fn batch_lookup_and_phase_filter() {
        let batch = TouchBatch::new(vec![
            touch(1, TouchPhase::Moved, 0.0),
            touch(2, TouchPhase::Ended, 0.0),
            touch(3, TouchPhase::Moved, 0.0),
        ]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(TouchId(2)).map(|t| t.phase), Some(TouchPhase::Ended));
        assert!(batch.get(TouchId(9)).is_none());
        let moved: Vec<_> = batch.in_phase(TouchPhase::Moved).map(|t| t.id).collect();
        assert_eq!(moved, vec![TouchId(1), TouchId(3)]);
    }

    #[test]
    fn finished_phases() {
        assert!(TouchPhase::Ended.is_finished());
        assert!(TouchPhase::Cancelled.is_finished());
        assert!(!TouchPhase::Stationary.is_finished());
        assert_eq!(touch(1, TouchPhase::Began, 0.0).with_tap_count(3).tap_count, 3);
    }
}
