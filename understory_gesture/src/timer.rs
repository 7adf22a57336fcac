// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred callbacks, ordered by due time and then by arming order.

use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};

use crate::types::RecognizerId;

/// What a timer does when it fires.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum TimerKind {
    /// Commit the recognizer's pending terminal state.
    PendingRecognition,
    /// Return the recognizer to `Possible` after a terminal commit.
    Reset,
    /// Call the variant's `timer_fired` with this token.
    Variant(u32),
}

/// A single armed timer.
///
/// `attempt` is the recognizer's reset counter when the timer was armed; a
/// timer whose attempt no longer matches is stale and does nothing.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Timer {
    pub(crate) due: f64,
    pub(crate) seq: u64,
    pub(crate) target: RecognizerId,
    pub(crate) attempt: u64,
    pub(crate) kind: TimerKind,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-queue of timers keyed by `(due, seq)`.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl TimerQueue {
    pub(crate) fn schedule(
        &mut self,
        due: f64,
        target: RecognizerId,
        attempt: u64,
        kind: TimerKind,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Timer {
            due,
            seq,
            target,
            attempt,
            kind,
        }));
    }

    /// Removes and returns the earliest timer if it is due at `now`.
    pub(crate) fn pop_due(&mut self, now: f64) -> Option<Timer> {
        if self.heap.peek()?.0.due > now {
            return None;
        }
        self.heap.pop().map(|Reverse(t)| t)
    }

    pub(crate) fn next_deadline(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(t)| t.due)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}
