// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attachment of recognizers to nodes, and touch batch dispatch.

use alloc::vec::Vec;
use tracing::trace;

use crate::arena::{GestureArena, live, live_mut};
use crate::error::GestureError;
use crate::recognizer::{GestureCx, Recognizer};
use crate::state::{GestureState, StateSet};
use crate::types::{RecognizerId, Touch, TouchBatch, TouchPhase};

/// The recognizers attached to one node, in attachment order, without
/// duplicates.
#[derive(Clone, Debug, Default)]
pub struct Coordinator {
    recognizers: Vec<RecognizerId>,
}

impl Coordinator {
    /// Attached recognizers in attachment order.
    pub fn recognizers(&self) -> &[RecognizerId] {
        &self.recognizers
    }

    /// Number of attached recognizers.
    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    pub(crate) fn add(&mut self, id: RecognizerId) -> bool {
        if self.recognizers.contains(&id) {
            return false;
        }
        self.recognizers.push(id);
        true
    }

    pub(crate) fn remove(&mut self, id: RecognizerId) -> bool {
        let before = self.recognizers.len();
        self.recognizers.retain(|r| *r != id);
        self.recognizers.len() != before
    }
}

impl<K: Copy + Ord, S> GestureArena<K, S> {
    /// Attaches `id` to `node`.
    ///
    /// A recognizer lives on at most one node. Attaching it elsewhere detaches
    /// it first, and every change of node resets it. Attaching it to the node
    /// it is already on does nothing.
    pub fn attach(&mut self, id: RecognizerId, node: K) -> Result<(), GestureError> {
        let current = live(&self.slots, id)
            .ok_or(GestureError::StaleRecognizer(id))?
            .node;
        match current {
            Some(current) if current == node => return Ok(()),
            Some(_) => self.detach(id)?,
            None => self.reset(id),
        }
        if let Some(rec) = live_mut(&mut self.slots, id) {
            rec.node = Some(node);
        }
        self.coordinators.entry(node).or_default().add(id);
        Ok(())
    }

    /// Detaches `id` from its node and resets it.
    pub fn detach(&mut self, id: RecognizerId) -> Result<(), GestureError> {
        let rec = live_mut(&mut self.slots, id).ok_or(GestureError::StaleRecognizer(id))?;
        let node = rec.node.take().ok_or(GestureError::NotAttached(id))?;
        if let Some(coordinator) = self.coordinators.get_mut(&node) {
            coordinator.remove(id);
            if coordinator.is_empty() {
                self.coordinators.remove(&node);
            }
        }
        self.reset(id);
        Ok(())
    }

    /// The recognizers attached to `node`, if any.
    pub fn coordinator(&self, node: &K) -> Option<&Coordinator> {
        self.coordinators.get(node)
    }

    /// Delivers a batch of touches that hit `node`.
    ///
    /// Timers due by the batch timestamp fire first. Then every recognizer
    /// attached to `node`, in attachment order, starts tracking the touches
    /// that began, handles the batch, and stops tracking the touches that
    /// finished. Finally each of them is advanced once, in the same order.
    pub fn deliver_touch_batch(&mut self, node: K, batch: &TouchBatch) {
        self.advance_time(batch.timestamp());
        let Some(coordinator) = self.coordinators.get(&node) else {
            trace!(touches = batch.len(), "batch for a node without recognizers");
            return;
        };
        let ids = coordinator.recognizers.clone();
        for &id in &ids {
            // A recognizer that settled in this same tick has not reset yet.
            if self.state(id).is_some_and(GestureState::is_terminal) {
                self.reset(id);
            }
        }
        for &id in &ids {
            self.begin_tracking(id, batch);
            self.continue_tracking(id, batch);
            self.end_tracking(id, batch);
        }
        for &id in &ids {
            self.advance(id);
        }
    }

    /// Advances every recognizer attached to `node`, in attachment order.
    pub fn advance_node(&mut self, node: &K) {
        let Some(coordinator) = self.coordinators.get(node) else {
            return;
        };
        for id in coordinator.recognizers.clone() {
            self.advance(id);
        }
    }

    fn begin_tracking(&mut self, id: RecognizerId, batch: &TouchBatch) {
        let Some(rec) = live(&self.slots, id) else {
            return;
        };
        if !rec.core.enabled {
            return;
        }
        let accepted: Vec<Touch> = batch
            .in_phase(TouchPhase::Began)
            .filter(|t| !rec.core.is_tracking(t.id))
            .filter(|t| {
                rec.delegate
                    .as_ref()
                    .is_none_or(|d| d.should_receive_touch(rec, t))
            })
            .copied()
            .collect();
        if accepted.is_empty() {
            return;
        }
        if let Some(rec) = live_mut(&mut self.slots, id) {
            for touch in accepted {
                rec.core.track(touch);
            }
        }
    }

    fn continue_tracking(&mut self, id: RecognizerId, batch: &TouchBatch) {
        let Some(rec) = live_mut(&mut self.slots, id) else {
            return;
        };
        rec.core.refresh(batch);
        if !rec.core.state.is_in(StateSet::ACTIVE) {
            return;
        }
        let [began, moved, ended, cancelled] = rec.core.partition(batch);
        let Recognizer { core, gesture, .. } = rec;
        let mut cx = GestureCx::new(id, core, &mut self.timers, batch.timestamp());
        if !began.is_empty() {
            gesture.touches_began(&mut cx, &began);
        }
        if !moved.is_empty() {
            gesture.touches_moved(&mut cx, &moved);
        }
        if !ended.is_empty() {
            gesture.touches_ended(&mut cx, &ended);
        }
        if !cancelled.is_empty() {
            gesture.touches_cancelled(&mut cx, &cancelled);
        }
    }

    fn end_tracking(&mut self, id: RecognizerId, batch: &TouchBatch) {
        if let Some(rec) = live_mut(&mut self.slots, id) {
            rec.core.end_tracking(batch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{Gesture, GestureDelegate};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::Point;

    use crate::types::TouchId;

    /// Records which handlers ran and requests `Failed` when a touch is cancelled.
    #[derive(Debug, Default)]
    struct Probe {
        calls: Rc<RefCell<Vec<(&'static str, usize)>>>,
    }

    impl Gesture for Probe {
        fn touches_began(&mut self, _cx: &mut GestureCx<'_>, touches: &[Touch]) {
            self.calls.borrow_mut().push(("began", touches.len()));
        }
        fn touches_moved(&mut self, _cx: &mut GestureCx<'_>, touches: &[Touch]) {
            self.calls.borrow_mut().push(("moved", touches.len()));
        }
        fn touches_ended(&mut self, _cx: &mut GestureCx<'_>, touches: &[Touch]) {
            self.calls.borrow_mut().push(("ended", touches.len()));
        }
        fn touches_cancelled(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
            self.calls.borrow_mut().push(("cancelled", touches.len()));
            cx.request_state(GestureState::Failed);
        }
    }

    fn touch(id: u64, phase: TouchPhase, t: f64) -> Touch {
        Touch::new(TouchId(id), phase, Point::new(0.0, 0.0), t)
    }

    #[test]
    fn attach_is_idempotent_and_moves_between_nodes() {
        let mut arena = GestureArena::<u32>::new();
        let id = arena.insert(Probe::default(), |_| {});
        arena.attach(id, 1).unwrap();
        arena.attach(id, 1).unwrap();
        assert_eq!(arena.coordinator(&1).map(Coordinator::len), Some(1));

        arena.attach(id, 2).unwrap();
        assert!(arena.coordinator(&1).is_none());
        assert_eq!(arena.coordinator(&2).map(Coordinator::recognizers), Some(&[id][..]));
        assert_eq!(arena.get(id).and_then(Recognizer::node), Some(&2));

        arena.detach(id).unwrap();
        assert_eq!(arena.detach(id), Err(GestureError::NotAttached(id)));
        arena.remove(id);
        assert_eq!(arena.attach(id, 1), Err(GestureError::StaleRecognizer(id)));
    }

    #[test]
    fn dispatch_partitions_by_phase_and_ends_tracking() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut arena = GestureArena::<u32>::new();
        let id = arena.insert(Probe { calls: calls.clone() }, |_| {});
        arena.attach(id, 7).unwrap();

        arena.deliver_touch_batch(
            7,
            &TouchBatch::new(vec![touch(1, TouchPhase::Began, 0.0), touch(2, TouchPhase::Began, 0.0)]),
        );
        assert_eq!(arena.number_of_touches(id), Some(2));

        arena.deliver_touch_batch(
            7,
            &TouchBatch::new(vec![
                touch(1, TouchPhase::Moved, 0.1),
                touch(2, TouchPhase::Stationary, 0.1),
            ]),
        );
        arena.deliver_touch_batch(
            7,
            &TouchBatch::new(vec![touch(1, TouchPhase::Ended, 0.2), touch(2, TouchPhase::Moved, 0.2)]),
        );
        assert_eq!(arena.number_of_touches(id), Some(1));
        assert_eq!(
            *calls.borrow(),
            vec![("began", 2), ("moved", 1), ("moved", 1), ("ended", 1)]
        );
    }

    #[test]
    fn batches_for_other_nodes_are_ignored() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut arena = GestureArena::<u32>::new();
        let id = arena.insert(Probe { calls: calls.clone() }, |_| {});
        arena.attach(id, 7).unwrap();
        arena.deliver_touch_batch(8, &TouchBatch::new(vec![touch(1, TouchPhase::Began, 0.0)]));
        assert!(calls.borrow().is_empty());
        assert_eq!(arena.number_of_touches(id), Some(0));
    }

    #[test]
    fn terminal_recognizer_resets_before_next_batch() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut arena = GestureArena::<u32>::new();
        let id = arena.insert(Probe { calls: calls.clone() }, |_| {});
        arena.attach(id, 7).unwrap();
        arena.deliver_touch_batch(7, &TouchBatch::new(vec![touch(1, TouchPhase::Began, 0.0)]));
        arena.deliver_touch_batch(7, &TouchBatch::new(vec![touch(1, TouchPhase::Cancelled, 0.1)]));
        assert_eq!(arena.state(id), Some(GestureState::Failed));

        arena.deliver_touch_batch(7, &TouchBatch::new(vec![touch(2, TouchPhase::Began, 0.1)]));
        let rec = arena.get(id).unwrap();
        assert_eq!(rec.state(), GestureState::Possible);
        assert_eq!(rec.tracking_touches().collect::<Vec<_>>(), vec![TouchId(2)]);
    }

    struct OnlyEven;

    impl GestureDelegate<u32> for OnlyEven {
        fn should_receive_touch(&self, _recognizer: &Recognizer<u32>, touch: &Touch) -> bool {
            touch.id.0 % 2 == 0
        }
    }

    #[test]
    fn delegate_filters_and_disabled_tracks_nothing() {
        let mut arena = GestureArena::<u32>::new();
        let id = arena.insert(Probe::default(), |_| {});
        arena.attach(id, 1).unwrap();
        arena.set_delegate(id, Some(Rc::new(OnlyEven))).unwrap();
        arena.deliver_touch_batch(
            1,
            &TouchBatch::new(vec![touch(1, TouchPhase::Began, 0.0), touch(2, TouchPhase::Began, 0.0)]),
        );
        let tracked: Vec<_> = arena.get(id).unwrap().tracking_touches().collect();
        assert_eq!(tracked, vec![TouchId(2)]);

        arena.set_enabled(id, false).unwrap();
        arena.deliver_touch_batch(1, &TouchBatch::new(vec![touch(4, TouchPhase::Began, 0.1)]));
        assert_eq!(arena.number_of_touches(id), Some(0));
    }
}
