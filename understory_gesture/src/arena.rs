// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gesture arena: recognizer storage, the state machine driver, and the
//! host clock.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::mem;
use kurbo::{Point, Vec2};
use tracing::{debug, trace, warn};

use crate::coordinator::Coordinator;
use crate::error::GestureError;
use crate::recognizer::{Gesture, GestureCx, GestureDelegate, Recognizer};
use crate::resolver::Resolution;
use crate::space::{CoordinateSpace, SceneSpace};
use crate::state::{GestureState, StateSet, Transition};
use crate::timer::{Timer, TimerKind, TimerQueue};
use crate::types::RecognizerId;

pub(crate) fn live<K>(slots: &[Option<Recognizer<K>>], id: RecognizerId) -> Option<&Recognizer<K>> {
    slots.get(id.idx())?.as_ref().filter(|r| r.id == id)
}

pub(crate) fn live_mut<K>(
    slots: &mut [Option<Recognizer<K>>],
    id: RecognizerId,
) -> Option<&mut Recognizer<K>> {
    slots.get_mut(id.idx())?.as_mut().filter(|r| r.id == id)
}

/// Owns recognizers, their attachments to nodes, and the timers that drive
/// their deferred decisions.
///
/// `K` is the host's node key (for example a box tree node id). `S` maps
/// scene coordinates into node coordinates for the location queries.
pub struct GestureArena<K, S = SceneSpace> {
    pub(crate) slots: Vec<Option<Recognizer<K>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    pub(crate) coordinators: BTreeMap<K, Coordinator>,
    pub(crate) timers: TimerQueue,
    pub(crate) now: f64,
    space: S,
}

impl<K, S: fmt::Debug> fmt::Debug for GestureArena<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|r| r.is_some()).count();
        f.debug_struct("GestureArena")
            .field("recognizers_total", &total)
            .field("recognizers_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("nodes", &self.coordinators.len())
            .field("timers", &self.timers.len())
            .field("now", &self.now)
            .field("space", &self.space)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Ord, S: Default> Default for GestureArena<K, S> {
    fn default() -> Self {
        Self::with_space(S::default())
    }
}

impl<K: Copy + Ord> GestureArena<K> {
    /// Creates an arena whose nodes all use scene coordinates.
    pub fn new() -> Self {
        Self::with_space(SceneSpace)
    }
}

impl<K: Copy + Ord, S> GestureArena<K, S> {
    /// Creates an arena using `space` for coordinate conversions.
    pub fn with_space(space: S) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            coordinators: BTreeMap::new(),
            timers: TimerQueue::default(),
            now: 0.0,
            space,
        }
    }

    /// The coordinate space.
    pub fn space(&self) -> &S {
        &self.space
    }

    /// Mutable access to the coordinate space, e.g. to update node transforms.
    pub fn space_mut(&mut self) -> &mut S {
        &mut self.space
    }

    /// Adds a recognizer running `gesture`, enabled and unattached.
    ///
    /// `action` runs whenever the recognizer commits a notifying transition.
    pub fn insert<G: Gesture>(
        &mut self,
        gesture: G,
        action: impl FnMut(&Recognizer<K>) + 'static,
    ) -> RecognizerId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.slots.push(None);
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "RecognizerId uses 32-bit indices by design."
        )]
        let id = RecognizerId::new(idx as u32, generation);
        self.slots[idx] = Some(Recognizer::new(id, Box::new(gesture), Box::new(action)));
        id
    }

    /// Removes a recognizer.
    ///
    /// It is detached first, recognizers waiting on it are released as if it
    /// had failed, and every must-fail edge to or from it is dropped.
    pub fn remove(&mut self, id: RecognizerId) {
        if !self.is_alive(id) {
            return;
        }
        // Detaching resets; a recognizer that was never attached resets here.
        if self.detach(id).is_err() {
            self.reset(id);
        }
        for rec in self.slots.iter_mut().flatten() {
            rec.core.required_to_fail.retain(|o| *o != id);
            rec.core.failure_dependents.retain(|d| *d != id);
        }
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns true if `id` refers to a live recognizer.
    ///
    /// See [`RecognizerId`] for the generational semantics.
    pub fn is_alive(&self, id: RecognizerId) -> bool {
        live(&self.slots, id).is_some()
    }

    /// Number of live recognizers.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|r| r.is_some()).count()
    }

    /// Returns `true` if the arena holds no recognizers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The recognizer for `id`, if live.
    pub fn get(&self, id: RecognizerId) -> Option<&Recognizer<K>> {
        live(&self.slots, id)
    }

    /// Committed state of `id`, if live.
    pub fn state(&self, id: RecognizerId) -> Option<GestureState> {
        self.get(id).map(Recognizer::state)
    }

    /// Number of tracked, non-ignored touches of `id`.
    pub fn number_of_touches(&self, id: RecognizerId) -> Option<usize> {
        self.get(id).map(Recognizer::number_of_touches)
    }

    /// The gesture of `id`, if live and of type `T`.
    pub fn gesture<T: Gesture>(&self, id: RecognizerId) -> Option<&T> {
        self.get(id)?.gesture_as()
    }

    /// Mutable access to the gesture of `id`, if live and of type `T`.
    ///
    /// Use this for configuration and for resetting a continuous gesture's
    /// translation.
    pub fn gesture_mut<T: Gesture>(&mut self, id: RecognizerId) -> Option<&mut T> {
        let rec = live_mut(&mut self.slots, id)?;
        let any: &mut dyn Any = &mut *rec.gesture;
        any.downcast_mut()
    }

    fn rec_mut(&mut self, id: RecognizerId) -> Result<&mut Recognizer<K>, GestureError> {
        live_mut(&mut self.slots, id).ok_or(GestureError::StaleRecognizer(id))
    }

    /// Sets the diagnostic name used in log output.
    pub fn set_name(&mut self, id: RecognizerId, name: impl Into<String>) -> Result<(), GestureError> {
        self.rec_mut(id)?.core.name = name.into();
        Ok(())
    }

    /// Replaces the action.
    pub fn set_action(
        &mut self,
        id: RecognizerId,
        action: impl FnMut(&Recognizer<K>) + 'static,
    ) -> Result<(), GestureError> {
        self.rec_mut(id)?.action = Some(Box::new(action));
        Ok(())
    }

    /// Sets or clears the delegate.
    pub fn set_delegate(
        &mut self,
        id: RecognizerId,
        delegate: Option<Rc<dyn GestureDelegate<K>>>,
    ) -> Result<(), GestureError> {
        self.rec_mut(id)?.delegate = delegate;
        Ok(())
    }

    /// Enables or disables a recognizer.
    ///
    /// A disabled recognizer tracks no new touches. Disabling one that is
    /// `Began` or `Changed` commits `Cancelled`; disabling one that is
    /// `Possible` resets it.
    pub fn set_enabled(&mut self, id: RecognizerId, enabled: bool) -> Result<(), GestureError> {
        let rec = self.rec_mut(id)?;
        rec.core.enabled = enabled;
        if enabled {
            return Ok(());
        }
        let state = rec.core.state;
        match state {
            GestureState::Began | GestureState::Changed => {
                rec.core.pending_next = Some(GestureState::Cancelled);
                self.advance(id);
            }
            GestureState::Possible => self.reset(id),
            _ => {}
        }
        Ok(())
    }

    /// Current arena time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Due time of the earliest armed timer.
    ///
    /// Hosts that sleep between events should wake at this time and call
    /// [`advance_time`](Self::advance_time).
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    /// Moves the clock to `now` (it never goes backwards) and fires every
    /// timer that was due by then, in due-time order.
    ///
    /// Timers armed while these fire wait for the next call, so resets that
    /// follow a terminal commit happen on the next tick.
    pub fn advance_time(&mut self, now: f64) {
        if now > self.now {
            self.now = now;
        }
        let mut due = Vec::new();
        while let Some(timer) = self.timers.pop_due(self.now) {
            due.push(timer);
        }
        for timer in due {
            self.fire(timer);
        }
    }

    fn fire(&mut self, timer: Timer) {
        let Timer {
            target,
            attempt,
            kind,
            ..
        } = timer;
        let current = live(&self.slots, target).map(|r| r.core.attempt);
        if current != Some(attempt) {
            trace!(recognizer = ?target, ?kind, "stale timer");
            return;
        }
        match kind {
            TimerKind::PendingRecognition => self.fire_pending_recognition(target),
            TimerKind::Reset => self.reset(target),
            TimerKind::Variant(token) => self.fire_gesture_timer(target, token),
        }
    }

    fn fire_gesture_timer(&mut self, id: RecognizerId, token: u32) {
        let now = self.now;
        let Some(rec) = live_mut(&mut self.slots, id) else {
            return;
        };
        if !rec.core.state.is_in(StateSet::ACTIVE) {
            trace!(recognizer = ?id, token, "gesture timer after leaving active states");
            return;
        }
        let Recognizer { core, gesture, .. } = rec;
        let mut cx = GestureCx::new(id, core, &mut self.timers, now);
        gesture.timer_fired(&mut cx, token);
        self.advance(id);
    }

    fn with_cx(&mut self, id: RecognizerId, f: impl FnOnce(&mut GestureCx<'_>)) {
        let now = self.now;
        if let Some(rec) = live_mut(&mut self.slots, id) {
            f(&mut GestureCx::new(id, &mut rec.core, &mut self.timers, now));
        }
    }

    /// Requests `state` for `id` without committing it. See
    /// [`GestureCx::request_state`].
    pub fn request_state(&mut self, id: RecognizerId, state: GestureState) {
        self.with_cx(id, |cx| cx.request_state(state));
    }

    /// Stages a terminal state for `id`. See
    /// [`GestureCx::schedule_pending_recognition`].
    pub fn schedule_pending_recognition(&mut self, id: RecognizerId, state: GestureState, delay: f64) {
        self.with_cx(id, |cx| cx.schedule_pending_recognition(state, delay));
    }

    /// Replaces the staged terminal state of `id`. See
    /// [`GestureCx::update_pending_recognition`].
    pub fn update_pending_recognition(&mut self, id: RecognizerId, state: GestureState) {
        self.with_cx(id, |cx| cx.update_pending_recognition(state));
    }

    /// Commits the requested state of `id`, if there is one.
    ///
    /// Leaving `Possible` for `Began` or `Recognized` first asks the delegate;
    /// a veto drops the request and the recognizer stays `Possible`. Leaving
    /// `Possible` for any state then consults the must-fail peers, which may
    /// fail the request or defer it. Invalid transitions are logged and
    /// discarded.
    ///
    /// Committing a terminal state drops any staged state and releases the
    /// recognizers waiting on it.
    pub fn advance(&mut self, id: RecognizerId) {
        let Some(rec) = live(&self.slots, id) else {
            return;
        };
        let Some(requested) = rec.core.pending_next else {
            return;
        };
        let mut target = requested;
        if rec.core.state == GestureState::Possible {
            if matches!(requested, GestureState::Began | GestureState::Recognized)
                && let Some(delegate) = &rec.delegate
                && !delegate.should_begin(rec)
            {
                debug!(recognizer = ?id, name = %rec.core.name, %requested, "delegate vetoed");
                if let Some(rec) = live_mut(&mut self.slots, id) {
                    rec.core.pending_next = None;
                }
                return;
            }
            match self.resolve_for(id, target) {
                Resolution::Approve(state) => target = state,
                Resolution::Defer(peers) => {
                    if let Some(rec) = live_mut(&mut self.slots, id) {
                        rec.core.pending_next = Some(target);
                    }
                    self.defer(id, &peers);
                    return;
                }
            }
        }
        self.commit(id, target);
    }

    fn commit(&mut self, id: RecognizerId, to: GestureState) {
        let now = self.now;
        let Some(rec) = live_mut(&mut self.slots, id) else {
            return;
        };
        rec.core.pending_next = None;
        let from = rec.core.state;
        let transition = match Transition::validate(from, to) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(recognizer = ?id, name = %rec.core.name, "{err}; request discarded");
                return;
            }
        };
        rec.core.state = to;
        debug!(recognizer = ?id, name = %rec.core.name, %from, %to, "commit");
        if transition.notify {
            rec.notify();
        }
        if !to.is_terminal() {
            return;
        }
        self.timers
            .schedule(now, id, rec.core.attempt, TimerKind::Reset);
        // A settled recognizer has nothing left to stage.
        if let Some(staged) = rec.core.pending_terminal.take() {
            trace!(recognizer = ?id, %staged, "staged state dropped on commit");
        }
        let waiting = mem::take(&mut rec.core.failure_dependents);
        for dependent in waiting {
            self.failure_dependency_resolved(dependent, to);
        }
    }

    /// Returns `id` to `Possible` and clears its touches, requests, staged
    /// state and gesture scratch state.
    ///
    /// Recognizers waiting on its staged state are released with its last
    /// committed state.
    pub fn reset(&mut self, id: RecognizerId) {
        let Some(rec) = live_mut(&mut self.slots, id) else {
            return;
        };
        let settled = rec.core.state;
        rec.core.reset();
        rec.gesture.reset();
        let waiting = mem::take(&mut rec.core.failure_dependents);
        trace!(recognizer = ?id, name = %rec.core.name, %settled, "reset");
        for dependent in waiting {
            self.failure_dependency_resolved(dependent, settled);
        }
    }
}

impl<K: Copy + Ord, S: CoordinateSpace<K>> GestureArena<K, S> {
    /// Converts a scene point into `node`'s coordinates, or returns it
    /// unchanged for `None`.
    pub fn point_in(&self, point: Point, node: Option<&K>) -> Point {
        match node {
            Some(node) => self.space.point_in(point, node),
            None => point,
        }
    }

    /// Converts a scene vector into `node`'s coordinates, or returns it
    /// unchanged for `None`.
    pub fn vector_in(&self, vector: Vec2, node: Option<&K>) -> Vec2 {
        match node {
            Some(node) => self.space.vector_in(vector, node),
            None => vector,
        }
    }

    /// Centroid of the tracked, non-ignored touches of `id`, in `node`'s
    /// coordinates (scene coordinates for `None`).
    pub fn location_in(&self, id: RecognizerId, node: Option<&K>) -> Option<Point> {
        let location = self.get(id)?.location()?;
        Some(self.point_in(location, node))
    }

    /// Location of the `index`th tracked, non-ignored touch of `id`.
    pub fn location_of_touch(&self, id: RecognizerId, index: usize, node: Option<&K>) -> Option<Point> {
        let location = self.get(id)?.location_of_touch(index)?;
        Some(self.point_in(location, node))
    }
}
