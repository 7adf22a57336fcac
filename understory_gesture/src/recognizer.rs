// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizers: shared state machine data plus a pluggable [`Gesture`].
//!
//! A [`Recognizer`] owns everything the arena needs to drive it: the committed
//! and requested states, the touches it tracks, its must-fail edges, its
//! action and delegate. Gesture-specific logic lives behind the [`Gesture`]
//! trait, which sees the recognizer only through a [`GestureCx`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use kurbo::{Point, Vec2};

use crate::state::GestureState;
use crate::timer::{TimerKind, TimerQueue};
use crate::types::{RecognizerId, Touch, TouchBatch, TouchId, TouchPhase};

/// Gesture-specific behavior plugged into a [`Recognizer`].
///
/// Handlers run while the recognizer is `Possible`, `Began` or `Changed`, and
/// only for touches the recognizer tracks and has not ignored. They never
/// commit a state; they request one through the [`GestureCx`] and the arena
/// commits it when it advances the recognizer.
pub trait Gesture: Any + fmt::Debug {
    /// Touches that went down in this batch.
    fn touches_began(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        let _ = (cx, touches);
    }

    /// Touches that moved in this batch.
    fn touches_moved(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        let _ = (cx, touches);
    }

    /// Touches that lifted in this batch.
    fn touches_ended(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        let _ = (cx, touches);
    }

    /// Touches the host cancelled in this batch.
    fn touches_cancelled(&mut self, cx: &mut GestureCx<'_>, touches: &[Touch]) {
        let _ = (cx, touches);
    }

    /// A timer armed with [`GestureCx::schedule_timer`] fired.
    ///
    /// Timers armed before the last reset never fire.
    fn timer_fired(&mut self, cx: &mut GestureCx<'_>, token: u32) {
        let _ = (cx, token);
    }

    /// Clears per-attempt scratch state. Configuration is kept.
    fn reset(&mut self) {}
}

/// Host callbacks that refine a recognizer's behavior. All methods have
/// permissive defaults.
pub trait GestureDelegate<K> {
    /// Called before `Possible → Began` or `Possible → Recognized` commits.
    /// Returning `false` fails the recognizer instead.
    fn should_begin(&self, recognizer: &Recognizer<K>) -> bool {
        let _ = recognizer;
        true
    }

    /// Called for each new touch before the recognizer starts tracking it.
    fn should_receive_touch(&self, recognizer: &Recognizer<K>, touch: &Touch) -> bool {
        let _ = (recognizer, touch);
        true
    }

    /// Whether `recognizer` may recognize together with `other`.
    ///
    /// Recognizers on the same node already run side by side unless they are
    /// linked with [`require_to_fail`](crate::GestureArena::require_to_fail),
    /// so the arena does not consult this yet.
    fn should_recognize_simultaneously(
        &self,
        recognizer: &Recognizer<K>,
        other: &Recognizer<K>,
    ) -> bool {
        let _ = (recognizer, other);
        false
    }
}

/// Callback invoked when a recognizer commits a notifying transition.
pub type Action<K> = Box<dyn FnMut(&Recognizer<K>)>;

/// Gesture-independent recognizer state.
#[derive(Debug, Default)]
pub(crate) struct RecognizerCore {
    pub(crate) state: GestureState,
    pub(crate) pending_next: Option<GestureState>,
    pub(crate) pending_terminal: Option<GestureState>,
    pub(crate) enabled: bool,
    /// Latest sample of every tracked touch, in the order tracking began.
    pub(crate) tracking: Vec<Touch>,
    /// Tracked touches excluded from delivery. Always a subset of `tracking`.
    pub(crate) ignored: Vec<TouchId>,
    pub(crate) required_to_fail: Vec<RecognizerId>,
    pub(crate) failure_dependents: Vec<RecognizerId>,
    /// Bumped by every reset; timers armed in an older attempt are stale.
    pub(crate) attempt: u64,
    pub(crate) name: String,
}

impl RecognizerCore {
    pub(crate) fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub(crate) fn is_tracking(&self, id: TouchId) -> bool {
        self.tracking.iter().any(|t| t.id == id)
    }

    pub(crate) fn is_ignored(&self, id: TouchId) -> bool {
        self.ignored.contains(&id)
    }

    /// Tracked touches that are delivered to the gesture.
    pub(crate) fn active(&self) -> impl Iterator<Item = &Touch> + '_ {
        self.tracking.iter().filter(|t| !self.is_ignored(t.id))
    }

    pub(crate) fn track(&mut self, touch: Touch) {
        if !self.is_tracking(touch.id) {
            self.tracking.push(touch);
        }
    }

    /// Stores the latest sample of every tracked touch in `batch`.
    pub(crate) fn refresh(&mut self, batch: &TouchBatch) {
        for tracked in &mut self.tracking {
            if let Some(sample) = batch.get(tracked.id) {
                *tracked = *sample;
            }
        }
    }

    /// Splits the batch's tracked, non-ignored touches by phase:
    /// began, moved, ended, cancelled. Stationary touches are dropped.
    pub(crate) fn partition(&self, batch: &TouchBatch) -> [Vec<Touch>; 4] {
        let mut out: [Vec<Touch>; 4] = Default::default();
        for touch in batch.touches() {
            if !self.is_tracking(touch.id) || self.is_ignored(touch.id) {
                continue;
            }
            let slot = match touch.phase {
                TouchPhase::Began => 0,
                TouchPhase::Moved => 1,
                TouchPhase::Ended => 2,
                TouchPhase::Cancelled => 3,
                TouchPhase::Stationary => continue,
            };
            out[slot].push(*touch);
        }
        out
    }

    /// Stops tracking every touch that finished in `batch`.
    pub(crate) fn end_tracking(&mut self, batch: &TouchBatch) {
        let finished = |id: TouchId| batch.get(id).is_some_and(|t| t.phase.is_finished());
        self.tracking.retain(|t| !finished(t.id));
        self.ignored.retain(|id| !finished(*id));
    }

    pub(crate) fn ignore(&mut self, id: TouchId) {
        if self.is_tracking(id) && !self.is_ignored(id) {
            self.ignored.push(id);
        }
    }

    /// Centroid of the delivered touches.
    pub(crate) fn centroid(&self) -> Option<Point> {
        let mut count = 0_u32;
        let sum = self.active().fold(Vec2::ZERO, |acc, t| {
            count += 1;
            acc + t.location.to_vec2()
        });
        (count > 0).then(|| (sum / f64::from(count)).to_point())
    }

    /// Returns to `Possible` and forgets this attempt. Edges, name and
    /// `enabled` are kept; failure dependents are released by the arena.
    pub(crate) fn reset(&mut self) {
        self.state = GestureState::Possible;
        self.pending_next = None;
        self.pending_terminal = None;
        self.tracking.clear();
        self.ignored.clear();
        self.attempt += 1;
    }
}

/// The view of a recognizer given to [`Gesture`] handlers.
#[derive(Debug)]
pub struct GestureCx<'a> {
    id: RecognizerId,
    core: &'a mut RecognizerCore,
    timers: &'a mut TimerQueue,
    now: f64,
}

impl<'a> GestureCx<'a> {
    pub(crate) fn new(
        id: RecognizerId,
        core: &'a mut RecognizerCore,
        timers: &'a mut TimerQueue,
        now: f64,
    ) -> Self {
        Self {
            id,
            core,
            timers,
            now,
        }
    }

    /// The recognizer being driven.
    pub fn id(&self) -> RecognizerId {
        self.id
    }

    /// Committed state.
    pub fn state(&self) -> GestureState {
        self.core.state
    }

    /// Requested but not yet committed state.
    pub fn requested_state(&self) -> Option<GestureState> {
        self.core.pending_next
    }

    /// Staged terminal state waiting on its timer.
    pub fn pending_terminal_state(&self) -> Option<GestureState> {
        self.core.pending_terminal
    }

    /// Current time in seconds: the batch timestamp while handling touches,
    /// the arena clock while handling a timer.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Requests `state`. It is validated and committed when the arena next
    /// advances the recognizer, normally right after this batch.
    pub fn request_state(&mut self, state: GestureState) {
        self.core.pending_next = Some(state);
    }

    /// Stages `state` and arms a timer that requests it after `delay`
    /// seconds. If a state is already staged, only the staged state changes
    /// and the existing timer keeps its due time.
    pub fn schedule_pending_recognition(&mut self, state: GestureState, delay: f64) {
        if self.core.pending_terminal.is_some() {
            self.core.pending_terminal = Some(state);
            return;
        }
        self.core.pending_terminal = Some(state);
        self.timers.schedule(
            self.now + delay,
            self.id,
            self.core.attempt,
            TimerKind::PendingRecognition,
        );
    }

    /// Replaces the staged state. Without a staged state this requests
    /// `state` directly.
    pub fn update_pending_recognition(&mut self, state: GestureState) {
        if self.core.pending_terminal.is_some() {
            self.core.pending_terminal = Some(state);
        } else {
            self.request_state(state);
        }
    }

    /// Arms a gesture timer; [`Gesture::timer_fired`] receives `token`.
    pub fn schedule_timer(&mut self, delay: f64, token: u32) {
        self.timers.schedule(
            self.now + delay,
            self.id,
            self.core.attempt,
            TimerKind::Variant(token),
        );
    }

    /// Stops delivering `touch` to this recognizer until it ends.
    pub fn ignore_touch(&mut self, touch: TouchId) {
        self.core.ignore(touch);
    }

    /// Number of tracked, non-ignored touches.
    pub fn number_of_touches(&self) -> usize {
        self.core.active().count()
    }

    /// Latest sample of a tracked, non-ignored touch.
    pub fn touch(&self, id: TouchId) -> Option<&Touch> {
        self.core.active().find(|t| t.id == id)
    }

    /// Latest samples of all tracked, non-ignored touches.
    pub fn touches(&self) -> impl Iterator<Item = &Touch> + '_ {
        self.core.active()
    }

    /// Centroid of the tracked, non-ignored touches, in scene coordinates.
    pub fn location(&self) -> Option<Point> {
        self.core.centroid()
    }
}

/// A gesture recognizer owned by a [`GestureArena`](crate::GestureArena).
pub struct Recognizer<K> {
    pub(crate) id: RecognizerId,
    pub(crate) core: RecognizerCore,
    pub(crate) gesture: Box<dyn Gesture>,
    pub(crate) node: Option<K>,
    pub(crate) action: Option<Action<K>>,
    pub(crate) delegate: Option<Rc<dyn GestureDelegate<K>>>,
}

impl<K: fmt::Debug> fmt::Debug for Recognizer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recognizer")
            .field("id", &self.id)
            .field("name", &self.core.name)
            .field("state", &self.core.state)
            .field("node", &self.node)
            .field("gesture", &self.gesture)
            .field("tracking", &self.core.tracking.len())
            .field("has_delegate", &self.delegate.is_some())
            .finish_non_exhaustive()
    }
}

impl<K> Recognizer<K> {
    pub(crate) fn new(id: RecognizerId, gesture: Box<dyn Gesture>, action: Action<K>) -> Self {
        Self {
            id,
            core: RecognizerCore::new(),
            gesture,
            node: None,
            action: Some(action),
            delegate: None,
        }
    }

    /// Runs the action with a shared view of this recognizer.
    pub(crate) fn notify(&mut self) {
        if let Some(mut action) = self.action.take() {
            action(self);
            self.action = Some(action);
        }
    }

    /// This recognizer's handle.
    pub fn id(&self) -> RecognizerId {
        self.id
    }

    /// Diagnostic name; empty unless set.
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Committed state.
    pub fn state(&self) -> GestureState {
        self.core.state
    }

    /// Requested but not yet committed state.
    pub fn requested_state(&self) -> Option<GestureState> {
        self.core.pending_next
    }

    /// Staged terminal state waiting on its timer.
    pub fn pending_terminal_state(&self) -> Option<GestureState> {
        self.core.pending_terminal
    }

    /// Whether the recognizer accepts new touches.
    pub fn is_enabled(&self) -> bool {
        self.core.enabled
    }

    /// The node this recognizer is attached to.
    pub fn node(&self) -> Option<&K> {
        self.node.as_ref()
    }

    /// The gesture logic, for reading results such as a pan's translation.
    pub fn gesture(&self) -> &dyn Gesture {
        &*self.gesture
    }

    /// The gesture logic downcast to `T`.
    pub fn gesture_as<T: Gesture>(&self) -> Option<&T> {
        let any: &dyn Any = &*self.gesture;
        any.downcast_ref()
    }

    /// Ids of tracked touches, in the order tracking began.
    pub fn tracking_touches(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.core.tracking.iter().map(|t| t.id)
    }

    /// Ids of tracked touches that are no longer delivered.
    pub fn ignored_touches(&self) -> &[TouchId] {
        &self.core.ignored
    }

    /// Number of tracked, non-ignored touches.
    pub fn number_of_touches(&self) -> usize {
        self.core.active().count()
    }

    /// Centroid of the tracked, non-ignored touches, in scene coordinates.
    pub fn location(&self) -> Option<Point> {
        self.core.centroid()
    }

    /// Scene location of the `index`th tracked, non-ignored touch.
    pub fn location_of_touch(&self, index: usize) -> Option<Point> {
        self.core.active().nth(index).map(|t| t.location)
    }

    /// Recognizers that must fail before this one may succeed.
    pub fn required_to_fail(&self) -> &[RecognizerId] {
        &self.core.required_to_fail
    }

    /// Recognizers currently waiting on this one's staged terminal state.
    pub fn failure_dependents(&self) -> &[RecognizerId] {
        &self.core.failure_dependents
    }
}
