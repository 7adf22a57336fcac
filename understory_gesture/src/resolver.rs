// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Must-fail dependency resolution.
//!
//! A recognizer `R` that [requires](crate::GestureArena::require_to_fail) a
//! peer `O` to fail may only leave `Possible` once `O` is out of the way:
//!
//! - If `O` is recognizing (committed or requested `Began`, `Changed` or
//!   `Recognized`), `R` fails at once.
//! - Otherwise, if `O` has a staged terminal state, `R` registers itself with
//!   `O` and keeps its request until `O`'s timer fires. A claimed outcome
//!   (`Began`, `Changed`, `Recognized`, `Ended`) then fails `R`; any other
//!   outcome lets `R` advance again.
//! - Otherwise `R` proceeds.
//!
//! The graph may contain cycles. A peer that is recognizing always wins over a
//! pending one, and two mutually pending recognizers are settled by whichever
//! timer fires last: the earlier one defers on the later, which then decides
//! for both.

use alloc::vec::Vec;
use core::mem;
use tracing::{debug, trace};

use crate::arena::{GestureArena, live, live_mut};
use crate::error::GestureError;
use crate::recognizer::Recognizer;
use crate::state::{GestureState, StateSet};
use crate::types::RecognizerId;

/// Outcome of resolving a transition requested out of `Possible`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Commit this state; either the requested one or `Failed`.
    Approve(GestureState),
    /// Keep the request until these peers' staged states commit.
    Defer(Vec<RecognizerId>),
}

/// The parts of a peer the resolver looks at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerStatus {
    /// Committed state.
    pub state: GestureState,
    /// Requested, uncommitted state.
    pub requested: Option<GestureState>,
    /// Staged terminal state.
    pub pending_terminal: Option<GestureState>,
}

impl PeerStatus {
    /// Whether the peer is recognizing or has asked to.
    pub fn is_recognizing(&self) -> bool {
        self.state.is_recognizing() || self.requested.is_some_and(GestureState::is_recognizing)
    }
}

/// Decides a transition to `proposed` against the given must-fail peers.
pub fn resolve(
    proposed: GestureState,
    peers: impl IntoIterator<Item = (RecognizerId, PeerStatus)>,
) -> Resolution {
    let mut waiting = Vec::new();
    for (id, peer) in peers {
        if peer.is_recognizing() {
            return Resolution::Approve(GestureState::Failed);
        }
        if peer.pending_terminal.is_some() {
            waiting.push(id);
        }
    }
    if waiting.is_empty() {
        Resolution::Approve(proposed)
    } else {
        Resolution::Defer(waiting)
    }
}

impl<K> Recognizer<K> {
    pub(crate) fn peer_status(&self) -> PeerStatus {
        PeerStatus {
            state: self.core.state,
            requested: self.core.pending_next,
            pending_terminal: self.core.pending_terminal,
        }
    }
}

impl<K: Copy + Ord, S> GestureArena<K, S> {
    /// Makes `id` wait for `other` to fail before it may succeed.
    ///
    /// Adding the same edge twice has no effect. Cycles are allowed.
    pub fn require_to_fail(&mut self, id: RecognizerId, other: RecognizerId) -> Result<(), GestureError> {
        if id == other {
            return Err(GestureError::SelfDependency(id));
        }
        if !self.is_alive(other) {
            return Err(GestureError::StaleRecognizer(other));
        }
        let rec = live_mut(&mut self.slots, id).ok_or(GestureError::StaleRecognizer(id))?;
        if !rec.core.required_to_fail.contains(&other) {
            rec.core.required_to_fail.push(other);
        }
        Ok(())
    }

    /// Drops the must-fail edge from `id` to `other`, if present.
    pub fn remove_failure_requirement(&mut self, id: RecognizerId, other: RecognizerId) -> Result<(), GestureError> {
        let rec = live_mut(&mut self.slots, id).ok_or(GestureError::StaleRecognizer(id))?;
        rec.core.required_to_fail.retain(|o| *o != other);
        Ok(())
    }

    pub(crate) fn resolve_for(&self, id: RecognizerId, proposed: GestureState) -> Resolution {
        let Some(rec) = live(&self.slots, id) else {
            return Resolution::Approve(proposed);
        };
        let peers = rec
            .core
            .required_to_fail
            .iter()
            .filter_map(|&o| live(&self.slots, o).map(|peer| (o, peer.peer_status())));
        resolve(proposed, peers)
    }

    /// Registers `id` with each peer it is waiting on.
    pub(crate) fn defer(&mut self, id: RecognizerId, peers: &[RecognizerId]) {
        for &peer in peers {
            if let Some(peer) = live_mut(&mut self.slots, peer)
                && !peer.core.failure_dependents.contains(&id)
            {
                peer.core.failure_dependents.push(id);
            }
        }
        debug!(recognizer = ?id, on = ?peers, "deferred on pending peers");
    }

    /// The staged state of `id` is due: request it, then settle everyone
    /// waiting on it, then advance `id` itself.
    pub(crate) fn fire_pending_recognition(&mut self, id: RecognizerId) {
        let Some(rec) = live_mut(&mut self.slots, id) else {
            return;
        };
        let Some(state) = rec.core.pending_terminal.take() else {
            return;
        };
        rec.core.pending_next = Some(state);
        let waiting = mem::take(&mut rec.core.failure_dependents);
        for dependent in waiting {
            self.failure_dependency_resolved(dependent, state);
        }
        self.advance(id);
    }

    /// A peer that `dependent` was waiting on resolved to `resolved`.
    pub(crate) fn failure_dependency_resolved(&mut self, dependent: RecognizerId, resolved: GestureState) {
        let Some(rec) = live_mut(&mut self.slots, dependent) else {
            return;
        };
        if rec.core.state != GestureState::Possible || rec.core.pending_next.is_none() {
            trace!(recognizer = ?dependent, "nothing waiting on resolved peer");
            return;
        }
        if resolved.is_in(StateSet::CLAIMED) {
            debug!(recognizer = ?dependent, name = %rec.core.name, %resolved, "peer claimed the touches");
            rec.core.pending_next = Some(GestureState::Failed);
        }
        self.advance(dependent);
    }
}
