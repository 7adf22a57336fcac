// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer states and the table of allowed transitions.

use core::fmt;

use crate::error::GestureError;

/// State of a gesture recognizer.
///
/// Discrete gestures (taps) go `Possible → Recognized`. Continuous gestures
/// (pans, drags) go `Possible → Began → Changed* → Ended | Cancelled`.
/// Either kind may go `Possible → Failed`. Terminal states are followed by
/// an automatic reset to `Possible` on the next tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum GestureState {
    /// Watching touches; nothing decided yet.
    #[default]
    Possible,
    /// A continuous gesture has started.
    Began,
    /// A continuous gesture has updated.
    Changed,
    /// A continuous gesture finished normally.
    Ended,
    /// A continuous gesture was cancelled.
    Cancelled,
    /// The touches do not form this gesture.
    Failed,
    /// A discrete gesture was recognized.
    Recognized,
}

impl GestureState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Possible,
        Self::Began,
        Self::Changed,
        Self::Ended,
        Self::Cancelled,
        Self::Failed,
        Self::Recognized,
    ];

    /// The single-state mask for this state.
    pub const fn bit(self) -> StateSet {
        match self {
            Self::Possible => StateSet::POSSIBLE,
            Self::Began => StateSet::BEGAN,
            Self::Changed => StateSet::CHANGED,
            Self::Ended => StateSet::ENDED,
            Self::Cancelled => StateSet::CANCELLED,
            Self::Failed => StateSet::FAILED,
            Self::Recognized => StateSet::RECOGNIZED,
        }
    }

    /// Returns `true` if this state is in `set`.
    pub const fn is_in(self, set: StateSet) -> bool {
        set.contains(self.bit())
    }

    /// Returns `true` for states after which the recognizer resets.
    pub const fn is_terminal(self) -> bool {
        self.is_in(StateSet::TERMINAL)
    }

    /// Returns `true` for `Began`, `Changed` and `Recognized`.
    pub const fn is_recognizing(self) -> bool {
        self.is_in(StateSet::RECOGNIZING)
    }

    /// Diagnostic name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Possible => "possible",
            Self::Began => "began",
            Self::Changed => "changed",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Recognized => "recognized",
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// A set of [`GestureState`]s.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StateSet: u8 {
        /// [`GestureState::Possible`].
        const POSSIBLE   = 0b0000_0001;
        /// [`GestureState::Began`].
        const BEGAN      = 0b0000_0010;
        /// [`GestureState::Changed`].
        const CHANGED    = 0b0000_0100;
        /// [`GestureState::Ended`].
        const ENDED      = 0b0000_1000;
        /// [`GestureState::Cancelled`].
        const CANCELLED  = 0b0001_0000;
        /// [`GestureState::Failed`].
        const FAILED     = 0b0010_0000;
        /// [`GestureState::Recognized`].
        const RECOGNIZED = 0b0100_0000;

        /// States in which a recognizer is actively recognizing. A peer in one
        /// of these fails its must-fail dependents.
        const RECOGNIZING = Self::BEGAN.bits() | Self::CHANGED.bits() | Self::RECOGNIZED.bits();
        /// Outcomes of a deferred decision that count as the peer succeeding.
        const CLAIMED = Self::RECOGNIZING.bits() | Self::ENDED.bits();
        /// States after which the recognizer resets.
        const TERMINAL = Self::ENDED.bits()
            | Self::CANCELLED.bits()
            | Self::FAILED.bits()
            | Self::RECOGNIZED.bits();
        /// States in which touches are delivered to the recognizer.
        const ACTIVE = Self::POSSIBLE.bits() | Self::BEGAN.bits() | Self::CHANGED.bits();
    }
}

impl From<GestureState> for StateSet {
    fn from(state: GestureState) -> Self {
        state.bit()
    }
}

/// One row of the transition table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Transition {
    /// Committed state before the transition.
    pub from: GestureState,
    /// Committed state after the transition.
    pub to: GestureState,
    /// Whether the recognizer's action runs when this transition commits.
    pub notify: bool,
}

impl Transition {
    const fn row(from: GestureState, to: GestureState, notify: bool) -> Self {
        Self { from, to, notify }
    }

    /// Every allowed transition. Anything not listed is rejected.
    pub const ALLOWED: [Self; 9] = {
        use GestureState::*;
        [
            Self::row(Possible, Recognized, true),
            Self::row(Possible, Began, true),
            Self::row(Possible, Failed, false),
            Self::row(Began, Changed, true),
            Self::row(Began, Cancelled, true),
            Self::row(Began, Ended, true),
            Self::row(Changed, Changed, true),
            Self::row(Changed, Cancelled, true),
            Self::row(Changed, Ended, true),
        ]
    };

    /// Looks up the row for `from → to`.
    pub fn find(from: GestureState, to: GestureState) -> Option<Self> {
        Self::ALLOWED
            .iter()
            .copied()
            .find(|t| t.from == from && t.to == to)
    }

    /// Like [`Transition::find`], but reports a rejected pair as an error.
    pub fn validate(from: GestureState, to: GestureState) -> Result<Self, GestureError> {
        Self::find(from, to).ok_or(GestureError::InvalidTransition { from, to })
    }
}
