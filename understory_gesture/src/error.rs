// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for the arena's attachment and dependency API.

use crate::state::GestureState;
use crate::types::RecognizerId;

/// Errors reported by [`GestureArena`](crate::GestureArena) operations and
/// [`Transition::validate`](crate::Transition::validate).
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GestureError {
    /// The requested transition is not in the transition table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Committed state.
        from: GestureState,
        /// Requested state.
        to: GestureState,
    },
    /// The handle refers to a removed recognizer.
    #[error("recognizer {0:?} is not alive")]
    StaleRecognizer(RecognizerId),
    /// A recognizer was asked to require its own failure.
    #[error("recognizer {0:?} cannot require itself to fail")]
    SelfDependency(RecognizerId),
    /// The recognizer is not attached to any node.
    #[error("recognizer {0:?} is not attached to a node")]
    NotAttached(RecognizerId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_states() {
        let err = GestureError::InvalidTransition {
            from: GestureState::Failed,
            to: GestureState::Began,
        };
        assert_eq!(err.to_string(), "invalid transition from failed to began");
        let stale = GestureError::StaleRecognizer(RecognizerId::new(3, 2));
        assert_eq!(stale.to_string(), "recognizer RecognizerId(3, 2) is not alive");
    }
}
