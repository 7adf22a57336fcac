// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: deterministic touch gesture recognizers for UI scenes.
//!
//! ## Overview
//!
//! This crate turns batches of raw touches (press, move, release, cancel) into gesture notifications:
//! taps, double taps, pans, tap-and-a-half and tap-tap-drag.
//! It does not perform hit testing. The host decides which node a batch of touches hit (for example
//! with a box tree) and hands the batch to [`GestureArena::deliver_touch_batch`] for that node.
//!
//! ## Recognizers and states
//!
//! A [`Recognizer`] pairs a [`Gesture`] (the gesture-specific logic) with a strict state machine:
//!
//! - discrete gestures go `Possible → Recognized`;
//! - continuous gestures go `Possible → Began → Changed* → Ended | Cancelled`;
//! - any gesture may go `Possible → Failed`.
//!
//! Gestures only *request* states. The arena validates each request against
//! [`Transition::ALLOWED`], commits it, and runs the recognizer's action when the transition
//! notifies. After a terminal state the recognizer resets to `Possible` on the next tick.
//!
//! ## Competing recognizers
//!
//! Recognizers attached to the same node all see the same touches. To make one wait for another,
//! link them with [`GestureArena::require_to_fail`]: a single tap that requires a double tap to fail
//! stays silent until the double tap has given up, and fails if the double tap succeeds.
//! Discrete gestures hold their success back for a short interval (a *pending* state) so that a
//! longer gesture can still claim the touches. See [`resolver`] for the exact rules.
//!
//! ## Time
//!
//! The arena has no clock of its own. Batch timestamps and [`GestureArena::advance_time`] move
//! it forward, and [`GestureArena::next_deadline`] tells a host when the next deferred decision
//! is due. Every deferred callback is tied to the recognizer attempt that armed it, so resets,
//! detaches and removals make outstanding timers harmless.
//!
//! ## Coordinates
//!
//! Touch locations are in scene coordinates. A [`CoordinateSpace`] supplies node transforms for
//! [`GestureArena::location_in`] and for the translation and velocity of the continuous gestures.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use understory_gesture::variants::Tap;
//! use understory_gesture::{GestureArena, GestureState, Touch, TouchBatch, TouchId, TouchPhase};
//!
//! let mut arena: GestureArena<u32> = GestureArena::new();
//! let taps = Rc::new(Cell::new(0));
//! let seen = taps.clone();
//! let single = arena.insert(Tap::default(), move |r| {
//!     if r.state() == GestureState::Recognized {
//!         seen.set(seen.get() + 1);
//!     }
//! });
//! arena.attach(single, 1).unwrap();
//!
//! let at = Point::new(10.0, 10.0);
//! let down = Touch::new(TouchId(0), TouchPhase::Began, at, 0.0);
//! let up = Touch::new(TouchId(0), TouchPhase::Ended, at, 0.125);
//! arena.deliver_touch_batch(1, &TouchBatch::new(vec![down]));
//! arena.deliver_touch_batch(1, &TouchBatch::new(vec![up]));
//!
//! // The tap waits out the tap interval in case a double tap claims it.
//! assert_eq!(taps.get(), 0);
//! arena.advance_time(arena.next_deadline().unwrap());
//! assert_eq!(taps.get(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod arena;
pub mod coordinator;
pub mod error;
pub mod recognizer;
pub mod resolver;
pub mod space;
pub mod state;
pub mod types;
pub mod variants;

mod motion;
mod timer;

pub use arena::GestureArena;
pub use coordinator::Coordinator;
pub use error::GestureError;
pub use recognizer::{Action, Gesture, GestureCx, GestureDelegate, Recognizer};
pub use resolver::{PeerStatus, Resolution};
pub use space::{CoordinateSpace, NodeTransforms, SceneSpace};
pub use state::{GestureState, StateSet, Transition};
pub use types::{RecognizerId, Touch, TouchBatch, TouchId, TouchPhase};
