// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in gestures.

mod pan;
mod tap;
mod tap_and_a_half;
mod tap_tap_drag;

pub use pan::{Pan, PanConfig};
pub use tap::{Tap, TapConfig};
pub use tap_and_a_half::{TapAndAHalf, TapAndAHalfConfig};
pub use tap_tap_drag::{TapTapDrag, TapTapDragConfig};
