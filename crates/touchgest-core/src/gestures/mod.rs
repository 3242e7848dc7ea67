#![forbid(unsafe_code)]

//! Concrete gesture kinds.
//!
//! | Kind | Fingers | Starts when | Reports |
//! |------|---------|-------------|---------|
//! | [`TwoFingerDragGesture`] | 2 | both fingers travel past slop in the same direction | midpoint position and delta |
//! | [`PinchGesture`] | 2 | the finger gap changes past slop along the finger line | gap and gap delta (inches) |
//! | [`TwistGesture`] | 2 | the finger line rotates past slop | delta rotation (degrees) |
//! | [`DragGesture`] | 1 | the only free finger travels past slop | position and delta |
//! | [`TapGesture`] | 1 | immediately | completion if released in time and place |

mod drag;
mod pinch;
mod tap;
mod twist;
mod two_finger_drag;

pub use drag::DragGesture;
pub use pinch::PinchGesture;
pub use tap::TapGesture;
pub use twist::TwistGesture;
pub use two_finger_drag::TwoFingerDragGesture;

use glam::Vec2;

use crate::gesture::UpdateOutcome;
use crate::touch::{TouchPhase, TouchPoint};

/// Terminal outcome for a two-finger gesture, if either finger left.
///
/// A cancelled finger wins over an ended one.
fn pair_terminal_outcome(a: &TouchPoint, b: &TouchPoint) -> Option<UpdateOutcome> {
    if a.phase == TouchPhase::Cancelled || b.phase == TouchPhase::Cancelled {
        Some(UpdateOutcome::Cancel)
    } else if a.phase == TouchPhase::Ended || b.phase == TouchPhase::Ended {
        Some(UpdateOutcome::Complete)
    } else {
        None
    }
}

#[inline]
fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) / 2.0
}
