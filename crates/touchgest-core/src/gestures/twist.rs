#![forbid(unsafe_code)]

//! Two fingers rotating around each other.

use glam::Vec2;
use web_time::Instant;

use super::pair_terminal_outcome;
use crate::config::TwistConfig;
use crate::gesture::{
    Arity, Frame, GestureKind, GestureKinds, StartCheck, StartContext, UpdateOutcome,
};
use crate::touch::{TouchId, TouchPhase, TouchPoint};

/// Twist: the line between two fingers rotates past the slop angle.
///
/// Rotation is in degrees, positive counter-clockwise in a y-up frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TwistGesture {
    fingers: [TouchId; 2],
    start_positions: [Vec2; 2],
    previous_positions: [Vec2; 2],
    delta_rotation: f32,
}

impl TwistGesture {
    #[inline]
    #[must_use]
    pub fn start_positions(&self) -> [Vec2; 2] {
        self.start_positions
    }

    /// Rotation of the finger line on the last update, in degrees.
    #[inline]
    #[must_use]
    pub fn delta_rotation(&self) -> f32 {
        self.delta_rotation
    }
}

/// Signed angle in degrees from the `previous` finger line to the `current` one.
///
/// Returns 0 when either line has zero length.
#[must_use]
pub(crate) fn delta_rotation_degrees(current: [Vec2; 2], previous: [Vec2; 2]) -> f32 {
    let current_dir = current[0] - current[1];
    let previous_dir = previous[0] - previous[1];
    previous_dir
        .perp_dot(current_dir)
        .atan2(previous_dir.dot(current_dir))
        .to_degrees()
}

impl GestureKind for TwistGesture {
    type Config = TwistConfig;
    const KIND: GestureKinds = GestureKinds::TWIST;
    const ARITY: Arity = Arity::Two;

    fn begin(touches: &[TouchPoint], _now: Instant) -> Self {
        let start_positions = [touches[0].position, touches[1].position];
        Self {
            fingers: [touches[0].id, touches[1].id],
            start_positions,
            previous_positions: start_positions,
            delta_rotation: 0.0,
        }
    }

    fn fingers(&self) -> &[TouchId] {
        &self.fingers
    }

    fn can_start(&mut self, frame: &Frame<'_>, config: &TwistConfig) -> StartCheck {
        if frame.any_retained(&self.fingers) {
            return StartCheck::Cancel;
        }
        let Some((touch1, touch2)) = frame.find_pair(self.fingers) else {
            return StartCheck::Cancel;
        };
        if !touch1.is_moving() && !touch2.is_moving() {
            return StartCheck::NotYet;
        }
        let rotation =
            delta_rotation_degrees([touch1.position, touch2.position], self.start_positions);
        if rotation.abs() < config.slop_rotation_degrees {
            return StartCheck::NotYet;
        }
        StartCheck::Ready
    }

    fn on_start(&mut self, ctx: &mut StartContext<'_>) {
        ctx.lock(self.fingers[0]);
        ctx.lock(self.fingers[1]);
        if let (Some(touch1), Some(touch2)) = (ctx.find(self.fingers[0]), ctx.find(self.fingers[1]))
        {
            self.previous_positions = [touch1.position, touch2.position];
        }
    }

    fn update(&mut self, frame: &Frame<'_>, _config: &TwistConfig) -> UpdateOutcome {
        let Some((touch1, touch2)) = frame.find_pair(self.fingers) else {
            return UpdateOutcome::Cancel;
        };
        if let Some(outcome) = pair_terminal_outcome(touch1, touch2) {
            return outcome;
        }
        if touch1.phase == TouchPhase::Moved || touch2.phase == TouchPhase::Moved {
            let current = [touch1.position, touch2.position];
            self.delta_rotation = delta_rotation_degrees(current, self.previous_positions);
            self.previous_positions = current;
            return UpdateOutcome::Changed;
        }
        UpdateOutcome::Unchanged
    }
}
