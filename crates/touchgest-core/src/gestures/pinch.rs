#![forbid(unsafe_code)]

//! Two fingers moving toward or away from each other.

use glam::Vec2;
use web_time::Instant;

use super::pair_terminal_outcome;
use crate::config::PinchConfig;
use crate::gesture::{
    Arity, Frame, GestureKind, GestureKinds, StartCheck, StartContext, UpdateOutcome,
};
use crate::touch::{TouchId, TouchPhase, TouchPoint};

/// Pinch: the gap between two fingers changes past the slop distance while
/// each moving finger travels along the line joining the fingers.
///
/// Gap values are reported in inches.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchGesture {
    fingers: [TouchId; 2],
    start_positions: [Vec2; 2],
    gap_pixels: f32,
    gap_inches: f32,
    gap_delta_inches: f32,
}

impl PinchGesture {
    #[inline]
    #[must_use]
    pub fn start_positions(&self) -> [Vec2; 2] {
        self.start_positions
    }

    /// Current distance between the fingers.
    #[inline]
    #[must_use]
    pub fn gap_inches(&self) -> f32 {
        self.gap_inches
    }

    /// Change of the gap on the last update; positive when spreading.
    #[inline]
    #[must_use]
    pub fn gap_delta_inches(&self) -> f32 {
        self.gap_delta_inches
    }
}

impl GestureKind for PinchGesture {
    type Config = PinchConfig;
    const KIND: GestureKinds = GestureKinds::PINCH;
    const ARITY: Arity = Arity::Two;

    fn begin(touches: &[TouchPoint], _now: Instant) -> Self {
        let start_positions = [touches[0].position, touches[1].position];
        Self {
            fingers: [touches[0].id, touches[1].id],
            start_positions,
            gap_pixels: start_positions[0].distance(start_positions[1]),
            gap_inches: 0.0,
            gap_delta_inches: 0.0,
        }
    }

    fn fingers(&self) -> &[TouchId] {
        &self.fingers
    }

    fn can_start(&mut self, frame: &Frame<'_>, config: &PinchConfig) -> StartCheck {
        if frame.any_retained(&self.fingers) {
            return StartCheck::Cancel;
        }
        let Some((touch1, touch2)) = frame.find_pair(self.fingers) else {
            return StartCheck::Cancel;
        };
        if !touch1.is_moving() && !touch2.is_moving() {
            return StartCheck::NotYet;
        }

        // Each moving finger must travel along the finger line.
        let first_to_second =
            (self.start_positions[0] - self.start_positions[1]).normalize_or_zero();
        let dot_threshold = config.slop_motion_direction_degrees.to_radians().cos();
        let dot1 = touch1.delta.normalize_or_zero().dot(-first_to_second);
        let dot2 = touch2.delta.normalize_or_zero().dot(first_to_second);
        if touch1.is_moving() && dot1.abs() < dot_threshold {
            return StartCheck::NotYet;
        }
        if touch2.is_moving() && dot2.abs() < dot_threshold {
            return StartCheck::NotYet;
        }

        let start_gap = self.start_positions[0].distance(self.start_positions[1]);
        let gap = touch1.position.distance(touch2.position);
        if frame.pixels_to_inches((gap - start_gap).abs()) < config.slop_inches {
            return StartCheck::NotYet;
        }
        StartCheck::Ready
    }

    fn on_start(&mut self, ctx: &mut StartContext<'_>) {
        ctx.lock(self.fingers[0]);
        ctx.lock(self.fingers[1]);
        if let (Some(touch1), Some(touch2)) = (ctx.find(self.fingers[0]), ctx.find(self.fingers[1]))
        {
            self.gap_pixels = touch1.position.distance(touch2.position);
        }
        self.gap_inches = ctx.pixels_to_inches(self.gap_pixels);
    }

    fn update(&mut self, frame: &Frame<'_>, _config: &PinchConfig) -> UpdateOutcome {
        let Some((touch1, touch2)) = frame.find_pair(self.fingers) else {
            return UpdateOutcome::Cancel;
        };
        if let Some(outcome) = pair_terminal_outcome(touch1, touch2) {
            return outcome;
        }
        if touch1.phase == TouchPhase::Moved || touch2.phase == TouchPhase::Moved {
            let gap = touch1.position.distance(touch2.position);
            self.gap_inches = frame.pixels_to_inches(gap);
            self.gap_delta_inches = frame.pixels_to_inches(gap - self.gap_pixels);
            self.gap_pixels = gap;
            return UpdateOutcome::Changed;
        }
        UpdateOutcome::Unchanged
    }
}
