#![forbid(unsafe_code)]

//! Single-finger tap.

use glam::Vec2;
use web_time::{Duration, Instant};

use crate::config::TapConfig;
use crate::gesture::{
    Arity, Frame, GestureKind, GestureKinds, StartCheck, StartContext, UpdateOutcome,
};
use crate::touch::{TouchId, TouchPhase, TouchPoint};

/// A finger pressed and lifted quickly without travelling.
///
/// Taps start the moment the finger lands and never lock their touch, so a
/// drag may still claim the same finger. The tap cancels itself once another
/// gesture retains the finger, the finger travels past the slop distance, or
/// it stays down too long. Listeners act on `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct TapGesture {
    finger: TouchId,
    start_position: Vec2,
    began_at: Instant,
    elapsed: Duration,
}

impl TapGesture {
    #[inline]
    #[must_use]
    pub fn start_position(&self) -> Vec2 {
        self.start_position
    }

    /// Time the finger has been down as of the last update.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl GestureKind for TapGesture {
    type Config = TapConfig;
    const KIND: GestureKinds = GestureKinds::TAP;
    const ARITY: Arity = Arity::One;

    fn begin(touches: &[TouchPoint], now: Instant) -> Self {
        Self {
            finger: touches[0].id,
            start_position: touches[0].position,
            began_at: now,
            elapsed: Duration::ZERO,
        }
    }

    fn fingers(&self) -> &[TouchId] {
        std::slice::from_ref(&self.finger)
    }

    fn can_start(&mut self, _frame: &Frame<'_>, _config: &TapConfig) -> StartCheck {
        StartCheck::Ready
    }

    fn on_start(&mut self, ctx: &mut StartContext<'_>) {
        ctx.resolve_target(&[self.start_position]);
    }

    fn update(&mut self, frame: &Frame<'_>, config: &TapConfig) -> UpdateOutcome {
        let Some(touch) = frame.find(self.finger) else {
            return UpdateOutcome::Cancel;
        };
        if frame.registry.is_retained(self.finger) {
            return UpdateOutcome::Cancel;
        }
        self.elapsed = frame.now.saturating_duration_since(self.began_at);
        if self.elapsed > config.max_duration {
            return UpdateOutcome::Cancel;
        }
        match touch.phase {
            TouchPhase::Moved => {
                let travel =
                    frame.pixels_to_inches((touch.position - self.start_position).length());
                if travel > config.slop_inches {
                    UpdateOutcome::Cancel
                } else {
                    UpdateOutcome::Unchanged
                }
            }
            TouchPhase::Ended => UpdateOutcome::Complete,
            TouchPhase::Cancelled => UpdateOutcome::Cancel,
            TouchPhase::Began | TouchPhase::Stationary => UpdateOutcome::Unchanged,
        }
    }
}
