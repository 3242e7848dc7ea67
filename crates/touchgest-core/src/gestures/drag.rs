#![forbid(unsafe_code)]

//! Single-finger drag.

use glam::Vec2;
use web_time::Instant;

use crate::config::DragConfig;
use crate::gesture::{
    Arity, Frame, GestureKind, GestureKinds, StartCheck, StartContext, UpdateOutcome,
};
use crate::touch::{TouchId, TouchPhase, TouchPoint};

/// One finger moved past the slop distance while no other finger is free.
///
/// While a second free finger is on the screen the candidate waits, since
/// multi-finger input belongs to the two-finger gestures. A thumb resting
/// briefly does not kill the drag; it starts once the other finger lifts or
/// is claimed.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    finger: TouchId,
    start_position: Vec2,
    position: Vec2,
    delta: Vec2,
}

impl DragGesture {
    #[inline]
    #[must_use]
    pub fn start_position(&self) -> Vec2 {
        self.start_position
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Movement on the last update.
    #[inline]
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }
}

impl GestureKind for DragGesture {
    type Config = DragConfig;
    const KIND: GestureKinds = GestureKinds::DRAG;
    const ARITY: Arity = Arity::One;

    fn begin(touches: &[TouchPoint], _now: Instant) -> Self {
        let touch = &touches[0];
        Self {
            finger: touch.id,
            start_position: touch.position,
            position: touch.position,
            delta: Vec2::ZERO,
        }
    }

    fn fingers(&self) -> &[TouchId] {
        std::slice::from_ref(&self.finger)
    }

    fn can_start(&mut self, frame: &Frame<'_>, config: &DragConfig) -> StartCheck {
        if frame.registry.is_retained(self.finger) {
            return StartCheck::Cancel;
        }
        let other_free_finger = frame
            .registry
            .touches()
            .iter()
            .any(|t| t.id != self.finger && !frame.registry.is_retained(t.id));
        if other_free_finger {
            return StartCheck::NotYet;
        }
        let Some(touch) = frame.find(self.finger) else {
            return StartCheck::Cancel;
        };

        let travel = frame.pixels_to_inches((touch.position - self.start_position).length());
        if travel >= config.slop_inches {
            StartCheck::Ready
        } else {
            StartCheck::NotYet
        }
    }

    fn on_start(&mut self, ctx: &mut StartContext<'_>) {
        ctx.lock(self.finger);
        ctx.resolve_target(&[self.start_position]);
        if let Some(touch) = ctx.find(self.finger) {
            self.position = touch.position;
        }
    }

    fn update(&mut self, frame: &Frame<'_>, _config: &DragConfig) -> UpdateOutcome {
        let Some(touch) = frame.find(self.finger) else {
            return UpdateOutcome::Cancel;
        };
        match touch.phase {
            TouchPhase::Moved => {
                self.delta = touch.position - self.position;
                self.position = touch.position;
                UpdateOutcome::Changed
            }
            TouchPhase::Ended => UpdateOutcome::Complete,
            TouchPhase::Cancelled => UpdateOutcome::Cancel,
            TouchPhase::Began | TouchPhase::Stationary => UpdateOutcome::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DragConfig;
    use crate::gesture::{GestureEvent, GestureId, NoHits, TargetId};
    use crate::gestures::testing::{began, inch_registry, moved, phase, still};
    use crate::recognizer::GestureRecognizer;
    use crate::touch::{LockOwner, TouchRegistry};

    fn step(
        rec: &mut GestureRecognizer<DragGesture>,
        reg: &mut TouchRegistry,
        touches: &[TouchPoint],
    ) -> Vec<GestureEvent<DragGesture>> {
        reg.refresh(touches).unwrap();
        rec.tick(reg, &NoHits, Instant::now())
    }

    fn recognizer() -> GestureRecognizer<DragGesture> {
        GestureRecognizer::new(DragConfig { slop_inches: 5.0 })
    }

    #[test]
    fn starts_at_slop() {
        let mut reg = inch_registry();
        let mut rec = recognizer();

        assert!(step(&mut rec, &mut reg, &[began(1, 100.0, 100.0)]).is_empty());
        assert!(step(&mut rec, &mut reg, &[moved(1, 103.0, 100.0, 3.0, 0.0)]).is_empty());
        let events = step(&mut rec, &mut reg, &[moved(1, 105.0, 100.0, 2.0, 0.0)]);
        let [GestureEvent::Started { gesture, .. }] = &events[..] else {
            panic!("expected Started, got {events:?}");
        };
        assert_eq!(gesture.position(), Vec2::new(105.0, 100.0));
        assert_eq!(gesture.start_position(), Vec2::new(100.0, 100.0));
        assert!(reg.is_retained(TouchId(1)));
    }

    #[test]
    fn moves_report_delta_and_end_completes() {
        let mut reg = inch_registry();
        let mut rec = recognizer();
        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0)]);
        step(&mut rec, &mut reg, &[moved(1, 110.0, 100.0, 10.0, 0.0)]);

        let events = step(&mut rec, &mut reg, &[moved(1, 113.0, 96.0, 3.0, -4.0)]);
        let [GestureEvent::Updated { gesture, .. }] = &events[..] else {
            panic!("expected Updated, got {events:?}");
        };
        assert_eq!(gesture.delta(), Vec2::new(3.0, -4.0));

        assert!(step(&mut rec, &mut reg, &[still(1, 113.0, 96.0)]).is_empty());

        let events = step(&mut rec, &mut reg, &[phase(1, 113.0, 96.0, TouchPhase::Ended)]);
        assert!(matches!(events[..], [GestureEvent::Completed { .. }]));
        assert_eq!(reg.retained_count(), 0);
    }

    #[test]
    fn second_free_finger_defers_start() {
        let mut reg = inch_registry();
        let mut rec = recognizer();
        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0)]);

        let events = step(
            &mut rec,
            &mut reg,
            &[moved(1, 120.0, 100.0, 20.0, 0.0), still(2, 400.0, 400.0)],
        );
        assert!(events.is_empty());
        assert!(rec.is_tracking(&[TouchId(1)]));
        assert_eq!(reg.retained_count(), 0);

        // The resting finger lifts; the drag starts on the next frame.
        step(
            &mut rec,
            &mut reg,
            &[still(1, 120.0, 100.0), phase(2, 400.0, 400.0, TouchPhase::Ended)],
        );
        let events = step(&mut rec, &mut reg, &[moved(1, 121.0, 100.0, 1.0, 0.0)]);
        assert!(matches!(events[..], [GestureEvent::Started { .. }]));
        assert!(reg.is_retained(TouchId(1)));
    }

    #[test]
    fn retained_second_finger_does_not_block() {
        let mut reg = inch_registry();
        let mut rec = recognizer();
        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0)]);
        let lock = reg.retain(
            TouchId(2),
            LockOwner {
                kind: GestureKinds::PINCH,
                gesture: GestureId(4),
            },
        );

        let events = step(
            &mut rec,
            &mut reg,
            &[moved(1, 120.0, 100.0, 20.0, 0.0), still(2, 400.0, 400.0)],
        );
        assert!(matches!(events[..], [GestureEvent::Started { .. }]));
        reg.release(lock);
    }

    #[test]
    fn vanished_touch_cancels() {
        let mut reg = inch_registry();
        let mut rec = recognizer();
        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0)]);
        step(&mut rec, &mut reg, &[moved(1, 110.0, 100.0, 10.0, 0.0)]);

        let events = step(&mut rec, &mut reg, &[]);
        assert!(matches!(events[..], [GestureEvent::Cancelled { .. }]));
        assert_eq!(reg.retained_count(), 0);
    }

    #[test]
    fn target_from_start_position() {
        let mut reg = inch_registry();
        let mut rec = recognizer();
        let hit = |pos: Vec2| (pos == Vec2::new(100.0, 100.0)).then_some(TargetId(1));

        reg.refresh(&[began(1, 100.0, 100.0)]).unwrap();
        rec.tick(&mut reg, &hit, Instant::now());
        reg.refresh(&[moved(1, 150.0, 100.0, 50.0, 0.0)]).unwrap();
        let events = rec.tick(&mut reg, &hit, Instant::now());
        assert!(matches!(
            events[..],
            [GestureEvent::Started {
                target: Some(TargetId(1)),
                ..
            }]
        ));
    }
}
