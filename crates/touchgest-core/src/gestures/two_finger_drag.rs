#![forbid(unsafe_code)]

//! Two fingers sliding across the screen together.

use glam::Vec2;
use web_time::Instant;

use super::{midpoint, pair_terminal_outcome};
use crate::config::TwoFingerDragConfig;
use crate::gesture::{
    Arity, Frame, GestureKind, GestureKinds, StartCheck, StartContext, UpdateOutcome,
};
use crate::touch::{TouchId, TouchPhase, TouchPoint};

/// Two-finger drag: both fingers move past the slop distance in roughly the
/// same direction.
///
/// `position` is the midpoint of the two fingers; `delta` is how far that
/// midpoint moved on the last update.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoFingerDragGesture {
    fingers: [TouchId; 2],
    start_positions: [Vec2; 2],
    position: Vec2,
    delta: Vec2,
}

impl TwoFingerDragGesture {
    /// Screen positions where each finger started.
    #[inline]
    #[must_use]
    pub fn start_positions(&self) -> [Vec2; 2] {
        self.start_positions
    }

    /// Current midpoint of the two fingers.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Midpoint movement on the last update.
    #[inline]
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }
}

impl GestureKind for TwoFingerDragGesture {
    type Config = TwoFingerDragConfig;
    const KIND: GestureKinds = GestureKinds::TWO_FINGER_DRAG;
    const ARITY: Arity = Arity::Two;

    fn begin(touches: &[TouchPoint], _now: Instant) -> Self {
        let start_positions = [touches[0].position, touches[1].position];
        Self {
            fingers: [touches[0].id, touches[1].id],
            start_positions,
            position: midpoint(start_positions[0], start_positions[1]),
            delta: Vec2::ZERO,
        }
    }

    fn fingers(&self) -> &[TouchId] {
        &self.fingers
    }

    fn can_start(&mut self, frame: &Frame<'_>, config: &TwoFingerDragConfig) -> StartCheck {
        if frame.any_retained(&self.fingers) {
            return StartCheck::Cancel;
        }
        let Some((touch1, touch2)) = frame.find_pair(self.fingers) else {
            return StartCheck::Cancel;
        };

        // At least one finger must be moving.
        if !touch1.is_moving() && !touch2.is_moving() {
            return StartCheck::NotYet;
        }

        let travel1 = frame.pixels_to_inches((touch1.position - self.start_positions[0]).length());
        let travel2 = frame.pixels_to_inches((touch2.position - self.start_positions[1]).length());
        if travel1 < config.slop_inches || travel2 < config.slop_inches {
            return StartCheck::NotYet;
        }

        // Both fingers must move in the same direction.
        let dot = touch1
            .delta
            .normalize_or_zero()
            .dot(touch2.delta.normalize_or_zero());
        if dot < config.angle_threshold_degrees.to_radians().cos() {
            return StartCheck::NotYet;
        }
        StartCheck::Ready
    }

    fn on_start(&mut self, ctx: &mut StartContext<'_>) {
        ctx.lock(self.fingers[0]);
        ctx.lock(self.fingers[1]);
        ctx.resolve_target(&self.start_positions);

        if let (Some(touch1), Some(touch2)) = (ctx.find(self.fingers[0]), ctx.find(self.fingers[1]))
        {
            self.position = midpoint(touch1.position, touch2.position);
        }
    }

    fn update(&mut self, frame: &Frame<'_>, _config: &TwoFingerDragConfig) -> UpdateOutcome {
        let Some((touch1, touch2)) = frame.find_pair(self.fingers) else {
            return UpdateOutcome::Cancel;
        };
        if let Some(outcome) = pair_terminal_outcome(touch1, touch2) {
            return outcome;
        }
        if touch1.phase == TouchPhase::Moved || touch2.phase == TouchPhase::Moved {
            let position = midpoint(touch1.position, touch2.position);
            self.delta = position - self.position;
            self.position = position;
            return UpdateOutcome::Changed;
        }
        UpdateOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureEvent, NoHits, TargetId};
    use crate::gestures::testing::{began, inch_registry, moved, phase, still};
    use crate::recognizer::GestureRecognizer;
    use crate::touch::{LockOwner, TouchRegistry};

    type Events = Vec<GestureEvent<TwoFingerDragGesture>>;

    fn recognizer(slop: f32) -> GestureRecognizer<TwoFingerDragGesture> {
        GestureRecognizer::new(TwoFingerDragConfig {
            slop_inches: slop,
            angle_threshold_degrees: 30.0,
        })
    }

    fn step(
        rec: &mut GestureRecognizer<TwoFingerDragGesture>,
        reg: &mut TouchRegistry,
        touches: &[TouchPoint],
    ) -> Events {
        reg.refresh(touches).unwrap();
        rec.tick(reg, &NoHits, Instant::now())
    }

    /// Both fingers down, then `frames` frames of parallel motion of `speed`
    /// units per frame along +x.
    fn parallel_frames(frames: usize, speed: f32) -> Vec<Vec<TouchPoint>> {
        let mut out = vec![vec![began(1, 100.0, 100.0), began(2, 100.0, 300.0)]];
        for f in 1..=frames {
            let dx = speed * f as f32;
            out.push(vec![
                moved(1, 100.0 + dx, 100.0, speed, 0.0),
                moved(2, 100.0 + dx, 300.0, speed, 0.0),
            ]);
        }
        out
    }

    #[test]
    fn starts_on_first_frame_past_slop() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        let frames = parallel_frames(2, 10.0);

        assert!(step(&mut rec, &mut reg, &frames[0]).is_empty());
        assert_eq!(rec.active_count(), 1);

        let events = step(&mut rec, &mut reg, &frames[1]);
        assert_eq!(events.len(), 1);
        let GestureEvent::Started { gesture, .. } = &events[0] else {
            panic!("expected Started, got {events:?}");
        };
        assert_eq!(gesture.position(), Vec2::new(110.0, 200.0));
        assert!(reg.is_retained(TouchId(1)));
        assert!(reg.is_retained(TouchId(2)));
    }

    #[test]
    fn does_not_start_before_both_fingers_pass_slop() {
        let mut reg = inch_registry();
        let mut rec = recognizer(15.0);
        let frames = parallel_frames(2, 10.0);

        step(&mut rec, &mut reg, &frames[0]);
        assert!(step(&mut rec, &mut reg, &frames[1]).is_empty());
        let events = step(&mut rec, &mut reg, &frames[2]);
        assert!(matches!(events[..], [GestureEvent::Started { .. }]));
    }

    #[test]
    fn one_finger_short_of_slop_waits() {
        let mut reg = inch_registry();
        let mut rec = recognizer(5.0);

        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0), began(2, 100.0, 300.0)]);
        // Finger 2 moves in the same direction but only 2 units from its start.
        let events = step(
            &mut rec,
            &mut reg,
            &[
                moved(1, 110.0, 100.0, 10.0, 0.0),
                moved(2, 102.0, 300.0, 2.0, 0.0),
            ],
        );
        assert!(events.is_empty());
        assert_eq!(rec.active_count(), 1);
    }

    #[test]
    fn opposite_directions_never_start() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);

        step(&mut rec, &mut reg, &[began(1, 500.0, 100.0), began(2, 500.0, 300.0)]);
        for f in 1..=30 {
            let d = 10.0 * f as f32;
            let events = step(
                &mut rec,
                &mut reg,
                &[
                    moved(1, 500.0 + d, 100.0, 10.0, 0.0),
                    moved(2, 500.0 - d, 300.0, -10.0, 0.0),
                ],
            );
            assert!(events.is_empty(), "started at frame {f}");
        }
        assert_eq!(reg.retained_count(), 0);
    }

    #[test]
    fn one_stationary_finger_never_starts() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);

        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0), began(2, 100.0, 300.0)]);
        step(
            &mut rec,
            &mut reg,
            &[moved(1, 110.0, 100.0, 10.0, 0.0), moved(2, 110.0, 300.0, 10.0, 0.0)],
        );
        assert_eq!(reg.retained_count(), 2);

        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0), began(2, 100.0, 300.0)]);
        for f in 1..=5 {
            let x = 100.0 + 10.0 * f as f32;
            let events = step(
                &mut rec,
                &mut reg,
                &[moved(1, x, 100.0, 10.0, 0.0), still(2, 100.0, 300.0)],
            );
            assert!(events.is_empty());
        }
    }

    fn started(rec: &mut GestureRecognizer<TwoFingerDragGesture>, reg: &mut TouchRegistry) {
        let frames = parallel_frames(1, 10.0);
        step(rec, reg, &frames[0]);
        let events = step(rec, reg, &frames[1]);
        assert!(matches!(events[..], [GestureEvent::Started { .. }]));
    }

    #[test]
    fn update_reports_midpoint_delta() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        started(&mut rec, &mut reg);

        let events = step(
            &mut rec,
            &mut reg,
            &[moved(1, 114.0, 100.0, 4.0, 0.0), moved(2, 116.0, 300.0, 6.0, 0.0)],
        );
        let [GestureEvent::Updated { gesture, .. }] = &events[..] else {
            panic!("expected one Updated, got {events:?}");
        };
        assert_eq!(gesture.delta(), Vec2::new(5.0, 0.0));
        assert_eq!(gesture.position(), Vec2::new(115.0, 200.0));
    }

    #[test]
    fn stationary_frame_reports_nothing() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        started(&mut rec, &mut reg);

        let events = step(&mut rec, &mut reg, &[still(1, 110.0, 100.0), still(2, 110.0, 300.0)]);
        assert!(events.is_empty());
        assert_eq!(rec.active_count(), 1);
    }

    #[test]
    fn one_finger_ended_completes_without_update() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        started(&mut rec, &mut reg);

        let events = step(
            &mut rec,
            &mut reg,
            &[
                phase(1, 120.0, 100.0, TouchPhase::Ended),
                moved(2, 120.0, 300.0, 10.0, 0.0),
            ],
        );
        let [GestureEvent::Completed { gesture, .. }] = &events[..] else {
            panic!("expected one Completed, got {events:?}");
        };
        // Position from the start frame, no further update.
        assert_eq!(gesture.position(), Vec2::new(110.0, 200.0));
        assert_eq!(reg.retained_count(), 0);
        assert_eq!(rec.active_count(), 0);
    }

    #[test]
    fn cancelled_phase_cancels() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        started(&mut rec, &mut reg);

        let events = step(
            &mut rec,
            &mut reg,
            &[
                phase(1, 110.0, 100.0, TouchPhase::Ended),
                phase(2, 110.0, 300.0, TouchPhase::Cancelled),
            ],
        );
        assert!(matches!(events[..], [GestureEvent::Cancelled { .. }]));
        assert_eq!(reg.retained_count(), 0);
    }

    #[test]
    fn vanished_touch_cancels_and_frees_both() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        started(&mut rec, &mut reg);

        let events = step(&mut rec, &mut reg, &[moved(2, 120.0, 300.0, 10.0, 0.0)]);
        assert!(matches!(events[..], [GestureEvent::Cancelled { .. }]));
        assert!(!reg.is_retained(TouchId(1)));
        assert!(!reg.is_retained(TouchId(2)));

        // Another gesture can take the survivors right away.
        let owner = LockOwner {
            kind: GestureKinds::DRAG,
            gesture: crate::gesture::GestureId(0),
        };
        let lock = reg.retain(TouchId(2), owner);
        reg.release(lock);
    }

    #[test]
    fn retained_finger_cancels_candidate() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        step(&mut rec, &mut reg, &[began(1, 100.0, 100.0), began(2, 100.0, 300.0)]);

        let owner = LockOwner {
            kind: GestureKinds::PINCH,
            gesture: crate::gesture::GestureId(0),
        };
        let lock = reg.retain(TouchId(2), owner);
        let frames = parallel_frames(1, 10.0);
        assert!(step(&mut rec, &mut reg, &frames[1]).is_empty());
        assert_eq!(rec.active_count(), 0);
        reg.release(lock);
    }

    #[test]
    fn competing_pairs_first_created_wins() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);

        step(
            &mut rec,
            &mut reg,
            &[began(1, 100.0, 100.0), began(2, 100.0, 300.0), began(3, 100.0, 500.0)],
        );
        assert_eq!(rec.active_count(), 3);

        let events = step(
            &mut rec,
            &mut reg,
            &[
                moved(1, 110.0, 100.0, 10.0, 0.0),
                moved(2, 110.0, 300.0, 10.0, 0.0),
                moved(3, 110.0, 500.0, 10.0, 0.0),
            ],
        );
        let [GestureEvent::Started { gesture, .. }] = &events[..] else {
            panic!("expected one Started, got {events:?}");
        };
        assert_eq!(gesture.fingers(), &[TouchId(1), TouchId(2)]);
        assert_eq!(rec.active_count(), 1);
        assert!(!reg.is_retained(TouchId(3)));
    }

    #[test]
    fn target_from_second_finger_when_first_misses() {
        let mut reg = inch_registry();
        let mut rec = recognizer(0.5);
        let frames = parallel_frames(1, 10.0);
        let hit = |pos: Vec2| (pos.y > 200.0).then_some(TargetId(8));

        reg.refresh(&frames[0]).unwrap();
        rec.tick(&mut reg, &hit, Instant::now());
        reg.refresh(&frames[1]).unwrap();
        let events = rec.tick(&mut reg, &hit, Instant::now());
        assert!(matches!(
            events[..],
            [GestureEvent::Started {
                target: Some(TargetId(8)),
                ..
            }]
        ));
    }
}
