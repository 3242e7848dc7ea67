#![no_main]

use arbitrary::Arbitrary;
use glam::Vec2;
use libfuzzer_sys::fuzz_target;
use touchgest_core::{
    GestureKinds, GestureSystem, TargetId, TouchId, TouchPhase, TouchPoint,
};
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
struct FuzzTouch {
    id: u8,
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    phase: u8,
}

#[derive(Debug, Arbitrary)]
enum Step {
    Frame { touches: Vec<FuzzTouch>, advance_ms: u16 },
    Enable(u8),
    Reset,
}

fn phase(byte: u8) -> TouchPhase {
    match byte % 5 {
        0 => TouchPhase::Began,
        1 => TouchPhase::Moved,
        2 => TouchPhase::Stationary,
        3 => TouchPhase::Ended,
        _ => TouchPhase::Cancelled,
    }
}

// Arbitrary frames: phases need not be consistent across frames, ids may
// repeat, and positions may be non-finite. None of it may panic.
fuzz_target!(|steps: Vec<Step>| {
    let mut system = GestureSystem::new();
    let hit = |pos: Vec2| (pos.x < 540.0).then_some(TargetId(1));
    let mut now = Instant::now();

    for step in steps.into_iter().take(256) {
        match step {
            Step::Frame { touches, advance_ms } => {
                now += Duration::from_millis(u64::from(advance_ms));
                let touches: Vec<TouchPoint> = touches
                    .into_iter()
                    .take(10)
                    .map(|t| {
                        TouchPoint::new(
                            TouchId(u64::from(t.id % 12)),
                            Vec2::new(t.x, t.y),
                            Vec2::new(t.dx, t.dy),
                            phase(t.phase),
                        )
                    })
                    .collect();
                let _ = system.frame(&touches, &hit, now);
            }
            Step::Enable(bits) => {
                let _ = system.set_enabled(GestureKinds::from_bits_truncate(bits));
            }
            Step::Reset => {
                let _ = system.reset();
                assert_eq!(system.active_count(), 0);
            }
        }

        // Post-conditions that must always hold:
        let registry = system.registry();
        let retained_in_snapshot = registry
            .touches()
            .iter()
            .filter(|t| registry.is_retained(t.id))
            .count();
        assert_eq!(
            retained_in_snapshot,
            registry.retained_count(),
            "retained touch missing from snapshot"
        );
    }
});
