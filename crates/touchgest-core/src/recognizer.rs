#![forbid(unsafe_code)]

//! Per-kind gesture recognizer.
//!
//! [`GestureRecognizer`] scans the touch snapshot each frame, creates pending
//! candidates from free touches, advances every live gesture once, and retires
//! the ones that finished.
//!
//! # Tick order
//!
//! 1. **Candidates.** One-finger kinds get one candidate per touch that began
//!    this frame. Two-finger kinds pair each touch that began with every other
//!    free touch; when both touches of a pair began in the same frame the pair
//!    is created once, from the touch that comes first in snapshot order.
//!    Touches that are retained or inside the screen-edge band are skipped, and
//!    so is a finger set this recognizer already tracks.
//! 2. **Hooks.** Each gesture gets exactly one hook call, in creation order.
//! 3. **Retire.** Finished gestures are dropped after their events are queued.
//!
//! # Invariants
//!
//! 1. Candidate creation does not guard against other recognizers: retention
//!    is re-checked in `can_start`, so the first gesture to validate wins.
//! 2. Gesture ids increase monotonically and are never reused.

use web_time::Instant;

use crate::config::ValidateConfig;
use crate::error::ConfigError;
use crate::gesture::{Arity, Gesture, GestureEvent, GestureId, GestureKind, HitTest};
use crate::touch::{TouchId, TouchPhase, TouchPoint, TouchRegistry};

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

/// Creates, advances, and retires gestures of one kind.
pub struct GestureRecognizer<K: GestureKind> {
    config: K::Config,
    gestures: Vec<Gesture<K>>,
    next_id: u64,
}

impl<K: GestureKind> std::fmt::Debug for GestureRecognizer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("kind", &K::KIND)
            .field("active", &self.gestures.len())
            .finish()
    }
}

impl<K: GestureKind> Default for GestureRecognizer<K> {
    fn default() -> Self {
        Self::new(K::Config::default())
    }
}

impl<K: GestureKind> GestureRecognizer<K> {
    /// Create a recognizer with the given thresholds.
    ///
    /// Thresholds are not validated; use [`try_new`](Self::try_new) for
    /// configuration that comes from outside the program.
    #[must_use]
    pub fn new(config: K::Config) -> Self {
        Self {
            config,
            gestures: Vec::new(),
            next_id: 0,
        }
    }

    /// Create a recognizer after validating the thresholds.
    pub fn try_new(config: K::Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Run one frame. Call after the registry was refreshed.
    pub fn tick(
        &mut self,
        registry: &mut TouchRegistry,
        hit_test: &dyn HitTest,
        now: Instant,
    ) -> Vec<GestureEvent<K>> {
        self.create_candidates(registry, now);

        let mut events = Vec::new();
        for gesture in &mut self.gestures {
            gesture.advance(registry, hit_test, &self.config, now, &mut events);
        }
        self.gestures.retain(|g| !g.state().is_terminal());
        events
    }

    /// Cancel every live gesture, releasing their touches.
    pub fn reset(&mut self, registry: &mut TouchRegistry) -> Vec<GestureEvent<K>> {
        let mut events = Vec::new();
        for gesture in &mut self.gestures {
            gesture.cancel(registry, &mut events);
        }
        self.gestures.clear();
        events
    }

    /// Number of pending or started gestures.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.gestures.len()
    }

    /// Live gestures in creation order.
    pub fn gestures(&self) -> impl Iterator<Item = &Gesture<K>> + '_ {
        self.gestures.iter()
    }

    /// Whether a live gesture is made of exactly these fingers (in any order).
    #[must_use]
    pub fn is_tracking(&self, fingers: &[TouchId]) -> bool {
        self.gestures.iter().any(|g| {
            let own = g.data().fingers();
            own.len() == fingers.len() && fingers.iter().all(|f| own.contains(f))
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &K::Config {
        &self.config
    }

    fn create_candidates(&mut self, registry: &TouchRegistry, now: Instant) {
        let touches = registry.touches();
        let eligible =
            |t: &TouchPoint| !registry.is_retained(t.id) && !registry.is_off_screen_edge(t);

        match K::ARITY {
            Arity::One => {
                for touch in touches {
                    if touch.phase == TouchPhase::Began && eligible(touch) {
                        self.add_candidate(&[*touch], now);
                    }
                }
            }
            Arity::Two => {
                if touches.len() < 2 {
                    return;
                }
                for (i, touch) in touches.iter().enumerate() {
                    if touch.phase != TouchPhase::Began || !eligible(touch) {
                        continue;
                    }
                    for (j, other) in touches.iter().enumerate() {
                        if j == i {
                            continue;
                        }
                        // Already paired from `other`'s side.
                        if j < i && other.phase == TouchPhase::Began {
                            continue;
                        }
                        if !eligible(other) {
                            continue;
                        }
                        self.add_candidate(&[*touch, *other], now);
                    }
                }
            }
        }
    }

    fn add_candidate(&mut self, touches: &[TouchPoint], now: Instant) {
        debug_assert_eq!(touches.len(), K::ARITY.count());
        let fingers: Vec<TouchId> = touches.iter().map(|t| t.id).collect();
        if self.is_tracking(&fingers) {
            return;
        }
        let id = GestureId(self.next_id);
        self.next_id += 1;
        trace!(gesture = %id, kind = ?K::KIND, fingers = ?fingers, "candidate created");
        self.gestures.push(Gesture::new(id, K::begin(touches, now)));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
