#![forbid(unsafe_code)]

//! Gesture lifecycle: one in-progress or finished gesture instance.
//!
//! A [`Gesture`] wraps the data of one concrete gesture kind (anything
//! implementing [`GestureKind`]) and drives it through a fixed state machine:
//!
//! ```text
//!             can_start: Ready            update: Complete
//!   Pending ───────────────────▶ Started ─────────────────▶ Completed
//!      │                            │
//!      │ can_start: Cancel          │ update: Cancel
//!      ▼                            ▼
//!   Cancelled ◀─────────────────────┘
//! ```
//!
//! The kind supplies the hooks; the wrapper owns the state, the target, and
//! the [`TouchLock`]s taken during `on_start`.
//!
//! # Invariants
//!
//! 1. A terminal transition happens at most once; `cancel` and `complete` on a
//!    finished gesture are no-ops.
//! 2. Every terminal transition releases every lock the gesture holds before
//!    it returns, whether the gesture completed or was cancelled.
//! 3. `Completed` / `Cancelled` notifications are only produced for gestures
//!    that produced `Started`. Candidates that never start die silently.
//! 4. A gesture that starts during a tick is not also updated in that tick.

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use web_time::Instant;

use crate::config::ValidateConfig;
use crate::touch::{LockOwner, TouchId, TouchLock, TouchPoint, TouchRegistry};

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

bitflags! {
    /// Set of gesture kinds, used to tag events and locks and to enable
    /// recognizers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct GestureKinds: u8 {
        const TWO_FINGER_DRAG = 1 << 0;
        const PINCH           = 1 << 1;
        const TWIST           = 1 << 2;
        const DRAG            = 1 << 3;
        const TAP             = 1 << 4;
    }
}

impl Default for GestureKinds {
    fn default() -> Self {
        Self::all()
    }
}

/// Identifier of a gesture, unique within its recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(pub u64);

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Identifier of the interactable scene object a gesture acts upon.
///
/// The host maps its own objects to these; the core never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u64);

// ---------------------------------------------------------------------------
// Hit testing
// ---------------------------------------------------------------------------

/// Ray test from the viewpoint through a screen position.
///
/// Implementations return the interactable object hit, if any. Resolving a
/// collider to its interactable parent is the host's job.
pub trait HitTest {
    fn raycast(&self, screen: Vec2) -> Option<TargetId>;
}

impl<F> HitTest for F
where
    F: Fn(Vec2) -> Option<TargetId>,
{
    fn raycast(&self, screen: Vec2) -> Option<TargetId> {
        self(screen)
    }
}

/// Hit test for hosts without a scene: never hits anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHits;

impl HitTest for NoHits {
    fn raycast(&self, _screen: Vec2) -> Option<TargetId> {
        None
    }
}

// ---------------------------------------------------------------------------
// Hook protocol
// ---------------------------------------------------------------------------

/// Lifecycle state of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Created from free touches, waiting for its start condition.
    Pending,
    /// Start condition met; touches locked; polled every frame.
    Started,
    /// Ended normally.
    Completed,
    /// Ended because touch data became unusable.
    Cancelled,
}

impl GestureState {
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Result of a start check on a pending gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCheck {
    /// Start now.
    Ready,
    /// Thresholds not met yet; retry next frame.
    NotYet,
    /// A required touch is gone or taken; give up.
    Cancel,
}

/// Result of a per-frame update on a started gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing changed this frame.
    Unchanged,
    /// Position or another tracked value changed.
    Changed,
    /// A required touch ended.
    Complete,
    /// A required touch is gone or was cancelled.
    Cancel,
}

/// Number of touches a gesture kind is created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Two,
}

impl Arity {
    #[inline]
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Read-only view of the current frame handed to `can_start` and `update`.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub registry: &'a TouchRegistry,
    pub now: Instant,
}

impl<'a> Frame<'a> {
    /// Look up a touch in this frame's snapshot.
    #[inline]
    #[must_use]
    pub fn find(&self, id: TouchId) -> Option<&'a TouchPoint> {
        self.registry.find(id)
    }

    /// Look up both touches of a pair; `None` if either is missing.
    #[must_use]
    pub fn find_pair(&self, ids: [TouchId; 2]) -> Option<(&'a TouchPoint, &'a TouchPoint)> {
        let first = self.registry.find(ids[0]);
        let second = self.registry.find(ids[1]);
        first.zip(second)
    }

    /// Whether any of the given touches is retained.
    #[must_use]
    pub fn any_retained(&self, ids: &[TouchId]) -> bool {
        ids.iter().any(|&id| self.registry.is_retained(id))
    }

    /// Convert a pixel distance to inches.
    #[inline]
    #[must_use]
    pub fn pixels_to_inches(&self, pixels: f32) -> f32 {
        self.registry.pixels_to_inches(pixels)
    }
}

/// Mutable access handed to `on_start`: lock touches and resolve the target.
pub struct StartContext<'a> {
    registry: &'a mut TouchRegistry,
    hit_test: &'a dyn HitTest,
    owner: LockOwner,
    locks: &'a mut Vec<TouchLock>,
    target: &'a mut Option<TargetId>,
}

impl StartContext<'_> {
    /// Retain a touch for this gesture until it finishes.
    ///
    /// # Panics
    ///
    /// Panics if the touch is already retained (see
    /// [`TouchRegistry::retain`]).
    pub fn lock(&mut self, id: TouchId) {
        let lock = self.registry.retain(id, self.owner);
        self.locks.push(lock);
    }

    /// Look up a touch in the current snapshot.
    #[must_use]
    pub fn find(&self, id: TouchId) -> Option<&TouchPoint> {
        self.registry.find(id)
    }

    /// Convert a pixel distance to inches.
    #[inline]
    #[must_use]
    pub fn pixels_to_inches(&self, pixels: f32) -> f32 {
        self.registry.pixels_to_inches(pixels)
    }

    /// Ray test through a screen position.
    #[must_use]
    pub fn raycast(&self, screen: Vec2) -> Option<TargetId> {
        self.hit_test.raycast(screen)
    }

    /// Ray test each position in turn; the first hit becomes the target.
    pub fn resolve_target(&mut self, positions: &[Vec2]) {
        *self.target = positions
            .iter()
            .find_map(|&pos| self.hit_test.raycast(pos));
    }

    /// Set the target explicitly.
    pub fn set_target(&mut self, target: Option<TargetId>) {
        *self.target = target;
    }
}

/// Capability interface implemented by every concrete gesture kind.
///
/// The recognizer creates kinds from free touches with [`begin`], then calls
/// exactly one of [`can_start`] (while pending) or [`update`] (once started)
/// per frame. Releasing locks is not the kind's job: the wrapping [`Gesture`]
/// releases them on every terminal transition.
///
/// [`begin`]: GestureKind::begin
/// [`can_start`]: GestureKind::can_start
/// [`update`]: GestureKind::update
pub trait GestureKind: Clone + fmt::Debug {
    /// Thresholds shared by every gesture of this kind.
    type Config: ValidateConfig + Clone + fmt::Debug + Default;

    /// Tag for events and locks. Exactly one flag.
    const KIND: GestureKinds;

    /// Number of touches this kind is created from.
    const ARITY: Arity;

    /// Build a candidate from `ARITY` touches that began this frame (or are
    /// paired with one that did).
    fn begin(touches: &[TouchPoint], now: Instant) -> Self;

    /// Touch identifiers this gesture is made of.
    fn fingers(&self) -> &[TouchId];

    /// Decide whether a pending gesture may start.
    fn can_start(&mut self, frame: &Frame<'_>, config: &Self::Config) -> StartCheck;

    /// One-time setup when the gesture starts.
    fn on_start(&mut self, ctx: &mut StartContext<'_>);

    /// Recompute tracked values from live touch data.
    fn update(&mut self, frame: &Frame<'_>, config: &Self::Config) -> UpdateOutcome;

    /// Hook run before `on_finish` when the gesture is cancelled.
    fn on_cancel(&mut self) {}

    /// Hook run on every terminal transition.
    fn on_finish(&mut self) {}
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Lifecycle notification for one gesture.
///
/// Each variant carries a snapshot of the gesture data at the time of the
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent<K> {
    Started {
        id: GestureId,
        target: Option<TargetId>,
        gesture: K,
    },
    Updated {
        id: GestureId,
        gesture: K,
    },
    Completed {
        id: GestureId,
        gesture: K,
    },
    Cancelled {
        id: GestureId,
        gesture: K,
    },
}

impl<K> GestureEvent<K> {
    /// The gesture this event is about.
    #[must_use]
    pub fn id(&self) -> GestureId {
        match self {
            Self::Started { id, .. }
            | Self::Updated { id, .. }
            | Self::Completed { id, .. }
            | Self::Cancelled { id, .. } => *id,
        }
    }

    /// Snapshot of the gesture data.
    #[must_use]
    pub fn gesture(&self) -> &K {
        match self {
            Self::Started { gesture, .. }
            | Self::Updated { gesture, .. }
            | Self::Completed { gesture, .. }
            | Self::Cancelled { gesture, .. } => gesture,
        }
    }

    /// Whether this is the last event for the gesture.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Cancelled { .. })
    }
}

// ---------------------------------------------------------------------------
// Gesture
// ---------------------------------------------------------------------------

/// One gesture instance and its lifecycle.
#[derive(Debug)]
pub struct Gesture<K: GestureKind> {
    id: GestureId,
    state: GestureState,
    target: Option<TargetId>,
    locks: Vec<TouchLock>,
    kind: K,
}

impl<K: GestureKind> Gesture<K> {
    /// Wrap candidate data as a pending gesture.
    #[must_use]
    pub fn new(id: GestureId, kind: K) -> Self {
        Self {
            id,
            state: GestureState::Pending,
            target: None,
            locks: Vec::with_capacity(K::ARITY.count()),
            kind,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> GestureId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Interactable resolved when the gesture started.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    /// The kind-specific data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &K {
        &self.kind
    }

    /// Touches currently locked by this gesture.
    pub fn locked_touches(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.locks.iter().map(TouchLock::id)
    }

    fn owner(&self) -> LockOwner {
        LockOwner {
            kind: K::KIND,
            gesture: self.id,
        }
    }

    /// Run this frame's hook: `can_start` while pending, `update` once started.
    pub fn advance(
        &mut self,
        registry: &mut TouchRegistry,
        hit_test: &dyn HitTest,
        config: &K::Config,
        now: Instant,
        out: &mut Vec<GestureEvent<K>>,
    ) {
        match self.state {
            GestureState::Pending => {
                let check = {
                    let frame = Frame {
                        registry: &*registry,
                        now,
                    };
                    self.kind.can_start(&frame, config)
                };
                match check {
                    StartCheck::Ready => self.start(registry, hit_test, out),
                    StartCheck::NotYet => {}
                    StartCheck::Cancel => self.cancel(registry, out),
                }
            }
            GestureState::Started => {
                let outcome = {
                    let frame = Frame {
                        registry: &*registry,
                        now,
                    };
                    self.kind.update(&frame, config)
                };
                match outcome {
                    UpdateOutcome::Unchanged => {}
                    UpdateOutcome::Changed => out.push(GestureEvent::Updated {
                        id: self.id,
                        gesture: self.kind.clone(),
                    }),
                    UpdateOutcome::Complete => self.complete(registry, out),
                    UpdateOutcome::Cancel => self.cancel(registry, out),
                }
            }
            GestureState::Completed | GestureState::Cancelled => {}
        }
    }

    fn start(
        &mut self,
        registry: &mut TouchRegistry,
        hit_test: &dyn HitTest,
        out: &mut Vec<GestureEvent<K>>,
    ) {
        let owner = self.owner();
        let mut ctx = StartContext {
            registry,
            hit_test,
            owner,
            locks: &mut self.locks,
            target: &mut self.target,
        };
        self.kind.on_start(&mut ctx);
        self.state = GestureState::Started;
        debug!(
            gesture = %self.id,
            kind = ?K::KIND,
            target = ?self.target,
            "gesture started"
        );
        out.push(GestureEvent::Started {
            id: self.id,
            target: self.target,
            gesture: self.kind.clone(),
        });
    }

    /// Cancel the gesture. No-op if it already finished.
    pub fn cancel(&mut self, registry: &mut TouchRegistry, out: &mut Vec<GestureEvent<K>>) {
        self.finish(GestureState::Cancelled, registry, out);
    }

    /// Complete the gesture. No-op if it already finished.
    pub fn complete(&mut self, registry: &mut TouchRegistry, out: &mut Vec<GestureEvent<K>>) {
        self.finish(GestureState::Completed, registry, out);
    }

    fn finish(
        &mut self,
        terminal: GestureState,
        registry: &mut TouchRegistry,
        out: &mut Vec<GestureEvent<K>>,
    ) {
        debug_assert!(terminal.is_terminal());
        if self.state.is_terminal() {
            return;
        }
        let was_started = self.state == GestureState::Started;
        self.state = terminal;

        if terminal == GestureState::Cancelled {
            self.kind.on_cancel();
        }
        self.kind.on_finish();
        for lock in self.locks.drain(..) {
            registry.release(lock);
        }

        if !was_started {
            trace!(gesture = %self.id, kind = ?K::KIND, "candidate dropped");
            return;
        }
        debug!(
            gesture = %self.id,
            kind = ?K::KIND,
            outcome = ?terminal,
            "gesture finished"
        );
        let id = self.id;
        let gesture = self.kind.clone();
        out.push(match terminal {
            GestureState::Completed => GestureEvent::Completed { id, gesture },
            _ => GestureEvent::Cancelled { id, gesture },
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidateConfig;
    use crate::error::ConfigError;
    use crate::touch::TouchPhase;

    #[derive(Debug, Clone, Default)]
    struct HoldConfig;

    impl ValidateConfig for HoldConfig {
        fn validate(&self) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    /// Starts as soon as its touch moves; ends with the touch.
    #[derive(Debug, Clone, PartialEq)]
    struct Hold {
        finger: TouchId,
        start: Vec2,
        cancels: u32,
        finishes: u32,
    }

    impl GestureKind for Hold {
        type Config = HoldConfig;
        const KIND: GestureKinds = GestureKinds::DRAG;
        const ARITY: Arity = Arity::One;

        fn begin(touches: &[TouchPoint], _now: Instant) -> Self {
            Self {
                finger: touches[0].id,
                start: touches[0].position,
                cancels: 0,
                finishes: 0,
            }
        }

        fn fingers(&self) -> &[TouchId] {
            std::slice::from_ref(&self.finger)
        }

        fn can_start(&mut self, frame: &Frame<'_>, _config: &HoldConfig) -> StartCheck {
            if frame.any_retained(self.fingers()) {
                return StartCheck::Cancel;
            }
            match frame.find(self.finger) {
                None => StartCheck::Cancel,
                Some(t) if t.is_moving() => StartCheck::Ready,
                Some(_) => StartCheck::NotYet,
            }
        }

        fn on_start(&mut self, ctx: &mut StartContext<'_>) {
            ctx.lock(self.finger);
            ctx.resolve_target(&[self.start]);
        }

        fn update(&mut self, frame: &Frame<'_>, _config: &HoldConfig) -> UpdateOutcome {
            match frame.find(self.finger).map(|t| t.phase) {
                None | Some(TouchPhase::Cancelled) => UpdateOutcome::Cancel,
                Some(TouchPhase::Ended) => UpdateOutcome::Complete,
                Some(TouchPhase::Moved) => UpdateOutcome::Changed,
                Some(_) => UpdateOutcome::Unchanged,
            }
        }

        fn on_cancel(&mut self) {
            self.cancels += 1;
        }

        fn on_finish(&mut self) {
            self.finishes += 1;
        }
    }

    fn moved(id: u64, x: f32, dx: f32) -> TouchPoint {
        TouchPoint::new(
            TouchId(id),
            Vec2::new(x, 100.0),
            Vec2::new(dx, 0.0),
            TouchPhase::Moved,
        )
    }

    fn started_gesture(reg: &mut TouchRegistry) -> Gesture<Hold> {
        let now = Instant::now();
        let began = TouchPoint::began(TouchId(1), Vec2::new(100.0, 100.0));
        reg.refresh(&[began]).unwrap();
        let mut g = Gesture::new(GestureId(0), Hold::begin(&[began], now));
        let mut out = Vec::new();
        g.advance(reg, &NoHits, &HoldConfig, now, &mut out);
        assert_eq!(g.state(), GestureState::Pending);
        assert!(out.is_empty());

        reg.refresh(&[moved(1, 110.0, 10.0)]).unwrap();
        g.advance(reg, &NoHits, &HoldConfig, now, &mut out);
        assert_eq!(g.state(), GestureState::Started);
        assert!(matches!(out[..], [GestureEvent::Started { .. }]));
        g
    }

    #[test]
    fn start_locks_touches() {
        let mut reg = TouchRegistry::default();
        let g = started_gesture(&mut reg);
        assert!(reg.is_retained(TouchId(1)));
        assert_eq!(g.locked_touches().collect::<Vec<_>>(), vec![TouchId(1)]);
        assert_eq!(
            reg.owner_of(TouchId(1)),
            Some(LockOwner {
                kind: GestureKinds::DRAG,
                gesture: GestureId(0)
            })
        );
    }

    #[test]
    fn started_gesture_is_not_updated_same_tick() {
        let mut reg = TouchRegistry::default();
        let _g = started_gesture(&mut reg);
        // started_gesture asserts exactly one Started event and no Updated.
    }

    #[test]
    fn complete_releases_and_is_idempotent() {
        let mut reg = TouchRegistry::default();
        let mut g = started_gesture(&mut reg);
        let mut out = Vec::new();

        g.complete(&mut reg, &mut out);
        assert_eq!(g.state(), GestureState::Completed);
        assert!(!reg.is_retained(TouchId(1)));
        assert_eq!(out.len(), 1);

        g.complete(&mut reg, &mut out);
        g.cancel(&mut reg, &mut out);
        assert_eq!(g.state(), GestureState::Completed);
        assert_eq!(out.len(), 1);
        assert_eq!(g.data().finishes, 1);
        assert_eq!(g.data().cancels, 0);
    }

    #[test]
    fn cancel_runs_both_hooks_once() {
        let mut reg = TouchRegistry::default();
        let mut g = started_gesture(&mut reg);
        let mut out = Vec::new();

        g.cancel(&mut reg, &mut out);
        g.cancel(&mut reg, &mut out);
        assert_eq!(g.state(), GestureState::Cancelled);
        assert_eq!(g.data().cancels, 1);
        assert_eq!(g.data().finishes, 1);
        assert_eq!(reg.retained_count(), 0);
        assert!(matches!(out[..], [GestureEvent::Cancelled { .. }]));
    }

    #[test]
    fn update_cancel_on_missing_touch() {
        let mut reg = TouchRegistry::default();
        let mut g = started_gesture(&mut reg);
        let mut out = Vec::new();

        reg.refresh(&[]).unwrap();
        g.advance(&mut reg, &NoHits, &HoldConfig, Instant::now(), &mut out);
        assert_eq!(g.state(), GestureState::Cancelled);
        assert_eq!(reg.retained_count(), 0);
        assert!(matches!(out[..], [GestureEvent::Cancelled { .. }]));
    }

    #[test]
    fn pending_cancel_is_silent() {
        let mut reg = TouchRegistry::default();
        let now = Instant::now();
        let began = TouchPoint::began(TouchId(1), Vec2::new(100.0, 100.0));
        let mut g = Gesture::new(GestureId(3), Hold::begin(&[began], now));
        reg.refresh(&[]).unwrap();

        let mut out = Vec::new();
        g.advance(&mut reg, &NoHits, &HoldConfig, now, &mut out);
        assert_eq!(g.state(), GestureState::Cancelled);
        assert!(out.is_empty());
        assert_eq!(g.data().finishes, 1);
    }

    #[test]
    fn target_resolved_from_hit_test() {
        let mut reg = TouchRegistry::default();
        let now = Instant::now();
        let began = TouchPoint::began(TouchId(1), Vec2::new(100.0, 100.0));
        reg.refresh(&[moved(1, 120.0, 20.0)]).unwrap();
        let mut g = Gesture::new(GestureId(0), Hold::begin(&[began], now));

        let hit = |pos: Vec2| (pos == Vec2::new(100.0, 100.0)).then_some(TargetId(42));
        let mut out = Vec::new();
        g.advance(&mut reg, &hit, &HoldConfig, now, &mut out);
        assert_eq!(g.target(), Some(TargetId(42)));
        assert!(matches!(
            out[..],
            [GestureEvent::Started {
                target: Some(TargetId(42)),
                ..
            }]
        ));
    }

    #[test]
    fn event_accessors() {
        let ev: GestureEvent<u8> = GestureEvent::Updated {
            id: GestureId(5),
            gesture: 9,
        };
        assert_eq!(ev.id(), GestureId(5));
        assert_eq!(*ev.gesture(), 9);
        assert!(!ev.is_terminal());
        let ev: GestureEvent<u8> = GestureEvent::Cancelled {
            id: GestureId(5),
            gesture: 9,
        };
        assert!(ev.is_terminal());
    }

    #[test]
    fn default_kinds_enable_everything() {
        assert_eq!(GestureKinds::default(), GestureKinds::all());
        assert_eq!(Arity::Two.count(), 2);
    }
}
