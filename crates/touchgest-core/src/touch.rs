#![forbid(unsafe_code)]

//! Touch snapshots and the registry of retained touches.
//!
//! The host engine hands the core one snapshot of [`TouchPoint`]s per frame.
//! [`TouchRegistry`] keeps that snapshot and records which touch identifiers
//! are *retained*, i.e. claimed by a gesture that has started.
//!
//! # Invariants
//!
//! 1. A touch identifier is retained by at most one gesture at a time.
//! 2. Retention is only granted through [`TouchRegistry::retain`], which hands
//!    out a [`TouchLock`]; it is only removed by presenting that lock to
//!    [`TouchRegistry::release`].
//! 3. A rejected snapshot (see [`SnapshotError`]) leaves the previous snapshot
//!    untouched.
//!
//! # Failure Modes
//!
//! - Retaining an identifier that is already retained panics. Gestures verify
//!   non-retention in `can_start` during the same synchronous step, so hitting
//!   the assertion means two gestures raced for one touch.

use std::fmt;

use ahash::AHashMap;
use glam::Vec2;

use crate::error::SnapshotError;
use crate::gesture::{GestureId, GestureKinds};

#[cfg(feature = "tracing")]
use crate::logging::{trace, warn};
#[cfg(not(feature = "tracing"))]
use crate::{trace, warn};

/// Width of the band along each screen edge where new touches are ignored.
pub const EDGE_THRESHOLD_INCHES: f32 = 0.1;

// ---------------------------------------------------------------------------
// Touch points
// ---------------------------------------------------------------------------

/// Identifier of one physical contact, stable until the contact is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TouchId(pub u64);

impl fmt::Display for TouchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of a touch within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TouchPhase {
    /// The finger touched the screen this frame.
    Began,
    /// The finger moved since the previous frame.
    Moved,
    /// The finger is down but did not move.
    Stationary,
    /// The finger was lifted this frame.
    Ended,
    /// The system cancelled tracking of this touch.
    Cancelled,
}

impl TouchPhase {
    /// Whether this is the last frame the touch will be reported.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// One touch contact as reported by the host for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchPoint {
    pub id: TouchId,
    /// Screen position in pixels.
    pub position: Vec2,
    /// Movement since the previous frame, in pixels.
    pub delta: Vec2,
    pub phase: TouchPhase,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: TouchId, position: Vec2, delta: Vec2, phase: TouchPhase) -> Self {
        Self {
            id,
            position,
            delta,
            phase,
        }
    }

    /// A touch that began this frame at `position`.
    #[must_use]
    pub const fn began(id: TouchId, position: Vec2) -> Self {
        Self::new(id, position, Vec2::ZERO, TouchPhase::Began)
    }

    /// Position reported by the previous frame.
    #[inline]
    #[must_use]
    pub fn previous_position(&self) -> Vec2 {
        self.position - self.delta
    }

    /// Whether the touch moved since the previous frame.
    #[inline]
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.delta != Vec2::ZERO
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite() && self.delta.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Screen metrics
// ---------------------------------------------------------------------------

/// Physical properties of the screen that converts pixels to inches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScreenMetrics {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Pixels per inch.
    pub dpi: f32,
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
            dpi: 160.0,
        }
    }
}

impl ScreenMetrics {
    /// Create screen metrics.
    #[must_use]
    pub const fn new(width: f32, height: f32, dpi: f32) -> Self {
        Self { width, height, dpi }
    }

    /// Convert a pixel distance to inches.
    #[inline]
    #[must_use]
    pub fn pixels_to_inches(&self, pixels: f32) -> f32 {
        pixels / self.dpi
    }

    /// Convert a distance in inches to pixels.
    #[inline]
    #[must_use]
    pub fn inches_to_pixels(&self, inches: f32) -> f32 {
        inches * self.dpi
    }

    /// Whether `position` lies within the edge band of the screen.
    #[must_use]
    pub fn is_off_screen_edge(&self, position: Vec2) -> bool {
        let slop = self.inches_to_pixels(EDGE_THRESHOLD_INCHES);
        position.x <= slop
            || position.y <= slop
            || position.x >= self.width - slop
            || position.y >= self.height - slop
    }
}

// ---------------------------------------------------------------------------
// Locks
// ---------------------------------------------------------------------------

/// The gesture holding a retained touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockOwner {
    pub kind: GestureKinds,
    pub gesture: GestureId,
}

impl fmt::Display for LockOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.kind, self.gesture)
    }
}

/// Proof that a touch identifier is retained.
///
/// Only [`TouchRegistry::retain`] creates one and only
/// [`TouchRegistry::release`] consumes one, so every retention is paired with
/// exactly one release.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a TouchLock must be handed back to TouchRegistry::release"]
pub struct TouchLock {
    id: TouchId,
    owner: LockOwner,
}

impl TouchLock {
    /// The retained touch.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TouchId {
        self.id
    }

    /// The gesture holding the lock.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> LockOwner {
        self.owner
    }
}

// ---------------------------------------------------------------------------
// TouchRegistry
// ---------------------------------------------------------------------------

/// Per-frame touch snapshot plus the set of retained touch identifiers.
#[derive(Debug, Default)]
pub struct TouchRegistry {
    metrics: ScreenMetrics,
    touches: Vec<TouchPoint>,
    index: AHashMap<TouchId, usize>,
    retained: AHashMap<TouchId, LockOwner>,
}

impl TouchRegistry {
    /// Create an empty registry for a screen.
    #[must_use]
    pub fn new(metrics: ScreenMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    /// Replace the touch snapshot with this frame's touches.
    ///
    /// Retained identifiers are kept across refreshes; gestures release them
    /// when they notice their touches are gone.
    pub fn refresh(&mut self, touches: &[TouchPoint]) -> Result<(), SnapshotError> {
        let mut index = AHashMap::with_capacity(touches.len());
        for (slot, touch) in touches.iter().enumerate() {
            if !touch.is_finite() {
                warn!(touch = %touch.id, "rejecting snapshot: non-finite position");
                return Err(SnapshotError::NonFinitePosition { id: touch.id });
            }
            if index.insert(touch.id, slot).is_some() {
                warn!(touch = %touch.id, "rejecting snapshot: duplicate touch id");
                return Err(SnapshotError::DuplicateTouch { id: touch.id });
            }
        }
        self.touches.clear();
        self.touches.extend_from_slice(touches);
        self.index = index;
        Ok(())
    }

    /// Look up a touch in the current snapshot.
    #[must_use]
    pub fn find(&self, id: TouchId) -> Option<&TouchPoint> {
        self.index.get(&id).map(|&slot| &self.touches[slot])
    }

    /// All touches of the current snapshot, in the order the host reported them.
    #[inline]
    #[must_use]
    pub fn touches(&self) -> &[TouchPoint] {
        &self.touches
    }

    /// Number of touches in the current snapshot.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.touches.len()
    }

    /// Whether the current snapshot is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    /// Whether a gesture currently holds this touch.
    #[inline]
    #[must_use]
    pub fn is_retained(&self, id: TouchId) -> bool {
        self.retained.contains_key(&id)
    }

    /// The gesture holding this touch, if any.
    #[must_use]
    pub fn owner_of(&self, id: TouchId) -> Option<LockOwner> {
        self.retained.get(&id).copied()
    }

    /// Number of retained touch identifiers.
    #[inline]
    #[must_use]
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    /// Claim a touch for `owner`.
    ///
    /// # Panics
    ///
    /// Panics if the touch is already retained. Callers must check
    /// [`is_retained`](Self::is_retained) in the same synchronous step.
    pub fn retain(&mut self, id: TouchId, owner: LockOwner) -> TouchLock {
        if let Some(holder) = self.retained.get(&id) {
            panic!("touch {id} retained by {owner} while already held by {holder}");
        }
        self.retained.insert(id, owner);
        trace!(touch = %id, owner = %owner, "touch retained");
        TouchLock { id, owner }
    }

    /// Give a claimed touch back.
    pub fn release(&mut self, lock: TouchLock) {
        let removed = self.retained.remove(&lock.id);
        debug_assert_eq!(
            removed,
            Some(lock.owner),
            "touch {} released by a gesture that did not hold it",
            lock.id
        );
        trace!(touch = %lock.id, owner = %lock.owner, "touch released");
    }

    /// Screen metrics used for unit conversion and edge rejection.
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &ScreenMetrics {
        &self.metrics
    }

    /// Update the screen metrics (e.g. after a rotation).
    pub fn set_metrics(&mut self, metrics: ScreenMetrics) {
        self.metrics = metrics;
    }

    /// Convert a pixel distance to inches for the current screen.
    #[inline]
    #[must_use]
    pub fn pixels_to_inches(&self, pixels: f32) -> f32 {
        self.metrics.pixels_to_inches(pixels)
    }

    /// Convert inches to pixels for the current screen.
    #[inline]
    #[must_use]
    pub fn inches_to_pixels(&self, inches: f32) -> f32 {
        self.metrics.inches_to_pixels(inches)
    }

    /// Whether the touch lies within the edge band of the screen.
    #[inline]
    #[must_use]
    pub fn is_off_screen_edge(&self, touch: &TouchPoint) -> bool {
        self.metrics.is_off_screen_edge(touch.position)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
