#![forbid(unsafe_code)]

//! One-call-per-frame driver for every gesture kind.
//!
//! [`GestureSystem`] owns the [`TouchRegistry`] and one recognizer per kind.
//! Each [`frame`](GestureSystem::frame) refreshes the registry and ticks the
//! enabled recognizers in a fixed order:
//!
//! 1. two-finger drag
//! 2. pinch
//! 3. twist
//! 4. drag
//! 5. tap
//!
//! When candidates of different kinds compete for the same touches and become
//! valid in the same frame, the earlier recognizer in this list wins because
//! it locks the touches first.

use web_time::Instant;

use crate::config::{GestureSystemConfig, ValidateConfig};
use crate::error::{ConfigError, SnapshotError};
use crate::gesture::{GestureEvent, GestureId, GestureKind, GestureKinds, HitTest};
use crate::gestures::{DragGesture, PinchGesture, TapGesture, TwistGesture, TwoFingerDragGesture};
use crate::recognizer::GestureRecognizer;
use crate::touch::{ScreenMetrics, TouchPoint, TouchRegistry};

#[cfg(feature = "tracing")]
use crate::logging::debug;
#[cfg(not(feature = "tracing"))]
use crate::debug;

/// A lifecycle event from any recognizer, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyGestureEvent {
    TwoFingerDrag(GestureEvent<TwoFingerDragGesture>),
    Pinch(GestureEvent<PinchGesture>),
    Twist(GestureEvent<TwistGesture>),
    Drag(GestureEvent<DragGesture>),
    Tap(GestureEvent<TapGesture>),
}

impl AnyGestureEvent {
    /// The kind that produced this event.
    #[must_use]
    pub fn kind(&self) -> GestureKinds {
        match self {
            Self::TwoFingerDrag(_) => GestureKinds::TWO_FINGER_DRAG,
            Self::Pinch(_) => GestureKinds::PINCH,
            Self::Twist(_) => GestureKinds::TWIST,
            Self::Drag(_) => GestureKinds::DRAG,
            Self::Tap(_) => GestureKinds::TAP,
        }
    }

    /// The gesture id within its kind.
    #[must_use]
    pub fn id(&self) -> GestureId {
        match self {
            Self::TwoFingerDrag(e) => e.id(),
            Self::Pinch(e) => e.id(),
            Self::Twist(e) => e.id(),
            Self::Drag(e) => e.id(),
            Self::Tap(e) => e.id(),
        }
    }

    /// Whether this is the last event of its gesture.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::TwoFingerDrag(e) => e.is_terminal(),
            Self::Pinch(e) => e.is_terminal(),
            Self::Twist(e) => e.is_terminal(),
            Self::Drag(e) => e.is_terminal(),
            Self::Tap(e) => e.is_terminal(),
        }
    }

    /// Short lifecycle label: `started`, `updated`, `completed`, `cancelled`.
    #[must_use]
    pub fn phase_name(&self) -> &'static str {
        fn name<K>(e: &GestureEvent<K>) -> &'static str {
            match e {
                GestureEvent::Started { .. } => "started",
                GestureEvent::Updated { .. } => "updated",
                GestureEvent::Completed { .. } => "completed",
                GestureEvent::Cancelled { .. } => "cancelled",
            }
        }
        match self {
            Self::TwoFingerDrag(e) => name(e),
            Self::Pinch(e) => name(e),
            Self::Twist(e) => name(e),
            Self::Drag(e) => name(e),
            Self::Tap(e) => name(e),
        }
    }
}

/// Registry plus one recognizer per gesture kind.
#[derive(Debug, Default)]
pub struct GestureSystem {
    registry: TouchRegistry,
    enabled: GestureKinds,
    two_finger_drag: GestureRecognizer<TwoFingerDragGesture>,
    pinch: GestureRecognizer<PinchGesture>,
    twist: GestureRecognizer<TwistGesture>,
    drag: GestureRecognizer<DragGesture>,
    tap: GestureRecognizer<TapGesture>,
}

impl GestureSystem {
    /// Create a system with default thresholds and every kind enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a system from a validated configuration.
    pub fn try_new(config: GestureSystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: TouchRegistry::new(config.screen),
            enabled: config.enabled,
            two_finger_drag: GestureRecognizer::new(config.two_finger_drag),
            pinch: GestureRecognizer::new(config.pinch),
            twist: GestureRecognizer::new(config.twist),
            drag: GestureRecognizer::new(config.drag),
            tap: GestureRecognizer::new(config.tap),
        })
    }

    /// Process one frame of touches.
    ///
    /// A rejected snapshot is reported and nothing is ticked; the previous
    /// snapshot stays in the registry.
    pub fn frame(
        &mut self,
        touches: &[TouchPoint],
        hit_test: &dyn HitTest,
        now: Instant,
    ) -> Result<Vec<AnyGestureEvent>, SnapshotError> {
        self.registry.refresh(touches)?;

        let mut events = Vec::new();
        let enabled = self.enabled;
        let registry = &mut self.registry;
        tick_into(
            &mut self.two_finger_drag,
            enabled,
            registry,
            hit_test,
            now,
            &mut events,
            AnyGestureEvent::TwoFingerDrag,
        );
        tick_into(
            &mut self.pinch,
            enabled,
            registry,
            hit_test,
            now,
            &mut events,
            AnyGestureEvent::Pinch,
        );
        tick_into(
            &mut self.twist,
            enabled,
            registry,
            hit_test,
            now,
            &mut events,
            AnyGestureEvent::Twist,
        );
        tick_into(
            &mut self.drag,
            enabled,
            registry,
            hit_test,
            now,
            &mut events,
            AnyGestureEvent::Drag,
        );
        tick_into(
            &mut self.tap,
            enabled,
            registry,
            hit_test,
            now,
            &mut events,
            AnyGestureEvent::Tap,
        );
        Ok(events)
    }

    /// Choose which recognizers run. Disabled recognizers are reset, and the
    /// resulting cancellations are returned.
    pub fn set_enabled(&mut self, enabled: GestureKinds) -> Vec<AnyGestureEvent> {
        let disabled = self.enabled - enabled;
        self.enabled = enabled;
        debug!(enabled = ?enabled, disabled = ?disabled, "recognizers toggled");
        self.reset_kinds(disabled)
    }

    /// Cancel every live gesture and release every touch.
    pub fn reset(&mut self) -> Vec<AnyGestureEvent> {
        self.reset_kinds(GestureKinds::all())
    }

    fn reset_kinds(&mut self, kinds: GestureKinds) -> Vec<AnyGestureEvent> {
        let mut events = Vec::new();
        let registry = &mut self.registry;
        reset_into(
            &mut self.two_finger_drag,
            kinds,
            registry,
            &mut events,
            AnyGestureEvent::TwoFingerDrag,
        );
        reset_into(
            &mut self.pinch,
            kinds,
            registry,
            &mut events,
            AnyGestureEvent::Pinch,
        );
        reset_into(
            &mut self.twist,
            kinds,
            registry,
            &mut events,
            AnyGestureEvent::Twist,
        );
        reset_into(
            &mut self.drag,
            kinds,
            registry,
            &mut events,
            AnyGestureEvent::Drag,
        );
        reset_into(
            &mut self.tap,
            kinds,
            registry,
            &mut events,
            AnyGestureEvent::Tap,
        );
        events
    }

    /// Enabled recognizers.
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> GestureKinds {
        self.enabled
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TouchRegistry {
        &self.registry
    }

    /// Update screen metrics, e.g. after a rotation.
    pub fn set_screen_metrics(&mut self, metrics: ScreenMetrics) -> Result<(), ConfigError> {
        metrics.validate()?;
        self.registry.set_metrics(metrics);
        Ok(())
    }

    /// Live gestures across all recognizers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.two_finger_drag.active_count()
            + self.pinch.active_count()
            + self.twist.active_count()
            + self.drag.active_count()
            + self.tap.active_count()
    }

    #[must_use]
    pub fn two_finger_drag(&self) -> &GestureRecognizer<TwoFingerDragGesture> {
        &self.two_finger_drag
    }

    #[must_use]
    pub fn pinch(&self) -> &GestureRecognizer<PinchGesture> {
        &self.pinch
    }

    #[must_use]
    pub fn twist(&self) -> &GestureRecognizer<TwistGesture> {
        &self.twist
    }

    #[must_use]
    pub fn drag(&self) -> &GestureRecognizer<DragGesture> {
        &self.drag
    }

    #[must_use]
    pub fn tap(&self) -> &GestureRecognizer<TapGesture> {
        &self.tap
    }
}

fn tick_into<K: GestureKind>(
    recognizer: &mut GestureRecognizer<K>,
    enabled: GestureKinds,
    registry: &mut TouchRegistry,
    hit_test: &dyn HitTest,
    now: Instant,
    out: &mut Vec<AnyGestureEvent>,
    wrap: fn(GestureEvent<K>) -> AnyGestureEvent,
) {
    if enabled.contains(K::KIND) {
        out.extend(recognizer.tick(registry, hit_test, now).into_iter().map(wrap));
    }
}

fn reset_into<K: GestureKind>(
    recognizer: &mut GestureRecognizer<K>,
    kinds: GestureKinds,
    registry: &mut TouchRegistry,
    out: &mut Vec<AnyGestureEvent>,
    wrap: fn(GestureEvent<K>) -> AnyGestureEvent,
) {
    if kinds.contains(K::KIND) {
        out.extend(recognizer.reset(registry).into_iter().map(wrap));
    }
}
