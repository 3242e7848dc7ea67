#![forbid(unsafe_code)]

//! Core: touch registry, gesture state machines, and recognizers.
//!
//! # Role
//! `touchgest-core` turns a per-frame list of touch points into high-level
//! gesture events: two-finger drag, pinch, twist, drag, and tap. It owns no
//! platform input; the host feeds it one snapshot per frame together with a
//! hit-test callback for resolving the gesture target.
//!
//! # Primary responsibilities
//! - **TouchRegistry**: the current snapshot plus touch locks. A touch is
//!   owned by at most one started gesture at a time.
//! - **Gesture**: the Pending → Started → Completed/Cancelled state machine,
//!   with hooks supplied by each [`GestureKind`].
//! - **GestureRecognizer**: creates candidates from new touches, advances
//!   them, and retires finished ones.
//! - **GestureSystem**: runs every enabled recognizer in a fixed priority
//!   order once per frame.
//!
//! # Example
//! ```
//! use glam::Vec2;
//! use touchgest_core::{GestureSystem, NoHits, TouchId, TouchPoint};
//! use web_time::Instant;
//!
//! let mut system = GestureSystem::new();
//! let touches = [TouchPoint::began(TouchId(1), Vec2::new(200.0, 300.0))];
//! let events = system.frame(&touches, &NoHits, Instant::now()).unwrap();
//! assert!(events.iter().any(|e| e.kind() == touchgest_core::GestureKinds::TAP));
//! ```

pub mod config;
pub mod error;
pub mod gesture;
pub mod gestures;
pub mod logging;
pub mod recognizer;
pub mod system;
pub mod touch;

pub use config::{
    DragConfig, GestureSystemConfig, PinchConfig, TapConfig, TwistConfig, TwoFingerDragConfig,
    ValidateConfig,
};
pub use error::{ConfigError, SnapshotError};
pub use gesture::{
    Arity, Frame, Gesture, GestureEvent, GestureId, GestureKind, GestureKinds, GestureState,
    HitTest, NoHits, StartCheck, StartContext, TargetId, UpdateOutcome,
};
pub use gestures::{DragGesture, PinchGesture, TapGesture, TwistGesture, TwoFingerDragGesture};
pub use recognizer::GestureRecognizer;
pub use system::{AnyGestureEvent, GestureSystem};
pub use touch::{
    EDGE_THRESHOLD_INCHES, LockOwner, ScreenMetrics, TouchId, TouchLock, TouchPhase, TouchPoint,
    TouchRegistry,
};
