#![forbid(unsafe_code)]

//! Deterministic synthetic touch input.
//!
//! A [`TouchScript`] builds a [`Script`] one frame at a time. Actions queued
//! between two [`frame`](TouchScript::frame) calls land in the same snapshot;
//! fingers not mentioned stay down as `Stationary`, and fingers lifted or
//! cancelled disappear from the following frame.
//!
//! ```
//! use touchgest_harness::TouchScript;
//!
//! let script = TouchScript::new()
//!     .down(1, [400.0, 800.0])
//!     .down(2, [600.0, 800.0])
//!     .frame()
//!     .glide(&[(1, [0.0, 60.0]), (2, [0.0, 60.0])], 3)
//!     .up(1)
//!     .up(2)
//!     .frame()
//!     .build()
//!     .unwrap();
//! assert_eq!(script.len(), 5);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use touchgest_core::{TouchId, TouchPhase, TouchPoint};

/// Default spacing between frames (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// One snapshot and the time it is delivered, relative to the script start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptFrame {
    pub at_ms: u64,
    pub touches: Vec<TouchPoint>,
}

/// A finished sequence of frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub frames: Vec<ScriptFrame>,
}

impl Script {
    /// Parse a script saved with [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptFrame> {
        self.frames.iter()
    }
}

/// Misuse of the script builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// An action named a finger that is not down.
    UnknownFinger { id: TouchId, frame: usize },
    /// `down` for a finger that is already down.
    FingerAlreadyDown { id: TouchId, frame: usize },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFinger { id, frame } => {
                write!(f, "frame {frame}: touch {id} is not down")
            }
            Self::FingerAlreadyDown { id, frame } => {
                write!(f, "frame {frame}: touch {id} is already down")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// Frame-by-frame script builder.
///
/// The first misuse is remembered and reported by [`build`](Self::build);
/// later actions are ignored.
#[derive(Debug, Clone)]
pub struct TouchScript {
    frame_interval_ms: u64,
    fingers: Vec<TouchPoint>,
    frames: Vec<ScriptFrame>,
    error: Option<ScriptError>,
}

impl Default for TouchScript {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchScript {
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL_MS)
    }

    #[must_use]
    pub fn with_frame_interval(frame_interval_ms: u64) -> Self {
        Self {
            frame_interval_ms,
            fingers: Vec::new(),
            frames: Vec::new(),
            error: None,
        }
    }

    /// Put a finger down in the current frame.
    #[must_use]
    pub fn down(mut self, id: u64, position: impl Into<Vec2>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let id = TouchId(id);
        if self.fingers.iter().any(|t| t.id == id) {
            let frame = self.frames.len();
            return self.fail(ScriptError::FingerAlreadyDown { id, frame });
        }
        self.fingers.push(TouchPoint::began(id, position.into()));
        self
    }

    /// Move a finger to an absolute position.
    #[must_use]
    pub fn move_to(self, id: u64, position: impl Into<Vec2>) -> Self {
        let position = position.into();
        self.with_finger(id, |t| {
            if t.phase != TouchPhase::Began {
                t.delta += position - t.position;
                t.phase = TouchPhase::Moved;
            }
            t.position = position;
        })
    }

    /// Move a finger by an offset.
    #[must_use]
    pub fn move_by(self, id: u64, delta: impl Into<Vec2>) -> Self {
        let delta = delta.into();
        self.with_finger(id, |t| {
            if t.phase != TouchPhase::Began {
                t.delta += delta;
                t.phase = TouchPhase::Moved;
            }
            t.position += delta;
        })
    }

    /// Lift a finger in the current frame.
    #[must_use]
    pub fn up(self, id: u64) -> Self {
        self.with_finger(id, |t| t.phase = TouchPhase::Ended)
    }

    /// Report a finger as cancelled by the platform in the current frame.
    #[must_use]
    pub fn cancel(self, id: u64) -> Self {
        self.with_finger(id, |t| t.phase = TouchPhase::Cancelled)
    }

    /// Commit the queued actions as one frame.
    #[must_use]
    pub fn frame(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }
        let at_ms = self.frames.len() as u64 * self.frame_interval_ms;
        self.frames.push(ScriptFrame {
            at_ms,
            touches: self.fingers.clone(),
        });
        self.fingers.retain(|t| !t.phase.is_terminal());
        for t in &mut self.fingers {
            t.phase = TouchPhase::Stationary;
            t.delta = Vec2::ZERO;
        }
        self
    }

    /// Commit `frames` frames without movement.
    #[must_use]
    pub fn hold(mut self, frames: usize) -> Self {
        for _ in 0..frames {
            self = self.frame();
        }
        self
    }

    /// Move fingers by the given total offsets, spread evenly over `steps`
    /// committed frames.
    #[must_use]
    pub fn glide(mut self, moves: &[(u64, [f32; 2])], steps: usize) -> Self {
        let steps = steps.max(1);
        for _ in 0..steps {
            for &(id, total) in moves {
                self = self.move_by(id, Vec2::from(total) / steps as f32);
            }
            self = self.frame();
        }
        self
    }

    /// Fingers currently down.
    #[must_use]
    pub fn fingers_down(&self) -> usize {
        self.fingers.len()
    }

    /// Finish the script. Queued but uncommitted actions are dropped.
    pub fn build(self) -> Result<Script, ScriptError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Script {
                frames: self.frames,
            }),
        }
    }

    fn with_finger(mut self, id: u64, f: impl FnOnce(&mut TouchPoint)) -> Self {
        if self.error.is_some() {
            return self;
        }
        let id = TouchId(id);
        let Some(index) = self.fingers.iter().position(|t| t.id == id) else {
            let frame = self.frames.len();
            return self.fail(ScriptError::UnknownFinger { id, frame });
        };
        f(&mut self.fingers[index]);
        self
    }

    fn fail(mut self, error: ScriptError) -> Self {
        self.error = Some(error);
        self
    }
}
