#![forbid(unsafe_code)]

//! Error types for configuration and per-frame touch snapshots.
//!
//! Gesture-level inconsistencies (a finger vanishing, a cancelled phase) are
//! never errors: they cancel the affected gesture. The types here cover the
//! two places where the host can hand the core something unusable.

use std::fmt;

use crate::touch::TouchId;

/// A threshold or screen metric outside its valid range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Screen dpi must be finite and strictly positive.
    InvalidDpi { dpi: f32 },
    /// Screen width and height must be finite and strictly positive.
    InvalidScreenSize { width: f32, height: f32 },
    /// A distance threshold (in inches) was negative or not finite.
    InvalidSlop { field: &'static str, value: f32 },
    /// An angle threshold (in degrees) was outside `[0, 180]`.
    InvalidAngle { field: &'static str, degrees: f32 },
    /// The tap time window was zero.
    ZeroDuration { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDpi { dpi } => write!(f, "screen dpi must be positive, got {dpi}"),
            Self::InvalidScreenSize { width, height } => {
                write!(f, "screen size must be positive, got {width}x{height}")
            }
            Self::InvalidSlop { field, value } => {
                write!(f, "{field} must be a non-negative distance, got {value}")
            }
            Self::InvalidAngle { field, degrees } => {
                write!(f, "{field} must be within [0, 180] degrees, got {degrees}")
            }
            Self::ZeroDuration { field } => write!(f, "{field} must be non-zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A touch snapshot the registry refused to adopt.
///
/// When `refresh` returns one of these, the previous snapshot stays in place.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// Two touch points in one frame carried the same identifier.
    DuplicateTouch { id: TouchId },
    /// A position or delta component was NaN or infinite.
    NonFinitePosition { id: TouchId },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTouch { id } => write!(f, "touch {id} appears twice in one frame"),
            Self::NonFinitePosition { id } => {
                write!(f, "touch {id} has a non-finite position or delta")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}
