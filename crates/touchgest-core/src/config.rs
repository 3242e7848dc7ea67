#![forbid(unsafe_code)]

//! Recognizer thresholds.
//!
//! Every recognizer takes its thresholds at construction and never changes
//! them afterwards. Distances are physical (inches) so a gesture feels the
//! same on every screen density; [`ScreenMetrics`] converts them to pixels.
//!
//! With the `serde` feature all structs deserialize with per-field defaults,
//! so a partial config file only overrides what it names.

use web_time::Duration;

use crate::error::ConfigError;
use crate::gesture::GestureKinds;
use crate::touch::ScreenMetrics;

/// Range check for a threshold struct.
pub trait ValidateConfig {
    fn validate(&self) -> Result<(), ConfigError>;
}

fn check_slop(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSlop { field, value })
    }
}

fn check_angle(field: &'static str, degrees: f32) -> Result<(), ConfigError> {
    if (0.0..=180.0).contains(&degrees) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAngle { field, degrees })
    }
}

impl ValidateConfig for ScreenMetrics {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ConfigError::InvalidDpi { dpi: self.dpi });
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !(positive(self.width) && positive(self.height)) {
            return Err(ConfigError::InvalidScreenSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Per-kind thresholds
// ---------------------------------------------------------------------------

/// Thresholds for the two-finger drag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TwoFingerDragConfig {
    /// Minimum distance each finger must travel from its start (default: 0.1in).
    pub slop_inches: f32,
    /// Maximum angle between the two fingers' motion (default: 30°).
    pub angle_threshold_degrees: f32,
}

impl Default for TwoFingerDragConfig {
    fn default() -> Self {
        Self {
            slop_inches: 0.1,
            angle_threshold_degrees: 30.0,
        }
    }
}

impl ValidateConfig for TwoFingerDragConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_slop("slop_inches", self.slop_inches)?;
        check_angle("angle_threshold_degrees", self.angle_threshold_degrees)
    }
}

/// Thresholds for the one-finger drag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DragConfig {
    /// Minimum distance from the start before the drag begins (default: 0.1in).
    pub slop_inches: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self { slop_inches: 0.1 }
    }
}

impl ValidateConfig for DragConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_slop("slop_inches", self.slop_inches)
    }
}

/// Thresholds for the tap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TapConfig {
    /// Movement beyond this distance turns the tap into something else (default: 0.1in).
    pub slop_inches: f32,
    /// Longest press still counted as a tap (default: 300ms).
    pub max_duration: Duration,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            slop_inches: 0.1,
            max_duration: Duration::from_millis(300),
        }
    }
}

impl ValidateConfig for TapConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_slop("slop_inches", self.slop_inches)?;
        if self.max_duration.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "max_duration",
            });
        }
        Ok(())
    }
}

/// Thresholds for the pinch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinchConfig {
    /// Minimum change of the finger gap (default: 0.05in).
    pub slop_inches: f32,
    /// Maximum angle between a finger's motion and the line joining the fingers (default: 30°).
    pub slop_motion_direction_degrees: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            slop_inches: 0.05,
            slop_motion_direction_degrees: 30.0,
        }
    }
}

impl ValidateConfig for PinchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_slop("slop_inches", self.slop_inches)?;
        check_angle(
            "slop_motion_direction_degrees",
            self.slop_motion_direction_degrees,
        )
    }
}

/// Thresholds for the twist.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TwistConfig {
    /// Minimum rotation of the finger-to-finger line (default: 10°).
    pub slop_rotation_degrees: f32,
}

impl Default for TwistConfig {
    fn default() -> Self {
        Self {
            slop_rotation_degrees: 10.0,
        }
    }
}

impl ValidateConfig for TwistConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_angle("slop_rotation_degrees", self.slop_rotation_degrees)
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Everything a [`GestureSystem`](crate::system::GestureSystem) needs.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureSystemConfig {
    pub screen: ScreenMetrics,
    /// Recognizers to run (default: all).
    pub enabled: GestureKinds,
    pub two_finger_drag: TwoFingerDragConfig,
    pub pinch: PinchConfig,
    pub twist: TwistConfig,
    pub drag: DragConfig,
    pub tap: TapConfig,
}

impl ValidateConfig for GestureSystemConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.screen.validate()?;
        self.two_finger_drag.validate()?;
        self.pinch.validate()?;
        self.twist.validate()?;
        self.drag.validate()?;
        self.tap.validate()
    }
}
