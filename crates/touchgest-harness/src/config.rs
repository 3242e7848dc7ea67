#![forbid(unsafe_code)]

//! JSON configuration loading.
//!
//! Every field is optional; missing ones keep their defaults:
//!
//! ```
//! let cfg = touchgest_harness::load_config(
//!     r#"{ "screen": { "dpi": 320.0 }, "enabled": "DRAG | TAP" }"#,
//! )
//! .unwrap();
//! assert_eq!(cfg.screen.dpi, 320.0);
//! assert_eq!(cfg.drag.slop_inches, 0.1);
//! ```

use touchgest_core::{GestureSystem, GestureSystemConfig, ValidateConfig};

use crate::error::HarnessError;

/// Parse and validate a [`GestureSystemConfig`].
pub fn load_config(json: &str) -> Result<GestureSystemConfig, HarnessError> {
    let config: GestureSystemConfig = serde_json::from_str(json)?;
    config.validate()?;
    tracing::debug!(enabled = ?config.enabled, dpi = config.screen.dpi, "config loaded");
    Ok(config)
}

/// Build a [`GestureSystem`] straight from JSON.
pub fn system_from_json(json: &str) -> Result<GestureSystem, HarnessError> {
    Ok(GestureSystem::try_new(load_config(json)?)?)
}
