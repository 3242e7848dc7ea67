#![forbid(unsafe_code)]

//! Test harness for touchgest.
//!
//! - [`script`]: deterministic multi-finger input built frame by frame.
//! - [`hit_test`]: rectangle regions standing in for scene raycasts.
//! - [`replay`]: drives a [`GestureSystem`](touchgest_core::GestureSystem)
//!   through a script and records every event as JSONL.
//! - [`config`]: JSON loading for `GestureSystemConfig`.

pub mod config;
pub mod error;
pub mod replay;
pub mod script;

pub use config::{load_config, system_from_json};
pub use error::HarnessError;
pub use hit_test::{Region, StaticHitTest};
pub use replay::{EventRecord, RejectedFrame, ReplayReport, replay};
pub use script::{Script, ScriptError, ScriptFrame, TouchScript};
