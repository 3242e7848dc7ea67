#![forbid(unsafe_code)]

use std::fmt;
use std::io;

use touchgest_core::ConfigError;

use crate::script::ScriptError;

/// Anything that can go wrong while loading or replaying fixtures.
#[derive(Debug)]
pub enum HarnessError {
    Json(serde_json::Error),
    Config(ConfigError),
    Script(ScriptError),
    Io(io::Error),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed JSON: {e}"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Script(e) => write!(f, "invalid touch script: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Script(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ScriptError> for HarnessError {
    fn from(e: ScriptError) -> Self {
        Self::Script(e)
    }
}

impl From<io::Error> for HarnessError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
