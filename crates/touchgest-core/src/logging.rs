#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros. Without it, the same macro names are exported at the crate root
//! as no-ops so call sites compile unchanged:
//!
//! ```ignore
//! #[cfg(feature = "tracing")]
//! use crate::logging::{debug, trace};
//! #[cfg(not(feature = "tracing"))]
//! use crate::{debug, trace};
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, trace, trace_span, warn};

#[cfg(not(feature = "tracing"))]
mod noop {
    /// No-op `trace!` used when the `tracing` feature is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op `debug!` used when the `tracing` feature is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op `warn!` used when the `tracing` feature is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
