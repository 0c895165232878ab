//! `debug!` and `warn!` for the placement engine.
//!
//! With the default `tracing` feature these are the `tracing` macros, so fields such as
//! `part = ..` are recorded as structured data. Without it they expand to nothing.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {log_debug as debug, log_warn as warn};
