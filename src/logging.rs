//! Logging facade
//!
//! The router logs through one of two backends selected at compile time:
//!
//! - `log` (default) - the standard `log` crate
//! - `tracing` - the `tracing` crate
//!
//! With neither feature enabled every macro expands to nothing, so the core
//! carries no logging cost for bindings that do not want it.
//!
//! ```ignore
//! use navigator_core::{debug_log, trace_log};
//!
//! trace_log!("cache miss for '{}'", pathname);
//! debug_log!("transition #{} committed", id);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __navigator_log {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::$level!($($arg)*);
        #[cfg(feature = "log")]
        ::log::$level!($($arg)*);
    }};
}

/// Trace-level logging (match cache, per-match status changes).
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => { $crate::__navigator_log!(trace, $($arg)*) };
}

/// Debug-level logging (transition lifecycle).
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => { $crate::__navigator_log!(debug, $($arg)*) };
}

/// Info-level logging.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => { $crate::__navigator_log!(info, $($arg)*) };
}

/// Warn-level logging (contained loader failures).
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => { $crate::__navigator_log!(warn, $($arg)*) };
}

/// Error-level logging (unhandled loader failures).
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => { $crate::__navigator_log!(error, $($arg)*) };
}
