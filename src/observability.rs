//! Crate-internal logging macros.
//!
//! Precedence:
//! 1) `tracing` feature => emit `tracing::*` events
//! 2) `logging` feature => emit `log::*` records
//! 3) neither enabled => no-op (format args are still type-checked)
//!
//! Every event is emitted under the `cert_locator` target. Callers must never pass
//! passwords or key bytes as arguments.

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        { tracing::debug!(target: "cert_locator", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), feature = "logging"))]
        { log::debug!(target: "cert_locator", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), not(feature = "logging")))]
        { let _ = format_args!($($arg)*); }
    }};
}

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        { tracing::info!(target: "cert_locator", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), feature = "logging"))]
        { log::info!(target: "cert_locator", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), not(feature = "logging")))]
        { let _ = format_args!($($arg)*); }
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        { tracing::warn!(target: "cert_locator", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), feature = "logging"))]
        { log::warn!(target: "cert_locator", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), not(feature = "logging")))]
        { let _ = format_args!($($arg)*); }
    }};
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
