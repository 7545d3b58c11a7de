//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! Per-tick code (cadence loops, spawners, collision passes) runs at up to
//! 30 Hz, so modules that log from there opt in explicitly:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("session {} started", session_id);
//! ```
//! `log_debug!` additionally requires `HANDY_HELPER_DEBUG` to be set, so
//! frame-level chatter stays out of normal `RUST_LOG=debug` runs.

use std::sync::OnceLock;

/// Whether `HANDY_HELPER_DEBUG` is `1` or `true`. Read once per process.
pub fn debug_enabled() -> bool {
    static DEBUG: OnceLock<bool> = OnceLock::new();
    *DEBUG.get_or_init(|| {
        std::env::var("HANDY_HELPER_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// Per-tick debug logging. Needs `ENABLE_LOGS` and `HANDY_HELPER_DEBUG`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS && $crate::utils::logging::debug_enabled() {
            log::debug!($($arg)*);
        }
    };
}

/// Conditional info logging; checks `ENABLE_LOGS` in the calling module.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Conditional warn logging; checks `ENABLE_LOGS` in the calling module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Conditional error logging; checks `ENABLE_LOGS` in the calling module.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
