//! crates/logging/src/tracing_macros.rs
//! Convenience macros binding tracing events to the blocksync targets.
//!
//! The first argument is the level macro to use (`error`, `warn`, `info`,
//! `debug`, `trace`); the rest is forwarded to `tracing` unchanged. Callers do
//! not need their own `tracing` dependency.

/// Emit an event under the index target.
///
/// # Example
/// ```
/// logging::trace_index!(debug, files = 3, "indexed directory");
/// ```
#[macro_export]
macro_rules! trace_index {
    ($level:ident, $($arg:tt)+) => {
        $crate::__tracing::$level!(target: $crate::INDEX_TARGET, $($arg)+)
    };
}

/// Emit an event under the store target.
///
/// # Example
/// ```
/// logging::trace_store!(info, path = "a.txt", "relocated");
/// ```
#[macro_export]
macro_rules! trace_store {
    ($level:ident, $($arg:tt)+) => {
        $crate::__tracing::$level!(target: $crate::STORE_TARGET, $($arg)+)
    };
}

/// Emit an event under the codec target.
///
/// # Example
/// ```
/// logging::trace_codec!(debug, found = 2, "version mismatch");
/// ```
#[macro_export]
macro_rules! trace_codec {
    ($level:ident, $($arg:tt)+) => {
        $crate::__tracing::$level!(target: $crate::CODEC_TARGET, $($arg)+)
    };
}
