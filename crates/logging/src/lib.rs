#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries the structured-logging plumbing shared by the blocksync
//! crates. Every subsystem emits [`tracing`] events under a fixed target
//! ([`INDEX_TARGET`], [`STORE_TARGET`], [`CODEC_TARGET`]) through the
//! [`trace_index!`], [`trace_store!`], and [`trace_codec!`] macros, so a single
//! [`VerbosityConfig`] can raise or lower each subsystem independently.
//!
//! # Design
//!
//! - [`LogLevel`] is the per-target threshold.
//! - [`VerbosityConfig`] maps a numeric verbose level (as counted `-v` flags
//!   would produce) to per-target thresholds and renders them as an
//!   `EnvFilter` directive string.
//! - [`init_tracing`] installs a global `fmt` subscriber. When the
//!   [`LOG_ENV`] environment variable is set, its directives replace the
//!   computed ones.
//!
//! # Examples
//!
//! ```
//! use logging::{LogLevel, VerbosityConfig};
//!
//! let config = VerbosityConfig::from_verbose_level(2);
//! assert_eq!(config.index, LogLevel::Debug);
//! assert!(config.directives().contains("blocksync::index=debug"));
//! ```

mod config;
mod tracing_bridge;
mod tracing_macros;

pub use config::{LogLevel, VerbosityConfig};
pub use tracing_bridge::{LOG_ENV, TracingInitError, build_filter, init_tracing};

#[doc(hidden)]
pub use tracing as __tracing;

/// Target for tree construction and block index events.
pub const INDEX_TARGET: &str = "blocksync::index";

/// Target for store reads, relocations, and reindexing.
pub const STORE_TARGET: &str = "blocksync::store";

/// Target for node encode/decode events.
pub const CODEC_TARGET: &str = "blocksync::codec";
