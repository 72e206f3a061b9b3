//! crates/logging/src/config.rs
//! Verbosity configuration mapping verbose levels to per-target thresholds.

use std::fmt;

use crate::{CODEC_TARGET, INDEX_TARGET, STORE_TARGET};

/// Threshold applied to one tracing target.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    /// Nothing is emitted.
    Off,
    /// Errors only.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Progress milestones such as index builds and relocations.
    Info,
    /// Per-directory and per-lookup diagnostics.
    Debug,
    /// Per-file and per-read diagnostics.
    Trace,
}

impl LogLevel {
    /// Returns the directive spelling used by `EnvFilter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-subsystem logging thresholds.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Threshold for targets outside the blocksync subsystems.
    pub global: LogLevel,
    /// Threshold for [`INDEX_TARGET`].
    pub index: LogLevel,
    /// Threshold for [`STORE_TARGET`].
    pub store: LogLevel,
    /// Threshold for [`CODEC_TARGET`].
    pub codec: LogLevel,
}

impl VerbosityConfig {
    /// Creates a configuration from a verbose level (0-4).
    ///
    /// Levels above 4 behave like 4.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.index = LogLevel::Info;
                config.store = LogLevel::Info;
            }
            2 => {
                config.index = LogLevel::Debug;
                config.store = LogLevel::Debug;
                config.codec = LogLevel::Info;
            }
            3 => {
                config.global = LogLevel::Info;
                config.index = LogLevel::Trace;
                config.store = LogLevel::Trace;
                config.codec = LogLevel::Debug;
            }
            _ => {
                config.global = LogLevel::Debug;
                config.index = LogLevel::Trace;
                config.store = LogLevel::Trace;
                config.codec = LogLevel::Trace;
            }
        }

        config
    }

    /// Renders the configuration as an `EnvFilter` directive string.
    #[must_use]
    pub fn directives(&self) -> String {
        format!(
            "{},{INDEX_TARGET}={},{STORE_TARGET}={},{CODEC_TARGET}={}",
            self.global, self.index, self.store, self.codec
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quiet() {
        let config = VerbosityConfig::default();
        assert_eq!(config, VerbosityConfig::from_verbose_level(0));
        assert_eq!(config.index, LogLevel::Warn);
    }

    #[test]
    fn levels_are_monotonic() {
        let mut previous = VerbosityConfig::from_verbose_level(0);
        for level in 1..=4 {
            let current = VerbosityConfig::from_verbose_level(level);
            assert!(current.index >= previous.index);
            assert!(current.store >= previous.store);
            assert!(current.codec >= previous.codec);
            assert!(current.global >= previous.global);
            previous = current;
        }
    }

    #[test]
    fn high_levels_saturate() {
        assert_eq!(
            VerbosityConfig::from_verbose_level(4),
            VerbosityConfig::from_verbose_level(u8::MAX)
        );
    }

    #[test]
    fn directives_list_every_target() {
        let directives = VerbosityConfig::from_verbose_level(1).directives();
        assert_eq!(
            directives,
            "warn,blocksync::index=info,blocksync::store=info,blocksync::codec=warn"
        );
    }
}
