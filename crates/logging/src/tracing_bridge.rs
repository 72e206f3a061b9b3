//! crates/logging/src/tracing_bridge.rs
//! Subscriber installation for the blocksync tracing targets.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use super::config::VerbosityConfig;

/// Environment variable whose directives override the computed configuration.
pub const LOG_ENV: &str = "BLOCKSYNC_LOG";

/// Error returned when the global subscriber cannot be installed.
#[derive(Debug, Error)]
pub enum TracingInitError {
    /// The directive string could not be parsed.
    #[error("invalid log directives {directives:?}: {source}")]
    Directives {
        /// Directive string that failed to parse.
        directives: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// A global subscriber has already been installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Builds the filter used by [`init_tracing`].
///
/// `env_override` takes precedence over `config` when it is present and
/// non-empty.
pub fn build_filter(
    config: &VerbosityConfig,
    env_override: Option<&str>,
) -> Result<EnvFilter, TracingInitError> {
    let directives = match env_override {
        Some(value) if !value.trim().is_empty() => value.to_owned(),
        _ => config.directives(),
    };

    EnvFilter::try_new(&directives)
        .map_err(|source| TracingInitError::Directives { directives, source })
}

/// Installs a global `fmt` subscriber filtered by `config`.
///
/// # Example
///
/// ```rust,ignore
/// use logging::{VerbosityConfig, init_tracing};
///
/// init_tracing(&VerbosityConfig::from_verbose_level(2))?;
/// logging::trace_index!(info, "index ready");
/// ```
pub fn init_tracing(config: &VerbosityConfig) -> Result<(), TracingInitError> {
    let env_override = std::env::var(LOG_ENV).ok();
    let filter = build_filter(config, env_override.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(TracingInitError::Install)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_directives_parse() {
        for level in 0..=4 {
            let config = VerbosityConfig::from_verbose_level(level);
            build_filter(&config, None).expect("computed directives parse");
        }
    }

    #[test]
    fn override_replaces_config() {
        let config = VerbosityConfig::default();
        let filter = build_filter(&config, Some("blocksync::store=trace")).expect("override");
        assert!(filter.to_string().contains("blocksync::store=trace"));
        assert!(!filter.to_string().contains("blocksync::index"));
    }

    #[test]
    fn blank_override_is_ignored() {
        let config = VerbosityConfig::from_verbose_level(2);
        let filter = build_filter(&config, Some("  ")).expect("fallback to config");
        assert!(filter.to_string().contains("blocksync::index=debug"));
    }

    #[test]
    fn invalid_override_is_reported() {
        let config = VerbosityConfig::default();
        let error = build_filter(&config, Some("blocksync::index=loud")).unwrap_err();
        assert!(matches!(error, TracingInitError::Directives { .. }));
        assert!(error.to_string().contains("blocksync::index=loud"));
    }

    #[test]
    fn second_install_fails() {
        let config = VerbosityConfig::default();
        let _ = init_tracing(&config);
        let error = init_tracing(&config).expect_err("global subscriber already set");
        assert!(matches!(error, TracingInitError::Install(_)));
    }
}
