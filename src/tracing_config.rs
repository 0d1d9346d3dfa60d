//! Tracing configuration for structured diagnostics
//!
//! The library only emits events and spans. The binary installs a subscriber
//! once through [`TracingConfig::init`], always writing to stderr so stdout
//! stays reserved for the usage and success messages.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter used when neither `RUST_LOG` nor an explicit filter is set
pub const DEFAULT_FILTER: &str = "warn";

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable output with ANSI colors
    Console,
    /// Plain compact output for CI logs and redirected stderr
    Compact,
    /// JSON lines
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// `EnvFilter` directives; [`DEFAULT_FILTER`] when unset
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::Console,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration driven by `RUST_LOG`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_filter_var(std::env::var("RUST_LOG").ok())
    }

    fn from_filter_var(value: Option<String>) -> Self {
        let config = Self::new();
        match value {
            Some(filter) if !filter.trim().is_empty() => config.with_env_filter(filter),
            _ => config,
        }
    }

    /// Set output format
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directives that will be installed
    #[must_use]
    pub fn filter_directives(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(DEFAULT_FILTER)
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Invalid filter directives
    /// - A global subscriber is already installed
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = EnvFilter::try_new(self.filter_directives())?;
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true);

                registry.with(fmt_layer).try_init()?;
            },
        }

        tracing::debug!(filter = %self.filter_directives(), "Tracing initialized");
        Ok(())
    }
}

/// Install the CLI subscriber: `RUST_LOG` filter, plain output when stderr is
/// not a terminal
///
/// # Errors
/// - Invalid `RUST_LOG` directives
/// - A global subscriber is already installed
#[cfg(feature = "cli")]
pub fn init_cli_tracing() -> anyhow::Result<()> {
    use std::io::IsTerminal;

    let format = if std::io::stderr().is_terminal() {
        TracingFormat::Console
    } else {
        TracingFormat::Compact
    };
    TracingConfig::from_env().with_format(format).init()
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span for one read, remove, write transformation
    pub fn transformation(input: &std::path::Path, output: &std::path::Path) -> Span {
        tracing::span!(
            Level::INFO,
            "transformation",
            input = %input.display(),
            output = %output.display()
        )
    }

    /// Create a span for model loading operations
    pub fn model_loading(model_name: &str, provider: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "model_loading",
            model_name = %model_name,
            provider = %provider
        )
    }

    /// Create a span for preprocessing operations
    pub fn preprocessing(original_size: (u32, u32), target_size: (u32, u32)) -> Span {
        tracing::span!(
            Level::DEBUG,
            "preprocessing",
            original_width = %original_size.0,
            original_height = %original_size.1,
            target_width = %target_size.0,
            target_height = %target_size.1
        )
    }

    /// Create a span for inference operations
    pub fn inference(dimensions: (u32, u32)) -> Span {
        tracing::span!(
            Level::DEBUG,
            "inference",
            width = %dimensions.0,
            height = %dimensions.1
        )
    }

    /// Create a span for mask generation and other postprocessing steps
    pub fn postprocessing(operation: &str) -> Span {
        tracing::span!(
            Level::DEBUG,
            "postprocessing",
            operation = %operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.format, TracingFormat::Console);
        assert!(config.env_filter.is_none());
        assert_eq!(config.filter_directives(), "warn");
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::new()
            .with_format(TracingFormat::Compact)
            .with_env_filter("bgremove=debug");

        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.filter_directives(), "bgremove=debug");
    }

    #[test]
    fn test_filter_from_variable() {
        assert_eq!(TracingConfig::from_filter_var(None).filter_directives(), "warn");
        assert_eq!(
            TracingConfig::from_filter_var(Some("  ".to_string())).filter_directives(),
            "warn"
        );
        assert_eq!(
            TracingConfig::from_filter_var(Some("trace".to_string())).filter_directives(),
            "trace"
        );
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_invalid_filter_is_rejected() {
        let result = TracingConfig::new().with_env_filter("bgremove=notalevel").init();
        assert!(result.is_err());
    }

    #[test]
    fn test_spans_without_subscriber() {
        let span = spans::inference((320, 240));
        let _guard = span.enter();
        let _inner = spans::postprocessing("mask_generation").entered();
    }
}
