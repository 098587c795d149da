//! Logging utilities and configuration for term-insight.
//!
//! The engine emits structured `tracing` events at every public entry point.
//! This module holds the knobs that keep per-column and per-detector logging
//! cheap, plus helpers for applications that want a ready-made subscriber.

use tracing::Level;

/// Controls how chatty the engine's internal events are.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Most verbose level for entry-point events (start, finish, cache hits)
    pub base_level: Level,
    /// Per-column trend, change point, seasonality and semantic scorer events
    pub log_detector_details: bool,
    /// Tier selection and per-chunk progress events
    pub log_sampling: bool,
    /// Elapsed-time events for analysis passes
    pub log_timings: bool,
    /// Longest dataset or column name written into a log field
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_detector_details: false,
            log_sampling: true,
            log_timings: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Every detector decision at debug level.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_detector_details: true,
            log_sampling: true,
            log_timings: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only; no per-detector, sampling or timing events.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_detector_details: false,
            log_sampling: false,
            log_timings: false,
            max_field_length: 128,
        }
    }

    /// Same as [`LogConfig::default`].
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Whether entry-point events at `level` pass [`LogConfig::base_level`].
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.base_level
    }
}

/// `info!` gated on [`LogConfig::base_level`].
#[macro_export]
macro_rules! log_info {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled(tracing::Level::INFO) {
            tracing::info!($($arg)*);
        }
    };
}

/// `debug!` gated on [`LogConfig::log_detector_details`].
#[macro_export]
macro_rules! log_detector {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_detector_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// `info!` gated on [`LogConfig::log_sampling`].
#[macro_export]
macro_rules! log_sampling {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_sampling {
            tracing::info!($($arg)*);
        }
    };
}

/// `debug!` gated on [`LogConfig::log_timings`].
#[macro_export]
macro_rules! log_timing {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_timings {
            tracing::debug!($($arg)*);
        }
    };
}

/// Cuts `value` to at most `max_length` bytes, backing off to a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() > max_length {
        let mut end = max_length;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        return format!("{}...(truncated)", &value[..end]);
    }
    value.to_string()
}

/// Ready-made subscriber for binaries and tests that embed the engine.
pub mod setup {
    use tracing::Level;

    /// Output format and filter levels for [`init_logging`].
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for every other crate
        pub level: Level,
        /// Level for the `term_insight` target
        pub insight_level: Level,
        /// Emit JSON lines instead of the human-readable format
        pub json_format: bool,
        /// Full directive overriding `level` and `insight_level`
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                insight_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings globally and info for this crate.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                insight_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Human-readable output at debug level everywhere.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                insight_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_insight_level(mut self, level: Level) -> Self {
            self.insight_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Replaces the generated filter directive entirely.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// `EnvFilter` directive, e.g. `info,term_insight=debug`.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},term_insight={}",
                    self.level.as_str().to_ascii_lowercase(),
                    self.insight_level.as_str().to_ascii_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber; fails if one is already set.
    ///
    /// The library never calls this itself; applications embedding the engine
    /// decide whether and how logs are collected.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_insight::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
