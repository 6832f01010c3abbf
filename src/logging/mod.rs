use crate::config::{AppConfig, LoggingSection};
use crate::environment::{EnvSource, Environment};
use crate::errors::{AppError, AppResult, ConfigError};
use std::str::FromStr;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides every configured level, using `EnvFilter` directives.
pub const LOG_FILTER_ENV: &str = "APPKERNEL_LOG";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line
    Pretty,
    /// JSON is not compiled in; falls back to compact
    Json,
    /// Single line
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub show_target: bool,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            show_target: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            show_target: false,
            ansi: false,
        }
    }

    pub fn testing() -> Self {
        Self {
            level: Level::ERROR,
            format: LogFormat::Compact,
            show_target: false,
            ansi: false,
        }
    }

    /// Settings for a resolved environment. The `[logging]` section wins over
    /// the profile, which wins over the mode defaults.
    pub fn for_environment(env: &Environment, section: &LoggingSection) -> Result<Self, ConfigError> {
        let mut config = if env.is_production() {
            Self::production()
        } else if env.mode == "test" {
            Self::testing()
        } else {
            Self::development()
        };
        if let Some(level) = section.level.as_deref().or(env.log_level.as_deref()) {
            config.level = parse_level(level)?;
        }
        if let Some(format) = section.format.as_deref() {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    /// Settings for the binary, chosen before the env phase runs.
    ///
    /// If the mode cannot be resolved yet, the default preset is used and the
    /// resolution error is handed back so it can be logged once the
    /// subscriber is installed.
    pub fn bootstrap(env: &dyn EnvSource, config: &AppConfig) -> Result<(Self, Option<ConfigError>), ConfigError> {
        match Environment::resolve(env, config) {
            Ok(resolved) => Ok((Self::for_environment(&resolved, &config.logging)?, None)),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }
}

pub fn parse_level(raw: &str) -> Result<Level, ConfigError> {
    Level::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue {
        field: "log_level".to_string(),
        value: raw.to_string(),
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase()));

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(config.show_target)
                    .with_ansi(config.ansi),
            )
            .try_init(),
        LogFormat::Json | LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(config.show_target)
                    .with_ansi(config.ansi),
            )
            .try_init(),
    };
    installed.map_err(|e| AppError::Generic(format!("failed to install log subscriber: {e}")))?;

    tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
    Ok(())
}

/// Logs how long an operation took when finished.
pub struct OperationTimer {
    start: Instant,
    operation: String,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = duration.as_micros() as u64,
            "operation completed"
        );
        duration
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
