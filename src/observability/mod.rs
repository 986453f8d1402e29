//! Observability subsystem for the roster service
//!
//! - Structured logging through `tracing` (JSON by default, one event per line)
//! - Typed lifecycle events
//!
//! # Usage
//!
//! ```ignore
//! use roster::observability::{init_logging, log_event, Event, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! log_event(Event::BootStart);
//! ```
//!
//! `RUST_LOG` overrides the configured filter when set.

mod events;

pub use events::Event;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable, for terminals
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive (default: "info")
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Observability error
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

impl LogConfig {
    /// Check the configured directive, regardless of `RUST_LOG`
    pub fn validate(&self) -> ObservabilityResult<()> {
        self.configured_filter().map(|_| ())
    }

    /// Build the filter, preferring `RUST_LOG` over the configured directive
    pub fn env_filter(&self) -> ObservabilityResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        self.configured_filter()
    }

    fn configured_filter(&self) -> ObservabilityResult<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| ObservabilityError::InvalidFilter {
            filter: self.filter.clone(),
            message: e.to_string(),
        })
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> ObservabilityResult<()> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    result.map_err(|e| ObservabilityError::Install(e.to_string()))
}

/// Log a lifecycle event that carries no fields.
///
/// Events with context are logged at the call site with the event name in
/// the `event` field, e.g. `info!(event = %Event::StoreOpened, backend, "lifecycle")`,
/// so each value stays a separate structured field.
pub fn log_event(event: Event) {
    if event.is_fatal() {
        error!(event = event.as_str(), "lifecycle");
    } else {
        info!(event = event.as_str(), "lifecycle");
    }
}
