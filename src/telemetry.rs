//! Logging setup.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the directive
//! passed by the caller.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `RUST_LOG` nor a caller directive is usable.
pub const DEFAULT_FILTER: &str = "taskboard=info";

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The fallback directive could not be parsed.
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidFilter {
        /// Directive as supplied.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("log subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs a formatted log subscriber for the process.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for an unparsable
/// `default_filter` and [`TelemetryError::AlreadyInstalled`] when called
/// twice.
pub fn init_tracing(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = build_filter(default_filter)?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled(err.to_string()))
}

fn build_filter(default_filter: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_filter).map_err(|err| TelemetryError::InvalidFilter {
        directive: default_filter.to_owned(),
        message: err.to_string(),
    })
}
