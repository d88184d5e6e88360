//! Structured logging for the dispatch layer.
//!
//! The bridge runs inside a host application that may already route
//! `tracing` events somewhere. The subscriber configured here is only
//! installed when no global dispatcher exists yet; otherwise the host's
//! subscriber keeps receiving the bridge's events and bootstrap carries on.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, debug};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use conduit_config::{Config, LogFormat};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

static TELEMETRY: OnceCell<TelemetryHandle> = OnceCell::new();

/// Outcome of telemetry initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    installed: bool,
}

impl TelemetryHandle {
    /// Returns whether the bridge installed its own subscriber. `false`
    /// means events go to a subscriber the host set up.
    #[must_use]
    pub fn installed_subscriber(self) -> bool {
        self.installed
    }
}

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
}

/// Installs the global `tracing` subscriber on first use.
///
/// Later calls return the first handle, even when called with a different
/// configuration.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| install_subscriber(config))
        .copied()
}

fn install_subscriber(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    let installed = match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => true,
        Err(error) => {
            debug!(
                target: TELEMETRY_TARGET,
                %error,
                "keeping the host's tracing subscriber"
            );
            false
        }
    };
    Ok(TelemetryHandle { installed })
}
