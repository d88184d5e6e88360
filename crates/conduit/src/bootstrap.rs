//! Startup of the dispatch layer inside a host application.

use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;
use tracing::{error, info};

use conduit_config::{Config, ConfigError};

use crate::correlator::{Correlator, CorrelatorError};
use crate::dialogs::DialogFactory;
use crate::dispatch::{MessageProcessor, Router};
use crate::platform::PlatformButtonDefaults;
use crate::registry::Bindings;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the bridge configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration built by the host application.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps a ready configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds unusable values.
    #[error("invalid configuration: {source}")]
    Validation {
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Outcome delivery could not be started.
    #[error("failed to start outcome delivery: {source}")]
    Correlator {
        /// Underlying correlator error.
        #[source]
        source: CorrelatorError,
    },
}

/// A started dispatch layer, ready to receive runtime requests.
#[derive(Debug)]
pub struct Bridge {
    config: Config,
    processor: MessageProcessor,
    telemetry: TelemetryHandle,
}

impl Bridge {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the processor the host transport hands requests to.
    #[must_use]
    pub fn processor(&self) -> &MessageProcessor {
        &self.processor
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Waits for launched work to deliver its outcomes, then stops.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelatorError`] when work is still running at the
    /// deadline.
    pub fn shutdown(self, timeout: Duration) -> Result<(), CorrelatorError> {
        let result = self.processor.drain(timeout);
        match &result {
            Ok(()) => info!(target: BOOTSTRAP_TARGET, event = "shutdown", "bridge stopped"),
            Err(error) => error!(
                target: BOOTSTRAP_TARGET,
                event = "shutdown_incomplete",
                %error,
                "bridge stopped with outstanding work"
            ),
        }
        result
    }
}

/// Bootstraps the bridge with configuration from files, environment and CLI.
pub fn bootstrap(
    bindings: Bindings,
    dialogs: Arc<dyn DialogFactory>,
) -> Result<Bridge, BootstrapError> {
    bootstrap_with(&SystemConfigLoader, bindings, dialogs)
}

/// Bootstraps the bridge using the supplied collaborators.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    bindings: Bindings,
    dialogs: Arc<dyn DialogFactory>,
) -> Result<Bridge, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::Validation { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let correlator = Correlator::new().map_err(|source| BootstrapError::Correlator { source })?;

    let buttons = PlatformButtonDefaults::from_policy(config.default_buttons());
    let methods = bindings.len();
    let router = Router::new(Arc::new(bindings), dialogs, Arc::new(buttons), correlator);
    let processor = MessageProcessor::new(router, config.runtime_path());

    info!(
        target: BOOTSTRAP_TARGET,
        event = "bootstrap_succeeded",
        runtime_path = config.runtime_path(),
        methods,
        default_buttons = %config.default_buttons(),
        log_filter = config.log_filter(),
        log_format = ?config.log_format(),
        "bridge bootstrap completed"
    );

    Ok(Bridge {
        config,
        processor,
        telemetry,
    })
}
