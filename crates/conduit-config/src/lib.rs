//! Shared configuration for the conduit host bridge.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then a
//! `conduit.toml` file, then `CONDUIT_*` environment variables, then command
//! line flags. The resolved [`Config`] drives telemetry, the reserved runtime
//! endpoint, and the button policy for message dialogs.

mod buttons;
mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use buttons::{DefaultButtonPolicy, DefaultButtonPolicyParseError};
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_RUNTIME_PATH, default_button_policy, default_log_filter,
    default_log_filter_string, default_log_format, default_runtime_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for the host bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CONDUIT")]
pub struct Config {
    /// `tracing` filter expression, for example `info,conduit::dispatch=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Path of the reserved endpoint that receives runtime requests.
    #[ortho_config(default = default_runtime_path())]
    pub runtime_path: String,
    /// Buttons injected into message dialogs that declare none.
    #[ortho_config(default = default_button_policy())]
    pub default_buttons: DefaultButtonPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            runtime_path: default_runtime_path(),
            default_buttons: default_button_policy(),
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the reserved runtime endpoint path.
    #[must_use]
    pub fn runtime_path(&self) -> &str {
        self.runtime_path.as_str()
    }

    /// Returns the default-button policy for message dialogs.
    #[must_use]
    pub fn default_buttons(&self) -> DefaultButtonPolicy {
        self.default_buttons
    }

    /// Checks values that the layered loader cannot validate on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RuntimePath`] when the runtime path is not an
    /// absolute URL path free of query and fragment components.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.runtime_path();
        let reason = if !path.starts_with('/') {
            Some("must start with '/'")
        } else if path.len() == 1 {
            Some("must not be the site root")
        } else if path.contains(['?', '#']) {
            Some("must not contain a query or fragment")
        } else if path.contains(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ConfigError::RuntimePath {
                path: path.to_owned(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Errors raised while validating a resolved [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The runtime endpoint path is unusable.
    #[error("invalid runtime path '{path}': {reason}")]
    RuntimePath {
        /// Offending path.
        path: String,
        /// Human readable reason.
        reason: &'static str,
    },
}
