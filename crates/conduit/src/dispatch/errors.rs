//! Error types for transport-level dispatch failures.
//!
//! A [`DispatchError`] never reaches the UI surface as a correlated outcome:
//! it is reported through the transport status of the request that caused
//! it. Failures that occur once a correlation id is known are modelled by the
//! per-category failure enums instead and delivered as outcomes.

use thiserror::Error;

use super::params::DecodeError;

/// Errors resolved synchronously on the transport.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request targeted a path other than the reserved runtime endpoint.
    #[error("no runtime endpoint at '{path}'")]
    UnknownEndpoint { path: String },

    /// Request URI could not be parsed.
    #[error("malformed request uri '{uri}': {source}")]
    MalformedUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// Request carried no `method` parameter.
    #[error("no method specified")]
    MissingMethod,

    /// The `method` parameter is not of the form `Category.Method`.
    #[error("invalid method format '{method}': expected 'Category.Method'")]
    InvalidMethodFormat { method: String },

    /// Category is not served by this dispatcher.
    #[error("unknown category: {category}")]
    UnknownCategory { category: String },

    /// Method is not recognised within its category.
    #[error("unknown {category} method: {method}")]
    UnknownMethod { category: String, method: String },

    /// The argument document could not be read at all.
    #[error("unable to parse arguments: {source}")]
    MalformedArguments {
        #[source]
        source: DecodeError,
    },

    /// The correlation id required by the category was absent.
    #[error("{key} is required")]
    MissingId { key: &'static str },

    /// Options for a request without a correlation id failed to decode.
    #[error("error parsing {category} options: {source}")]
    InvalidOptions {
        category: &'static str,
        #[source]
        source: DecodeError,
    },

    /// No window matched the request's window headers.
    #[error("no valid window found for {reference}")]
    WindowNotFound { reference: String },
}

impl DispatchError {
    /// Returns the transport status code for this error.
    ///
    /// Missing resources map to 404 and every protocol violation to 400.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::UnknownEndpoint { .. } | Self::WindowNotFound { .. } => 404,
            Self::MalformedUri { .. }
            | Self::MissingMethod
            | Self::InvalidMethodFormat { .. }
            | Self::UnknownCategory { .. }
            | Self::UnknownMethod { .. }
            | Self::MalformedArguments { .. }
            | Self::MissingId { .. }
            | Self::InvalidOptions { .. } => 400,
        }
    }

    /// Creates an unknown endpoint error.
    pub fn unknown_endpoint(path: impl Into<String>) -> Self {
        Self::UnknownEndpoint { path: path.into() }
    }

    /// Creates an invalid method format error.
    pub fn invalid_method_format(method: impl Into<String>) -> Self {
        Self::InvalidMethodFormat {
            method: method.into(),
        }
    }

    /// Creates an unknown category error.
    pub fn unknown_category(category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
        }
    }

    /// Creates an unknown method error.
    pub fn unknown_method(category: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            category: category.into(),
            method: method.into(),
        }
    }

    /// Creates a missing correlation id error.
    #[must_use]
    pub fn missing_id(key: &'static str) -> Self {
        Self::MissingId { key }
    }

    /// Creates a window lookup error.
    pub fn window_not_found(reference: impl Into<String>) -> Self {
        Self::WindowNotFound {
            reference: reference.into(),
        }
    }
}
