//! Runtime request parsing for the dispatch layer.
//!
//! The UI surface cannot call native code directly, so it issues
//! pseudo-HTTP requests against a reserved local path:
//!
//! ```text
//! GET /conduit/runtime?method=Dialog.Info&args=%7B%22dialog-id%22%3A%22d1%22%7D
//! x-conduit-window-id: 1
//! ```
//!
//! This module turns such a request into a [`RuntimeRequest`] holding the
//! category, the method within it, the headers, and the raw parameters.

use std::collections::BTreeMap;

use url::Url;

use super::errors::DispatchError;
use super::params::{Parameters, QueryParams};

/// Query parameter carrying `Category.Method`.
pub const METHOD_PARAM: &str = "method";
/// Header carrying the numeric id of a bound method.
pub const METHOD_ID_HEADER: &str = "x-conduit-method-id";
/// Header carrying the numeric id of the issuing window.
pub const WINDOW_ID_HEADER: &str = "x-conduit-window-id";
/// Header carrying the name of the issuing window.
pub const WINDOW_NAME_HEADER: &str = "x-conduit-window-name";

const LOCAL_ORIGIN: &str = "http://localhost/";

/// Case-insensitive request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    values: BTreeMap<String, String>,
}

impl Headers {
    /// Collects header pairs. Later duplicates replace earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut headers = Self::default();
        for (name, value) in pairs {
            headers.insert(name, value);
        }
        headers
    }

    /// Inserts or replaces a header.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Returns the trimmed value of a header, ignoring empty values.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Parsed runtime request.
///
/// Requests are created once per inbound message and consumed by dispatch;
/// nothing retains them afterwards.
#[derive(Debug, Clone)]
pub struct RuntimeRequest {
    category: String,
    method: String,
    headers: Headers,
    params: Parameters,
}

impl RuntimeRequest {
    /// Builds a request from already separated parts.
    pub fn new(
        category: impl Into<String>,
        method: impl Into<String>,
        headers: Headers,
        params: Parameters,
    ) -> Self {
        Self {
            category: category.into(),
            method: method.into(),
            headers,
            params,
        }
    }

    /// Parses a pseudo-HTTP request aimed at the runtime endpoint.
    ///
    /// The URI may be relative; it is resolved against a local origin. A
    /// non-empty body replaces the `args` query parameter as the argument
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownEndpoint`] if the path is not
    /// `runtime_path`, [`DispatchError::MissingMethod`] if no method was
    /// named, and [`DispatchError::InvalidMethodFormat`] if the method is not
    /// `Category.Method`.
    pub fn parse(
        uri: &str,
        runtime_path: &str,
        headers: Headers,
        body: Option<Vec<u8>>,
    ) -> Result<Self, DispatchError> {
        let url = resolve(uri)?;
        if url.path() != runtime_path {
            return Err(DispatchError::unknown_endpoint(url.path()));
        }

        let query = QueryParams::from_pairs(
            url.query_pairs()
                .map(|(key, value)| (key.into_owned(), value.into_owned())),
        );
        let qualified = query
            .first(METHOD_PARAM)
            .map(str::trim)
            .filter(|method| !method.is_empty())
            .ok_or(DispatchError::MissingMethod)?;
        let (category, method) = split_method(qualified)?;
        let (category, method) = (category.to_owned(), method.to_owned());

        Ok(Self::new(
            category,
            method,
            headers,
            Parameters::new(query, body),
        ))
    }

    /// Returns the capability category, for example `Dialog`.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Returns the method within the category, for example `Info`.
    #[must_use]
    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the raw request parameters.
    #[must_use]
    pub fn params(&self) -> &Parameters {
        &self.params
    }
}

fn resolve(uri: &str) -> Result<Url, DispatchError> {
    let malformed = |source| DispatchError::MalformedUri {
        uri: uri.to_owned(),
        source,
    };
    let origin = Url::parse(LOCAL_ORIGIN).map_err(malformed)?;
    Url::options()
        .base_url(Some(&origin))
        .parse(uri)
        .map_err(malformed)
}

fn split_method(qualified: &str) -> Result<(&str, &str), DispatchError> {
    match qualified.split_once('.') {
        Some((category, method))
            if !category.is_empty() && !method.is_empty() && !method.contains('.') =>
        {
            Ok((category, method))
        }
        _ => Err(DispatchError::invalid_method_format(qualified)),
    }
}
