//! Parameter decoding for runtime requests.
//!
//! A runtime request carries its arguments as a single JSON object, either in
//! the request body or URL-encoded in the `args` query parameter. The body
//! wins when both are present. [`Args`] offers "present or absent" lookups
//! for individual keys, while [`Parameters::to_struct`] decodes the whole
//! document into a method-specific options record.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::error::Category as JsonCategory;
use serde_json::{Map, Value};
use thiserror::Error;

/// Query parameter holding the URL-encoded argument document.
pub const ARGS_PARAM: &str = "args";

/// Errors raised while decoding the argument document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document is not syntactically valid JSON.
    #[error("malformed argument document: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The document is valid JSON but not an object.
    #[error("argument document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// The document does not fit the requested options record.
    #[error("{0}")]
    Shape(#[source] serde_json::Error),
}

impl DecodeError {
    fn from_json(error: serde_json::Error) -> Self {
        match error.classify() {
            JsonCategory::Data => Self::Shape(error),
            JsonCategory::Syntax | JsonCategory::Eof | JsonCategory::Io => Self::Syntax(error),
        }
    }
}

/// Multi-valued query parameters in arrival order per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Collects key/value pairs, preserving repeated keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self { values }
    }

    /// Returns the first value recorded for `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value recorded for `key`.
    #[must_use]
    pub fn all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[][..], Vec::as_slice)
    }
}

/// Raw request parameters: query multi-map plus optional body.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    query: QueryParams,
    body: Option<Vec<u8>>,
}

impl Parameters {
    /// Wraps query parameters and a body. Empty bodies are treated as absent.
    #[must_use]
    pub fn new(query: QueryParams, body: Option<Vec<u8>>) -> Self {
        let body = body.filter(|bytes| !bytes.iter().all(u8::is_ascii_whitespace));
        Self { query, body }
    }

    /// Returns the query parameters.
    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Returns the raw argument document, if any.
    fn document(&self) -> Option<&[u8]> {
        self.body
            .as_deref()
            .or_else(|| self.query.first(ARGS_PARAM).map(str::as_bytes))
    }

    /// Parses the argument document into a typed accessor.
    ///
    /// An absent document yields empty [`Args`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the document is not valid JSON or is not an
    /// object.
    pub fn args(&self) -> Result<Args, DecodeError> {
        let Some(document) = self.document() else {
            return Ok(Args::default());
        };
        match serde_json::from_slice(document).map_err(DecodeError::from_json)? {
            Value::Object(data) => Ok(Args { data }),
            other => Err(DecodeError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Decodes the whole argument document into an options record.
    ///
    /// An absent document decodes from `{}` so records whose fields all
    /// default still succeed.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Syntax`] for malformed JSON and
    /// [`DecodeError::Shape`] when field types do not match `T`.
    pub fn to_struct<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let document = self.document().unwrap_or(b"{}".as_slice());
        serde_json::from_slice(document).map_err(DecodeError::from_json)
    }
}

/// Typed lookups over the argument object.
///
/// Absence is never an error here; callers decide whether a missing key is
/// fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    data: Map<String, Value>,
}

impl Args {
    /// Returns the value for `key` rendered as text.
    ///
    /// Strings are returned verbatim and other scalars use their JSON
    /// rendering. `null` counts as absent.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Returns the value for `key` when it is a JSON boolean.
    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Returns the value for `key` when it is an integer that fits `i64`.
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// Returns whether `key` is present with any value, including `null`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns whether the argument object is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
