//! Transport acknowledgements for runtime requests.
//!
//! The acknowledgement is distinct from the correlated outcome: it only says
//! whether the request was accepted. Outcomes of launched work are pushed to
//! the issuing window later.

use super::errors::DispatchError;

/// Status and body written back on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    status: u16,
    body: String,
}

impl TransportResponse {
    /// Creates an acknowledgement (status 200, empty body).
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: String::new(),
        }
    }

    /// Creates a failure response carrying the rendered error.
    #[must_use]
    pub fn from_error(error: &DispatchError) -> Self {
        Self {
            status: error.status(),
            body: error.to_string(),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns whether the request was acknowledged.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
