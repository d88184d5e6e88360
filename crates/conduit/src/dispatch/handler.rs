//! Front door for runtime requests arriving on the transport.
//!
//! [`MessageProcessor`] turns a pseudo-HTTP request into an acknowledgement.
//! The acknowledgement is written as soon as work has been launched; the
//! correlated outcome follows through the issuing window.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::errors::DispatchError;
use super::request::{Headers, RuntimeRequest};
use super::response::TransportResponse;
use super::router::{DISPATCH_TARGET, Router};
use crate::correlator::CorrelatorError;
use crate::window::{Window, WindowLocator, target_window};

/// Handles runtime requests for every window of the application.
pub struct MessageProcessor {
    router: Router,
    runtime_path: String,
}

impl MessageProcessor {
    /// Creates a processor serving requests at `runtime_path`.
    pub fn new(router: Router, runtime_path: impl Into<String>) -> Self {
        Self {
            router,
            runtime_path: runtime_path.into(),
        }
    }

    /// Returns the path runtime requests are served on.
    #[must_use]
    pub fn runtime_path(&self) -> &str {
        self.runtime_path.as_str()
    }

    /// Handles a request already attributed to a window.
    pub fn handle(&self, window: &Arc<dyn Window>, request: &RuntimeRequest) -> TransportResponse {
        match self.router.route(window, request) {
            Ok(()) => TransportResponse::ok(),
            Err(error) => reject(&error),
        }
    }

    /// Parses a raw request, finds its window and handles it.
    pub fn handle_http(
        &self,
        locator: &dyn WindowLocator,
        uri: &str,
        headers: Headers,
        body: Option<Vec<u8>>,
    ) -> TransportResponse {
        let request = match RuntimeRequest::parse(uri, &self.runtime_path, headers, body) {
            Ok(request) => request,
            Err(error) => return reject(&error),
        };
        let window = match target_window(locator, request.headers()) {
            Ok(window) => window,
            Err(error) => return reject(&error),
        };

        debug!(
            target: DISPATCH_TARGET,
            category = request.category(),
            method = request.method(),
            window = %window.id(),
            "dispatching runtime request"
        );
        self.handle(&window, &request)
    }

    /// Waits for launched work to finish and its outcomes to be pushed.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelatorError`] if the deadline passes first or delivery
    /// has stopped.
    pub fn drain(&self, timeout: Duration) -> Result<(), CorrelatorError> {
        self.router.correlator().drain(timeout)
    }
}

impl fmt::Debug for MessageProcessor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MessageProcessor")
            .field("router", &self.router)
            .field("runtime_path", &self.runtime_path)
            .finish()
    }
}

fn reject(error: &DispatchError) -> TransportResponse {
    warn!(
        target: DISPATCH_TARGET,
        %error,
        status = error.status(),
        "runtime request rejected"
    );
    TransportResponse::from_error(error)
}
