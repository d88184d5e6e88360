//! Category and method routing for runtime requests.
//!
//! The category selects a handler module; each handler owns the fixed set of
//! method names it accepts. Unknown categories and methods are rejected with
//! transport errors before any argument is read.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::call;
use super::context_menu;
use super::dialog::{self, DialogServices};
use super::errors::DispatchError;
use super::request::RuntimeRequest;
use crate::correlator::Correlator;
use crate::dialogs::DialogFactory;
use crate::platform::ButtonDefaults;
use crate::registry::Bindings;
use crate::window::Window;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Capability categories served by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Bound application methods.
    Call,
    /// Native message and file dialogs.
    Dialog,
    /// Context menus over the UI surface.
    ContextMenu,
}

impl Category {
    /// Parses a category name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownCategory` if the value does not match
    /// any known category.
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        match value.to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "dialog" => Ok(Self::Dialog),
            "contextmenu" => Ok(Self::ContextMenu),
            _ => Err(DispatchError::unknown_category(value)),
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Dialog => "Dialog",
            Self::ContextMenu => "ContextMenu",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Routes runtime requests to category handlers.
///
/// The router owns the collaborators every handler needs. It holds no
/// per-request state, so one instance serves all transport threads.
pub struct Router {
    bindings: Arc<Bindings>,
    dialogs: Arc<dyn DialogFactory>,
    buttons: Arc<dyn ButtonDefaults>,
    correlator: Correlator,
}

impl Router {
    /// Creates a router over the given collaborators.
    pub fn new(
        bindings: Arc<Bindings>,
        dialogs: Arc<dyn DialogFactory>,
        buttons: Arc<dyn ButtonDefaults>,
        correlator: Correlator,
    ) -> Self {
        Self {
            bindings,
            dialogs,
            buttons,
            correlator,
        }
    }

    /// Returns the correlator used for launched work.
    #[must_use]
    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    /// Routes a request issued by `window`.
    ///
    /// `Ok(())` means the request was accepted; its outcome, if any, is
    /// delivered to the window separately.
    ///
    /// # Errors
    ///
    /// Returns an error if the category or method is unknown, or if the
    /// request cannot be correlated.
    pub fn route(
        &self,
        window: &Arc<dyn Window>,
        request: &RuntimeRequest,
    ) -> Result<(), DispatchError> {
        let category = Category::parse(request.category())?;

        debug!(
            target: DISPATCH_TARGET,
            category = category.as_str(),
            method = request.method(),
            window = %window.id(),
            "routing runtime request"
        );

        match category {
            Category::Call => call::handle(&self.bindings, &self.correlator, window, request),
            Category::Dialog => {
                let services = DialogServices {
                    dialogs: self.dialogs.as_ref(),
                    buttons: self.buttons.as_ref(),
                    correlator: &self.correlator,
                };
                dialog::handle(&services, window, request)
            }
            Category::ContextMenu => context_menu::handle(window, request),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Router")
            .field("bindings", &self.bindings.len())
            .field("correlator", &self.correlator)
            .finish_non_exhaustive()
    }
}
