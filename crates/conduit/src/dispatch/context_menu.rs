//! Handler for the `ContextMenu` category.

use std::sync::Arc;

use tracing::info;

use conduit_types::ContextMenuData;

use super::errors::DispatchError;
use super::request::RuntimeRequest;
use super::router::DISPATCH_TARGET;
use crate::window::Window;

/// Methods of the `ContextMenu` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuMethod {
    /// Open a registered menu at a position.
    OpenContextMenu,
}

impl ContextMenuMethod {
    /// Parses a method name within the category.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownMethod`] for any other name.
    pub fn parse(method: &str) -> Result<Self, DispatchError> {
        match method {
            "OpenContextMenu" => Ok(Self::OpenContextMenu),
            _ => Err(DispatchError::unknown_method("ContextMenu", method)),
        }
    }
}

/// Asks the issuing window to open a context menu.
///
/// There is no correlation id, so a payload that does not decode fails on
/// the transport.
pub(super) fn handle(
    window: &Arc<dyn Window>,
    request: &RuntimeRequest,
) -> Result<(), DispatchError> {
    let ContextMenuMethod::OpenContextMenu = ContextMenuMethod::parse(request.method())?;

    let data: ContextMenuData = request
        .params()
        .to_struct()
        .map_err(|source| DispatchError::InvalidOptions {
            category: "contextmenu",
            source,
        })?;
    window.open_context_menu(&data);
    info!(
        target: DISPATCH_TARGET,
        window = %window.id(),
        menu = %data.id,
        "Runtime: ContextMenu.OpenContextMenu"
    );
    Ok(())
}
