//! The UI-surface instances that receive pushed outcomes.
//!
//! Windows belong to the host application. The dispatch layer only needs to
//! push messages to the window that issued a request, and to find that
//! window from the headers of an inbound request.

use std::fmt;
use std::sync::Arc;

use conduit_types::ContextMenuData;

use crate::dispatch::{DispatchError, Headers, WINDOW_ID_HEADER, WINDOW_NAME_HEADER};

/// Numeric identifier of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One embedded renderer context able to receive pushed messages.
///
/// Each push is a complete, self-contained message. Implementations must
/// accept concurrent pushes from several threads without interleaving them.
pub trait Window: Send + Sync {
    /// Identifier of the window.
    fn id(&self) -> WindowId;

    /// Name the window was registered under.
    fn name(&self) -> &str;

    /// Resolves a pending call with a JSON payload.
    fn call_response(&self, call_id: &str, payload: &str);

    /// Rejects a pending call with a message.
    fn call_error(&self, call_id: &str, message: &str);

    /// Resolves a pending dialog with its result. `is_json` tells the UI
    /// surface to parse the payload instead of treating it as text.
    fn dialog_response(&self, dialog_id: &str, payload: &str, is_json: bool);

    /// Rejects a pending dialog with a message.
    fn dialog_error(&self, dialog_id: &str, message: &str);

    /// Opens a context menu over the UI surface.
    fn open_context_menu(&self, data: &ContextMenuData);
}

/// Finds live windows by name or id. Implemented by the host application.
pub trait WindowLocator: Send + Sync {
    /// Returns the window registered under `name`.
    fn by_name(&self, name: &str) -> Option<Arc<dyn Window>>;

    /// Returns the window with the given id.
    fn by_id(&self, id: WindowId) -> Option<Arc<dyn Window>>;
}

/// Resolves the window that issued a request from its headers.
///
/// The window name header is consulted first, then the numeric id header.
///
/// # Errors
///
/// Returns [`DispatchError::WindowNotFound`] when neither header names a
/// live window, including when the id header is not a number.
pub fn target_window(
    locator: &dyn WindowLocator,
    headers: &Headers,
) -> Result<Arc<dyn Window>, DispatchError> {
    if let Some(name) = headers.get(WINDOW_NAME_HEADER) {
        return locator
            .by_name(name)
            .ok_or_else(|| DispatchError::window_not_found(format!("window name '{name}'")));
    }

    let Some(raw_id) = headers.get(WINDOW_ID_HEADER) else {
        return Err(DispatchError::window_not_found("request without window headers"));
    };
    raw_id
        .parse::<u32>()
        .ok()
        .and_then(|id| locator.by_id(WindowId(id)))
        .ok_or_else(|| DispatchError::window_not_found(format!("window id '{raw_id}'")))
}
