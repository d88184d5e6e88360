//! Payload for opening a context menu over the UI surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to open a registered context menu at a position.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextMenuData {
    /// Identifier of the registered menu.
    pub id: String,
    /// Horizontal position in UI-surface coordinates.
    pub x: i32,
    /// Vertical position in UI-surface coordinates.
    pub y: i32,
    /// Arbitrary data handed to menu item callbacks.
    pub data: Value,
}
