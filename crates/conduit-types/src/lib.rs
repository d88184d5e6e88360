//! Wire records exchanged between the embedded UI surface and the host.
//!
//! The UI surface encodes method-specific options as a JSON document carried
//! either in the `args` query parameter or in the request body. The records
//! in this crate describe those documents. Field names follow the casing the
//! UI runtime emits: call options use `camelCase`, dialog options use
//! `PascalCase`, and context-menu payloads use lowercase keys.

mod call;
mod context_menu;
mod dialog;

pub use call::{CallOptions, MethodSignature};
pub use context_menu::ContextMenuData;
pub use dialog::{
    ButtonOptions, FileFilter, MessageDialogOptions, OpenFileDialogOptions, SaveFileDialogOptions,
};
