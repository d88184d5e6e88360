//! Options for native message and file dialogs.

use serde::{Deserialize, Serialize};

/// A button presented by a message dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ButtonOptions {
    /// Text shown on the button and reported back when it is clicked.
    pub label: String,
    /// Whether the button dismisses the dialog as a cancellation.
    pub is_cancel: bool,
    /// Whether the button is the default action.
    pub is_default: bool,
}

impl ButtonOptions {
    /// Builds a plain button with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Marks the button as the default action.
    #[must_use]
    pub fn into_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Marks the button as the cancellation action.
    #[must_use]
    pub fn into_cancel(mut self) -> Self {
        self.is_cancel = true;
        self
    }
}

/// Options for the `Info`, `Warning`, `Error` and `Question` dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MessageDialogOptions {
    /// Window title of the dialog.
    pub title: String,
    /// Body text of the dialog.
    pub message: String,
    /// Buttons to present. An empty list defers to the platform policy.
    pub buttons: Vec<ButtonOptions>,
}

/// A named file-type filter offered by file dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FileFilter {
    /// Human readable label, for example `Images`.
    pub display_name: String,
    /// Semicolon separated glob patterns, for example `*.png;*.jpg`.
    pub pattern: String,
}

/// Options for the open-file dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OpenFileDialogOptions {
    /// Allow directories to be selected.
    pub can_choose_directories: bool,
    /// Allow files to be selected.
    pub can_choose_files: bool,
    /// Allow new directories to be created from the dialog.
    pub can_create_directories: bool,
    /// Show hidden files.
    pub show_hidden_files: bool,
    /// Resolve aliases and symlinks before returning paths.
    pub resolves_aliases: bool,
    /// Allow more than one path to be returned.
    pub allows_multiple_selection: bool,
    /// Hide file extensions.
    pub hide_extension: bool,
    /// Treat file packages as directories.
    pub treats_file_packages_as_directories: bool,
    /// Allow files outside the declared filters.
    pub allows_other_file_types: bool,
    /// File-type filters.
    pub filters: Vec<FileFilter>,
    /// Dialog title.
    pub title: String,
    /// Explanatory message.
    pub message: String,
    /// Label of the confirmation button.
    pub button_text: String,
    /// Directory shown initially.
    pub directory: String,
}

/// Options for the save-file dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SaveFileDialogOptions {
    /// Allow new directories to be created from the dialog.
    pub can_create_directories: bool,
    /// Show hidden files.
    pub show_hidden_files: bool,
    /// Allow the user to toggle extension visibility.
    pub can_select_hidden_extension: bool,
    /// Allow files outside the declared filters.
    pub allow_other_file_types: bool,
    /// Hide file extensions.
    pub hide_extension: bool,
    /// Treat file packages as directories.
    pub treats_file_packages_as_directories: bool,
    /// File-type filters.
    pub filters: Vec<FileFilter>,
    /// Explanatory message.
    pub message: String,
    /// Directory shown initially.
    pub directory: String,
    /// File name proposed initially.
    pub filename: String,
    /// Label of the confirmation button.
    pub button_text: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn decodes_message_dialog_with_buttons() {
        let options: MessageDialogOptions = serde_json::from_str(
            r#"{"Title":"Save?","Message":"Unsaved changes","Buttons":[{"Label":"Yes","IsDefault":true},{"Label":"No","IsCancel":true}]}"#,
        )
        .expect("decode message dialog");
        assert_eq!(options.title, "Save?");
        assert_eq!(
            options.buttons,
            vec![
                ButtonOptions::new("Yes").into_default(),
                ButtonOptions::new("No").into_cancel(),
            ]
        );
    }

    #[rstest]
    #[case::absent(r#"{"Title":"Hi"}"#)]
    #[case::empty(r#"{"Title":"Hi","Buttons":[]}"#)]
    fn missing_buttons_decode_as_empty(#[case] input: &str) {
        let options: MessageDialogOptions = serde_json::from_str(input).expect("decode");
        assert!(options.buttons.is_empty());
    }

    #[test]
    fn open_file_options_ignore_unknown_keys() {
        let options: OpenFileDialogOptions = serde_json::from_str(
            r#"{"AllowsMultipleSelection":true,"Detached":true,"dialog-id":"d1","Filters":[{"DisplayName":"Text","Pattern":"*.txt"}]}"#,
        )
        .expect("decode open file options");
        assert!(options.allows_multiple_selection);
        assert_eq!(options.filters.len(), 1);
    }

    #[test]
    fn rejects_mistyped_fields() {
        let result = serde_json::from_str::<SaveFileDialogOptions>(r#"{"Filename":42}"#);
        assert!(result.is_err());
    }
}
