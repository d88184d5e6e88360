//! Native dialog seams consumed by the dialog handlers.
//!
//! The host application supplies a [`DialogFactory`] that presents dialogs
//! natively. Message dialogs are shown fire-and-forget: each [`Button`]
//! carries a bound action that reports the button label through the
//! dialog's [`Completion`], so clicking any button resolves the pending
//! dialog exactly once. File dialogs block while the user chooses and are
//! only ever prompted from background tasks.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use conduit_types::{ButtonOptions, OpenFileDialogOptions, SaveFileDialogOptions};

use crate::correlator::Completion;
use crate::window::Window;

/// Flavour of a message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDialogKind {
    /// Informational message.
    Info,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Question expecting a choice.
    Question,
}

impl MessageDialogKind {
    /// Maps a `Dialog.*` method name to a message dialog kind.
    #[must_use]
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "Info" => Some(Self::Info),
            "Warning" => Some(Self::Warning),
            "Error" => Some(Self::Error),
            "Question" => Some(Self::Question),
            _ => None,
        }
    }

    /// Returns the method name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Question => "Question",
        }
    }
}

impl fmt::Display for MessageDialogKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors reported by file dialogs.
#[derive(Debug, Error)]
pub enum DialogError {
    /// The user dismissed the dialog without choosing.
    #[error("selection cancelled")]
    Cancelled,

    /// The dialog could not be presented.
    #[error("dialog unavailable: {reason}")]
    Unavailable { reason: String },

    /// The platform reported an I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reports a button's label to the dialog that presented it.
#[derive(Clone)]
pub struct ButtonAction {
    completion: Arc<Completion>,
    label: String,
}

impl ButtonAction {
    /// Binds a label to the completion of a dialog.
    pub fn new(completion: Arc<Completion>, label: impl Into<String>) -> Self {
        Self {
            completion,
            label: label.into(),
        }
    }

    /// Delivers the label. Returns `false` if the dialog already resolved.
    pub fn fire(&self) -> bool {
        self.completion.succeed(self.label.clone())
    }
}

impl fmt::Debug for ButtonAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ButtonAction")
            .field("dialog", self.completion.id())
            .field("label", &self.label)
            .finish()
    }
}

/// A button ready to be presented.
#[derive(Debug, Clone)]
pub struct Button {
    options: ButtonOptions,
    action: Option<ButtonAction>,
}

impl Button {
    /// Creates a button without an action.
    #[must_use]
    pub fn new(options: ButtonOptions) -> Self {
        Self {
            options,
            action: None,
        }
    }

    /// Attaches the action run when the button is clicked.
    #[must_use]
    pub fn on_click(mut self, action: ButtonAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Returns the button label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.options.label.as_str()
    }

    /// Returns whether the button is the default action.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.options.is_default
    }

    /// Returns whether the button cancels the dialog.
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        self.options.is_cancel
    }

    /// Runs the button's action, if any.
    ///
    /// Returns `true` when this click resolved the dialog.
    pub fn click(&self) -> bool {
        self.action.as_ref().is_some_and(ButtonAction::fire)
    }
}

/// A message dialog ready to be shown.
#[derive(Clone)]
pub struct MessageDialog {
    kind: MessageDialogKind,
    title: String,
    message: String,
    buttons: Vec<Button>,
    owner: Option<Arc<dyn Window>>,
}

impl MessageDialog {
    /// Creates an empty dialog of the given kind.
    #[must_use]
    pub fn new(kind: MessageDialogKind) -> Self {
        Self {
            kind,
            title: String::new(),
            message: String::new(),
            buttons: Vec::new(),
            owner: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Appends buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.buttons.extend(buttons);
        self
    }

    /// Attaches the dialog to a window so it is shown modally over it.
    #[must_use]
    pub fn attach_to(mut self, window: Arc<dyn Window>) -> Self {
        self.owner = Some(window);
        self
    }

    /// Returns the dialog kind.
    #[must_use]
    pub fn kind(&self) -> MessageDialogKind {
        self.kind
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the body text.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the buttons in presentation order.
    #[must_use]
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Returns the button with the given label.
    #[must_use]
    pub fn button(&self, label: &str) -> Option<&Button> {
        self.buttons.iter().find(|button| button.label() == label)
    }

    /// Returns the owning window, if attached.
    #[must_use]
    pub fn owner(&self) -> Option<&Arc<dyn Window>> {
        self.owner.as_ref()
    }
}

impl fmt::Debug for MessageDialog {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MessageDialog")
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("buttons", &self.buttons)
            .field("owner", &self.owner.as_ref().map(|window| window.id()))
            .finish()
    }
}

/// A blocking file picker.
pub trait FileDialog: Send {
    /// Prompts for one path.
    ///
    /// # Errors
    ///
    /// Returns [`DialogError`] if the user cancels or the platform fails.
    fn prompt_for_single_selection(&mut self) -> Result<String, DialogError>;

    /// Prompts for any number of paths.
    ///
    /// # Errors
    ///
    /// Returns [`DialogError`] if the user cancels or the platform fails.
    fn prompt_for_multiple_selection(&mut self) -> Result<Vec<String>, DialogError>;
}

/// Presents native dialogs. Implemented by the host application.
pub trait DialogFactory: Send + Sync {
    /// Shows a message dialog without waiting for it to close.
    fn show_message(&self, dialog: MessageDialog);

    /// Builds an open-file dialog, optionally owned by a window.
    fn open_file(
        &self,
        options: OpenFileDialogOptions,
        owner: Option<Arc<dyn Window>>,
    ) -> Box<dyn FileDialog>;

    /// Builds a save-file dialog, optionally owned by a window.
    fn save_file(
        &self,
        options: SaveFileDialogOptions,
        owner: Option<Arc<dyn Window>>,
    ) -> Box<dyn FileDialog>;
}
