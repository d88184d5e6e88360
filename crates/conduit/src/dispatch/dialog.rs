//! Handler for the `Dialog` category: message dialogs and file pickers.

use std::sync::Arc;

use tracing::{error, info};

use conduit_types::{MessageDialogOptions, OpenFileDialogOptions, SaveFileDialogOptions};

use super::errors::DispatchError;
use super::params::Args;
use super::request::RuntimeRequest;
use super::router::DISPATCH_TARGET;
use crate::correlator::{CallId, Channel, Completion, Correlator, DialogFailure};
use crate::dialogs::{
    Button, ButtonAction, DialogFactory, FileDialog, MessageDialog, MessageDialogKind,
};
use crate::platform::ButtonDefaults;
use crate::window::Window;

/// Argument carrying the correlation id of a dialog.
pub const DIALOG_ID: &str = "dialog-id";
/// Argument that keeps a dialog from being attached to the issuing window.
pub const DETACHED: &str = "Detached";

/// Methods of the `Dialog` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMethod {
    /// `Info`, `Warning`, `Error` or `Question`.
    Message(MessageDialogKind),
    /// Open-file picker.
    OpenFile,
    /// Save-file picker.
    SaveFile,
}

impl DialogMethod {
    /// Parses a method name within the category.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownMethod`] for any other name.
    pub fn parse(method: &str) -> Result<Self, DispatchError> {
        if let Some(kind) = MessageDialogKind::from_method(method) {
            return Ok(Self::Message(kind));
        }
        match method {
            "OpenFile" => Ok(Self::OpenFile),
            "SaveFile" => Ok(Self::SaveFile),
            _ => Err(DispatchError::unknown_method("Dialog", method)),
        }
    }
}

/// Collaborators needed to present dialogs.
pub(super) struct DialogServices<'a> {
    pub(super) dialogs: &'a dyn DialogFactory,
    pub(super) buttons: &'a dyn ButtonDefaults,
    pub(super) correlator: &'a Correlator,
}

/// Presents a dialog for the issuing window.
///
/// Dialogs are attached to the issuing window unless the request sets
/// `Detached` to `true`.
pub(super) fn handle(
    services: &DialogServices<'_>,
    window: &Arc<dyn Window>,
    request: &RuntimeRequest,
) -> Result<(), DispatchError> {
    let method = DialogMethod::parse(request.method())?;

    let args = request
        .params()
        .args()
        .map_err(|source| DispatchError::MalformedArguments { source })?;
    let Some(dialog_id) = args.string(DIALOG_ID) else {
        error!(
            target: DISPATCH_TARGET,
            window = %window.id(),
            "{DIALOG_ID} is required"
        );
        return Err(DispatchError::missing_id(DIALOG_ID));
    };

    let owner = owner_for(window, &args);
    let completion = services.correlator.completion(
        Arc::clone(window),
        Channel::Dialog,
        CallId::new(dialog_id),
    );

    match method {
        DialogMethod::Message(kind) => show_message(services, kind, owner, completion, request),
        DialogMethod::OpenFile => open_file(services, owner, completion, request),
        DialogMethod::SaveFile => save_file(services, owner, completion, request),
    }
    Ok(())
}

fn owner_for(window: &Arc<dyn Window>, args: &Args) -> Option<Arc<dyn Window>> {
    let detached = args.bool(DETACHED).unwrap_or(false);
    (!detached).then(|| Arc::clone(window))
}

fn show_message(
    services: &DialogServices<'_>,
    kind: MessageDialogKind,
    owner: Option<Arc<dyn Window>>,
    completion: Arc<Completion>,
    request: &RuntimeRequest,
) {
    let mut options: MessageDialogOptions = match request.params().to_struct() {
        Ok(options) => options,
        Err(source) => {
            completion.fail(&DialogFailure::Options(source));
            return;
        }
    };
    if options.buttons.is_empty() {
        options.buttons = services.buttons.default_buttons(kind);
    }

    let buttons = options.buttons.iter().map(|button| {
        let action = ButtonAction::new(Arc::clone(&completion), button.label.clone());
        Button::new(button.clone()).on_click(action)
    });
    let mut dialog = MessageDialog::new(kind)
        .with_title(options.title.as_str())
        .with_message(options.message.as_str())
        .with_buttons(buttons);
    if let Some(owner) = owner {
        dialog = dialog.attach_to(owner);
    }

    services.dialogs.show_message(dialog);
    info!(
        target: DISPATCH_TARGET,
        id = %completion.id(),
        options = ?options,
        "Runtime: Dialog.{kind}"
    );
}

fn open_file(
    services: &DialogServices<'_>,
    owner: Option<Arc<dyn Window>>,
    completion: Arc<Completion>,
    request: &RuntimeRequest,
) {
    let options: OpenFileDialogOptions = match request.params().to_struct() {
        Ok(options) => options,
        Err(source) => {
            completion.fail(&DialogFailure::Options(source));
            return;
        }
    };
    info!(
        target: DISPATCH_TARGET,
        id = %completion.id(),
        options = ?options,
        "Runtime: Dialog.OpenFile"
    );

    let multiple = options.allows_multiple_selection;
    let dialog = services.dialogs.open_file(options, owner);
    services.correlator.launch(completion, move |completion| {
        if multiple {
            prompt_multiple(dialog, completion);
        } else {
            prompt_single(dialog, completion, "Dialog.OpenFile");
        }
    });
}

fn save_file(
    services: &DialogServices<'_>,
    owner: Option<Arc<dyn Window>>,
    completion: Arc<Completion>,
    request: &RuntimeRequest,
) {
    let options: SaveFileDialogOptions = match request.params().to_struct() {
        Ok(options) => options,
        Err(source) => {
            completion.fail(&DialogFailure::Options(source));
            return;
        }
    };
    info!(
        target: DISPATCH_TARGET,
        id = %completion.id(),
        options = ?options,
        "Runtime: Dialog.SaveFile"
    );

    let dialog = services.dialogs.save_file(options, owner);
    services.correlator.launch(completion, move |completion| {
        prompt_single(dialog, completion, "Dialog.SaveFile");
    });
}

fn prompt_single(mut dialog: Box<dyn FileDialog>, completion: &Completion, method: &str) {
    match dialog.prompt_for_single_selection() {
        Ok(path) => {
            info!(
                target: DISPATCH_TARGET,
                id = %completion.id(),
                result = %path,
                "Runtime: {method}"
            );
            completion.succeed(path);
        }
        Err(source) => {
            completion.fail(&DialogFailure::Selection(source));
        }
    }
}

fn prompt_multiple(mut dialog: Box<dyn FileDialog>, completion: &Completion) {
    let paths = match dialog.prompt_for_multiple_selection() {
        Ok(paths) => paths,
        Err(source) => {
            completion.fail(&DialogFailure::Selection(source));
            return;
        }
    };
    match serde_json::to_string(&paths) {
        Ok(payload) => {
            info!(
                target: DISPATCH_TARGET,
                id = %completion.id(),
                result = %payload,
                "Runtime: Dialog.OpenFile"
            );
            completion.succeed_json(payload);
        }
        Err(source) => {
            completion.fail(&DialogFailure::Marshalling(source));
        }
    }
}
