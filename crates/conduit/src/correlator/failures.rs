//! Message templates for correlated error outcomes.
//!
//! The rendered text of each variant is exactly what the UI surface receives
//! and what operators see in the diagnostic log.

use std::io;
use std::num::ParseIntError;

use thiserror::Error;

use crate::dialogs::DialogError;
use crate::dispatch::DecodeError;
use crate::registry::MethodError;

/// Failures of `Call.*` requests with a known call id.
#[derive(Debug, Error)]
pub enum CallFailure {
    /// The call options record did not decode.
    #[error("Error parsing call options: {0}")]
    Options(#[source] DecodeError),

    /// The method id header was not an unsigned 32-bit integer.
    #[error("Error parsing method id for call: {0}")]
    MethodId(#[source] ParseIntError),

    /// Neither the numeric id nor the signature resolved to a method.
    #[error("Error getting binding for method: '{method}' not found")]
    NotFound { method: String },

    /// The bound method reported an error.
    #[error("Error calling method: {0}")]
    Invocation(#[source] MethodError),

    /// The method's result could not be encoded as JSON.
    #[error("Error converting result to json: {0}")]
    Encoding(#[source] serde_json::Error),
}

/// Failures of `Dialog.*` requests with a known dialog id.
#[derive(Debug, Error)]
pub enum DialogFailure {
    /// The dialog options record did not decode.
    #[error("Error parsing dialog options: {0}")]
    Options(#[source] DecodeError),

    /// The file dialog failed to produce a selection.
    #[error("Error getting selection: {0}")]
    Selection(#[source] DialogError),

    /// The selected paths could not be encoded as JSON.
    #[error("Error marshalling files: {0}")]
    Marshalling(#[source] serde_json::Error),
}

/// Failures of the background task machinery itself.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The task panicked before reporting an outcome.
    #[error("task panicked: {detail}")]
    Panicked { detail: String },

    /// The task returned without reporting an outcome.
    #[error("task finished without reporting an outcome")]
    Abandoned,

    /// The operating system refused to start the task thread.
    #[error("unable to start task: {0}")]
    Spawn(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_method() {
        let failure = CallFailure::NotFound {
            method: "Add".to_owned(),
        };
        assert_eq!(
            failure.to_string(),
            "Error getting binding for method: 'Add' not found"
        );
    }

    #[test]
    fn method_id_failure_embeds_parse_error() {
        let source = "seven".parse::<u32>().expect_err("not a number");
        let failure = CallFailure::MethodId(source);
        assert!(
            failure
                .to_string()
                .starts_with("Error parsing method id for call: invalid digit")
        );
    }

    #[test]
    fn selection_failure_embeds_dialog_error() {
        let failure = DialogFailure::Selection(DialogError::Cancelled);
        assert_eq!(
            failure.to_string(),
            "Error getting selection: selection cancelled"
        );
    }
}
