//! Selection of the buttons injected into message dialogs that declare none.
//!
//! Some platforms render a message dialog without any button when the UI
//! surface omits them, leaving the user no way to dismiss it. The policy
//! chosen here is turned into a concrete button provider at bootstrap.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How message dialogs without buttons are completed.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DefaultButtonPolicy {
    /// Follow the host platform convention (a single `OK` button on macOS).
    #[default]
    Platform,
    /// Always inject a single default `OK` button.
    Always,
    /// Never inject buttons; the dialog toolkit decides.
    Never,
}

/// Errors encountered while parsing a [`DefaultButtonPolicy`] from text.
pub type DefaultButtonPolicyParseError = strum::ParseError;
