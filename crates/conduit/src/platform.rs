//! Default buttons for message dialogs that request none.
//!
//! Some platforms cannot dismiss a message dialog without a button, so an
//! empty button list is filled in by a [`ButtonDefaults`] policy chosen at
//! startup.

use conduit_config::DefaultButtonPolicy;
use conduit_types::ButtonOptions;

use crate::dialogs::MessageDialogKind;

const DEFAULT_LABEL: &str = "OK";
const OS_REQUIRING_BUTTON: &str = "macos";

/// Supplies buttons for message dialogs whose request listed none.
pub trait ButtonDefaults: Send + Sync {
    /// Returns the buttons to present for a dialog of `kind`.
    fn default_buttons(&self, kind: MessageDialogKind) -> Vec<ButtonOptions>;
}

impl<F> ButtonDefaults for F
where
    F: Fn(MessageDialogKind) -> Vec<ButtonOptions> + Send + Sync,
{
    fn default_buttons(&self, kind: MessageDialogKind) -> Vec<ButtonOptions> {
        self(kind)
    }
}

/// Adds a single default `OK` button where the platform needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformButtonDefaults {
    synthesise: bool,
}

impl PlatformButtonDefaults {
    /// Policy for the named operating system, as in `std::env::consts::OS`.
    #[must_use]
    pub fn for_os(os: &str) -> Self {
        Self {
            synthesise: os == OS_REQUIRING_BUTTON,
        }
    }

    /// Policy for the operating system this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Policy selected by configuration.
    #[must_use]
    pub fn from_policy(policy: DefaultButtonPolicy) -> Self {
        match policy {
            DefaultButtonPolicy::Platform => Self::current(),
            DefaultButtonPolicy::Always => Self { synthesise: true },
            DefaultButtonPolicy::Never => Self { synthesise: false },
        }
    }

    /// Returns whether a button is synthesised.
    #[must_use]
    pub fn synthesises(&self) -> bool {
        self.synthesise
    }
}

impl ButtonDefaults for PlatformButtonDefaults {
    fn default_buttons(&self, _kind: MessageDialogKind) -> Vec<ButtonOptions> {
        if self.synthesise {
            vec![ButtonOptions::new(DEFAULT_LABEL).into_default()]
        } else {
            Vec::new()
        }
    }
}
