//! Message dispatch and correlation between an embedded UI surface and its
//! native host.
//!
//! The UI surface cannot call native code directly. It requests native
//! capabilities (bound application methods, dialogs, context menus) by
//! issuing pseudo-HTTP requests against a reserved local path. This crate
//! receives those requests, decodes and routes them, runs the work off the
//! transport thread, and pushes exactly one correlated outcome back to the
//! window that asked.
//!
//! The host application supplies the collaborators:
//!
//! - a [`Bindings`] table of methods, built once with [`BindingsBuilder`];
//! - a [`DialogFactory`] that presents native dialogs;
//! - [`Window`] handles receiving pushed outcomes, found through a
//!   [`WindowLocator`].
//!
//! [`bootstrap_with`] loads configuration via [`conduit_config`], installs
//! structured logging and returns a [`Bridge`] whose [`MessageProcessor`]
//! handles every runtime request:
//!
//! ```text
//! transport -> MessageProcessor::handle_http -> Router -> handler
//!           <- TransportResponse (ack)
//! handler -> Correlator -> delivery thread -> Window::call_response
//! ```
//!
//! ## Exactly one outcome
//!
//! Every request that carries a correlation id gets a [`Completion`]. It
//! accepts the first outcome and drops any later one, so a dialog whose
//! buttons are clicked twice, or a task that reports and then panics, still
//! resolves its id once. Requests without an id fail on the transport and
//! never produce an outcome.

mod bootstrap;
pub mod correlator;
pub mod dialogs;
pub mod dispatch;
mod platform;
pub mod registry;
mod telemetry;
mod window;

pub use bootstrap::{
    BootstrapError, Bridge, ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap,
    bootstrap_with,
};
pub use correlator::{
    CallFailure, CallId, Channel, Completion, Correlator, CorrelatorError, DialogFailure, Outcome,
    TaskFailure, TaskHandle,
};
pub use dialogs::{
    Button, ButtonAction, DialogError, DialogFactory, FileDialog, MessageDialog, MessageDialogKind,
};
pub use dispatch::{DispatchError, MessageProcessor, RuntimeRequest, TransportResponse};
pub use platform::{ButtonDefaults, PlatformButtonDefaults};
pub use registry::{
    Bindings, BindingsBuilder, BoundMethod, CallResult, MethodError, MethodResult,
    MethodSignature, RegistryError, reply,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use window::{Window, WindowId, WindowLocator, target_window};

#[cfg(test)]
mod tests;
