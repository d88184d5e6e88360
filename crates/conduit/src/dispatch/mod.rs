//! Runtime request dispatch for the UI surface.
//!
//! This module implements the path from an inbound pseudo-HTTP request to an
//! acknowledgement on the transport and, later, a correlated outcome pushed
//! to the issuing window.
//!
//! ## Protocol
//!
//! The UI surface requests native capabilities against a reserved path:
//!
//! ```text
//! POST /conduit/runtime?method=Call.Call
//! x-conduit-window-id: 1
//! x-conduit-method-id: 7
//!
//! {"call-id":"c1","args":[{"a":1}]}
//! ```
//!
//! The transport answers `200` once the work is launched. The outcome
//! arrives separately as `CallResponse("c1", ...)` or `CallError("c1", ...)`.
//!
//! ## Category Routing
//!
//! Requests are routed by category (`Call`, `Dialog`, `ContextMenu`) and then
//! by method within each category. Unknown categories or methods, and
//! requests whose correlation id is missing, fail on the transport and never
//! produce an outcome.

mod call;
mod context_menu;
mod dialog;
mod errors;
mod handler;
mod params;
mod request;
mod response;
mod router;

pub use self::call::{CALL_ID, CallMethod};
pub use self::context_menu::ContextMenuMethod;
pub use self::dialog::{DETACHED, DIALOG_ID, DialogMethod};
pub use self::errors::DispatchError;
pub use self::handler::MessageProcessor;
pub use self::params::{ARGS_PARAM, Args, DecodeError, Parameters, QueryParams};
pub use self::request::{
    Headers, METHOD_ID_HEADER, METHOD_PARAM, RuntimeRequest, WINDOW_ID_HEADER, WINDOW_NAME_HEADER,
};
pub use self::response::TransportResponse;
pub use self::router::{Category, Router};
