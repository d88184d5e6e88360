//! Test suites for the conduit dispatch layer.

mod context_menu_behaviour;
pub(crate) mod support;
