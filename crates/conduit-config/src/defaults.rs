use crate::buttons::DefaultButtonPolicy;
use crate::logging::LogFormat;

/// Default log filter expression used by the host.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Reserved path on which the UI surface issues runtime requests.
pub const DEFAULT_RUNTIME_PATH: &str = "/conduit/runtime";

/// Default log filter expression used by the host.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the host.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned runtime path used where allocation is required (e.g. serde).
pub fn default_runtime_path() -> String {
    DEFAULT_RUNTIME_PATH.to_string()
}

/// Default policy for message dialogs declared without buttons.
pub fn default_button_policy() -> DefaultButtonPolicy {
    DefaultButtonPolicy::Platform
}
