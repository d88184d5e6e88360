//! Output format of the bridge's diagnostic log.
//!
//! Hosts that ship logs to a collector keep the default `json`; developers
//! running the host from a terminal usually pick `compact`. The value is
//! read from `log_format` in `conduit.toml`, `CONDUIT_LOG_FORMAT`, or
//! `--log-format`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How telemetry renders dispatch and correlation events.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with event fields flattened to the top
    /// level.
    #[default]
    Json,
    /// Single-line text for interactive sessions.
    Compact,
}

/// Error returned when `log_format` names no known format.
pub type LogFormatParseError = strum::ParseError;
