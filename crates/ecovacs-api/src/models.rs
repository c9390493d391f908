// Wire-level constants and lookup tables for the Ecovacs open API.
//
// Every control call is a `POST robot/ctl` carrying `{nickName, cmd, act, ak}`.
// `cmd` and `act` are short vendor codes; the enums below keep the mapping
// between readable names and those codes in one place.

use std::time::Duration;

use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

/// Default cloud endpoint.
pub const DEFAULT_API_URL: &str = "https://open.ecovacs.cn";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceiling for connection attempts made by `call_api`.
pub const MAX_RETRIES: u32 = 3;

pub const ENDPOINT_DEVICE_LIST: &str = "robot/deviceList";
pub const ENDPOINT_CONTROL: &str = "robot/ctl";

/// Query/body parameter carrying the API key.
pub const API_KEY_PARAM: &str = "ak";

/// The inner `data.ctl.data` object of a control acknowledgement.
pub type ControlData = Map<String, Value>;

// ── Commands ─────────────────────────────────────────────────────────

/// Value of the `cmd` field on `robot/ctl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum ControlCommand {
    Clean,
    Charge,
    GetCleanState,
    GetChargeState,
}

// ── Actions ──────────────────────────────────────────────────────────

/// Cleaning actions accepted by the `Clean` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CleanAction {
    Start,
    Pause,
    Resume,
    #[default]
    Stop,
}

impl CleanAction {
    /// Short code sent as `act`.
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::Start => "s",
            Self::Pause => "p",
            Self::Resume => "r",
            Self::Stop => "h",
        }
    }

    /// Parse an action name, falling back to [`CleanAction::Stop`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

/// Docking actions accepted by the `Charge` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChargeAction {
    ReturnDock,
    #[default]
    CancelReturn,
}

impl ChargeAction {
    /// Short code sent as `act`.
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::ReturnDock => "go",
            Self::CancelReturn => "stopGo",
        }
    }

    /// Parse an action name, falling back to [`ChargeAction::CancelReturn`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

// ── State translation ────────────────────────────────────────────────

/// Display string for an unrecognized state code.
pub const UNKNOWN_STATE: &str = "Unknown";

/// Clean-state code (`st`) to display string.
pub fn clean_state_name(code: &str) -> &'static str {
    match code {
        "s" => "Cleaning",
        "p" => "Paused",
        "h" => "Idle",
        _ => UNKNOWN_STATE,
    }
}

/// Render a JSON scalar the way the vendor compares it: strings verbatim,
/// everything else through its JSON text.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
