// ── Capability catalog ──
//
// The closed set of things a robot exposes. Every entity is built from one
// catalog key; platform, description, icon and press action are fixed per key.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use ecovacs_api::{ChargeAction, CleanAction};

/// Host platform an entity is registered under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Sensor,
    Button,
    Control,
}

/// A catalog key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CleanState,
    ChargeState,
    StartClean,
    ResumeClean,
    PauseClean,
    StopClean,
    ReturnDock,
    CancelReturn,
    ControlClean,
}

/// What pressing a button sends to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonCommand {
    Clean(CleanAction),
    Charge(ChargeAction),
}

const ICON_CLEAN: &str = "mdi:car-turbocharger";
const ICON_CHARGE: &str = "mdi:lightning-bolt";
const ICON_DEFAULT: &str = "mdi:bookmark";

impl Capability {
    /// Entities created for every device, in registration (and update) order.
    pub const DEFAULT_CATALOG: [Self; 8] = [
        Self::CleanState,
        Self::ChargeState,
        Self::StartClean,
        Self::ResumeClean,
        Self::PauseClean,
        Self::StopClean,
        Self::ReturnDock,
        Self::CancelReturn,
    ];

    pub fn platform(self) -> Platform {
        match self {
            Self::CleanState | Self::ChargeState => Platform::Sensor,
            Self::StartClean
            | Self::ResumeClean
            | Self::PauseClean
            | Self::StopClean
            | Self::ReturnDock
            | Self::CancelReturn => Platform::Button,
            Self::ControlClean => Platform::Control,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CleanState => "Clean state",
            Self::ChargeState => "Charge state",
            Self::StartClean => "[Clean] Start",
            Self::ResumeClean => "[Clean] Resume",
            Self::PauseClean => "[Clean] Pause",
            Self::StopClean => "[Clean] Stop",
            Self::ReturnDock => "[Charge] Return to Dock",
            Self::CancelReturn => "[Charge] Cancel return",
            Self::ControlClean => "Cleaning Control",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::CleanState
            | Self::StartClean
            | Self::ResumeClean
            | Self::PauseClean
            | Self::StopClean => ICON_CLEAN,
            Self::ChargeState | Self::ReturnDock | Self::CancelReturn => ICON_CHARGE,
            Self::ControlClean => ICON_DEFAULT,
        }
    }

    /// The command a button sends; `None` for sensors and controls.
    pub fn button_command(self) -> Option<ButtonCommand> {
        match self {
            Self::StartClean => Some(ButtonCommand::Clean(CleanAction::Start)),
            Self::ResumeClean => Some(ButtonCommand::Clean(CleanAction::Resume)),
            Self::PauseClean => Some(ButtonCommand::Clean(CleanAction::Pause)),
            Self::StopClean => Some(ButtonCommand::Clean(CleanAction::Stop)),
            Self::ReturnDock => Some(ButtonCommand::Charge(ChargeAction::ReturnDock)),
            Self::CancelReturn => Some(ButtonCommand::Charge(ChargeAction::CancelReturn)),
            Self::CleanState | Self::ChargeState | Self::ControlClean => None,
        }
    }
}
