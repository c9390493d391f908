// Robot operations on top of the raw client.
//
// Each call is a fixed `cmd` on `robot/ctl` (or the device list endpoint)
// followed by control-envelope validation.

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{EcovacsClient, check_control_response};
use crate::error::Error;
use crate::models::{
    ChargeAction, CleanAction, ControlCommand, ControlData, ENDPOINT_CONTROL,
    ENDPOINT_DEVICE_LIST, UNKNOWN_STATE, clean_state_name, scalar_to_string,
};

impl EcovacsClient {
    /// Names of the robots registered under this API key.
    pub async fn list_devices(&self) -> Result<Vec<String>, Error> {
        let data = self
            .call_api(ENDPOINT_DEVICE_LIST, &Map::new(), Method::GET)
            .await?;
        let names = match data {
            Value::Array(items) => items.iter().map(scalar_to_string).collect(),
            Value::Null => Vec::new(),
            Value::Object(map) if map.is_empty() => Vec::new(),
            other => {
                return Err(Error::invalid_response(format!(
                    "expected a device list, got {other}"
                )));
            }
        };
        debug!("discovered {} registered devices", names.len());
        Ok(names)
    }

    /// Send a cleaning action by name (`start`, `pause`, `resume`, `stop`).
    /// Unrecognized names stop the robot.
    pub async fn set_cleaning(&self, nick_name: &str, action: &str) -> Result<ControlData, Error> {
        self.clean(nick_name, CleanAction::from_name(action)).await
    }

    pub async fn clean(&self, nick_name: &str, action: CleanAction) -> Result<ControlData, Error> {
        debug!(device = nick_name, "cleaning act {action} - {}", action.wire_code());
        self.control(nick_name, ControlCommand::Clean, action.wire_code())
            .await
    }

    /// Send a docking action by name (`return_dock`, `cancel_return`).
    /// Unrecognized names cancel the return.
    pub async fn set_charging(&self, nick_name: &str, action: &str) -> Result<ControlData, Error> {
        self.charge(nick_name, ChargeAction::from_name(action)).await
    }

    pub async fn charge(&self, nick_name: &str, action: ChargeAction) -> Result<ControlData, Error> {
        debug!(device = nick_name, "charging act {action} - {}", action.wire_code());
        self.control(nick_name, ControlCommand::Charge, action.wire_code())
            .await
    }

    /// Current cleaning state; `st` holds `s`, `p` or `h`.
    pub async fn get_clean_state(&self, nick_name: &str) -> Result<ControlData, Error> {
        self.control(nick_name, ControlCommand::GetCleanState, "")
            .await
    }

    /// Current charging state; `type` holds a vendor string such as
    /// `Idle`, `SlotCharging` or `WireCharging`.
    pub async fn get_charge_state(&self, nick_name: &str) -> Result<ControlData, Error> {
        self.control(nick_name, ControlCommand::GetChargeState, "")
            .await
    }

    async fn control(
        &self,
        nick_name: &str,
        cmd: ControlCommand,
        act: &str,
    ) -> Result<ControlData, Error> {
        let mut payload = Map::new();
        payload.insert("nickName".into(), Value::from(nick_name));
        payload.insert("cmd".into(), Value::from(<&str>::from(cmd)));
        payload.insert("act".into(), Value::from(act));

        let envelope = self
            .call_api_envelope(ENDPOINT_CONTROL, &payload, Method::POST)
            .await?;
        check_control_response(&envelope)
    }
}

/// Display string for the `st` field of a clean-state payload.
pub fn translate_clean_state(state: &ControlData) -> String {
    state
        .get("st")
        .map(scalar_to_string)
        .map_or(UNKNOWN_STATE, |code| clean_state_name(&code))
        .to_owned()
}

/// The `type` field of a charge-state payload, passed through verbatim.
pub fn translate_charge_state(state: &ControlData) -> String {
    state
        .get("type")
        .map_or_else(|| UNKNOWN_STATE.to_owned(), scalar_to_string)
}
