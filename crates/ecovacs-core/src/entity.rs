// ── Entities ──
//
// One polling or action unit bound to a single capability of a single
// robot. The variant is chosen from the catalog key at construction and
// never changes. Network calls go through the shared client passed in by
// the owning `Device`; a disabled entity never touches the network.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString, IntoStaticStr};
use tracing::debug;

use ecovacs_api::{
    CleanAction, ControlData, EcovacsClient, Error, translate_charge_state, translate_clean_state,
};

use crate::device::DeviceState;
use crate::error::CoreError;
use crate::model::{ButtonCommand, Capability, Platform};

/// Local state of the cleaning control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    #[default]
    Idle,
    Cleaning,
    Paused,
    Stopped,
}

/// Requests accepted by a control entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ControlAction {
    Start,
    Pause,
    Stop,
}

/// Variant-specific state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Polled status value; `None` until the first successful read.
    Sensor { state: Option<String> },
    /// Fire-and-forget command.
    Button { command: ButtonCommand },
    Control { state: ControlState },
}

/// A capability of one robot.
#[derive(Debug, Clone)]
pub struct Entity {
    device_name: String,
    capability: Capability,
    param: String,
    enabled: bool,
    updated: bool,
    attributes: IndexMap<String, String>,
    kind: EntityKind,
}

/// Serializable view of an entity for hosts and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySnapshot {
    pub capability: Capability,
    pub platform: Platform,
    pub name: String,
    pub description: String,
    pub state: Option<String>,
    pub enabled: bool,
    pub updated: bool,
    pub attributes: IndexMap<String, String>,
}

impl Entity {
    pub fn new(device_name: impl Into<String>, capability: Capability, param: impl Into<String>) -> Self {
        let kind = match capability.button_command() {
            Some(command) => EntityKind::Button { command },
            None if capability.platform() == Platform::Control => EntityKind::Control {
                state: ControlState::default(),
            },
            None => EntityKind::Sensor { state: None },
        };
        let mut attributes = IndexMap::new();
        attributes.insert("icon".to_owned(), capability.icon().to_owned());

        Self {
            device_name: device_name.into(),
            capability,
            param: param.into(),
            enabled: true,
            updated: false,
            attributes,
            kind,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn platform(&self) -> Platform {
        self.capability.platform()
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// `"<type> <param>"`, or just the type when there is no parameter.
    pub fn name(&self) -> String {
        with_param(self.capability.into(), &self.param)
    }

    pub fn description(&self) -> String {
        with_param(self.capability.description(), &self.param)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.enabled = value;
    }

    /// Whether at least one update or press has gone through.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Last observed value. Buttons have none.
    pub fn state(&self) -> Option<String> {
        match &self.kind {
            EntityKind::Sensor { state } => state.clone(),
            EntityKind::Control { state } => Some(state.to_string()),
            EntityKind::Button { .. } => None,
        }
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            capability: self.capability,
            platform: self.platform(),
            name: self.name(),
            description: self.description(),
            state: self.state(),
            enabled: self.enabled,
            updated: self.updated,
            attributes: self.attributes.clone(),
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Enabled, and the owning device (if any) is awake.
    pub async fn is_ready(&self, device: Option<&DeviceState>) -> bool {
        if !self.enabled {
            return false;
        }
        match device {
            Some(device) => device.wakeup().await,
            None => true,
        }
    }

    /// Poll the entity. Only sensors talk to the API; buttons and controls
    /// have nothing to refresh.
    pub async fn update(
        &mut self,
        client: &EcovacsClient,
        device: Option<&DeviceState>,
    ) -> Result<(), Error> {
        if !self.is_ready(device).await {
            return Ok(());
        }
        if !matches!(self.kind, EntityKind::Sensor { .. }) {
            return Ok(());
        }

        let data = match self.capability {
            Capability::CleanState => client.get_clean_state(&self.device_name).await?,
            Capability::ChargeState => client.get_charge_state(&self.device_name).await?,
            _ => return Ok(()),
        };
        let Some(ret) = data.get("ret") else {
            return Err(Error::InvalidResponse {
                message: format!("state not found in {}", Value::Object(data)),
            });
        };

        if ret == "ok" {
            let value = if self.capability == Capability::CleanState {
                translate_clean_state(&data)
            } else {
                translate_charge_state(&data)
            };
            if let EntityKind::Sensor { state } = &mut self.kind {
                *state = Some(value);
            }
            self.publish_payload(&data);
        }

        debug!(
            "[{}] updating {}, value is {:?}",
            self.name(),
            self.description(),
            self.state()
        );
        self.updated = true;
        Ok(())
    }

    /// Send the button's command. Pressing anything but a button fails.
    pub async fn press(
        &mut self,
        client: &EcovacsClient,
        device: Option<&DeviceState>,
    ) -> Result<(), CoreError> {
        let EntityKind::Button { command } = self.kind else {
            return Err(self.wrong_platform(Platform::Button));
        };
        if !self.is_ready(device).await {
            return Ok(());
        }

        match command {
            ButtonCommand::Clean(action) => client.clean(&self.device_name, action).await?,
            ButtonCommand::Charge(action) => client.charge(&self.device_name, action).await?,
        };

        debug!("[{}] pressed button {}", self.name(), self.description());
        self.updated = true;
        Ok(())
    }

    /// Drive the cleaning control state machine.
    ///
    /// `Start` from `Idle`/`Stopped` starts a new run, from `Paused` resumes
    /// it and is a no-op while already cleaning.
    pub async fn control(
        &mut self,
        action: ControlAction,
        client: &EcovacsClient,
        device: Option<&DeviceState>,
    ) -> Result<(), CoreError> {
        let EntityKind::Control { state } = self.kind else {
            return Err(self.wrong_platform(Platform::Control));
        };
        if !self.is_ready(device).await {
            return Ok(());
        }

        let (clean, next) = match (action, state) {
            (ControlAction::Start, ControlState::Cleaning) => (None, ControlState::Cleaning),
            (ControlAction::Start, ControlState::Paused) => {
                (Some(CleanAction::Resume), ControlState::Cleaning)
            }
            (ControlAction::Start, ControlState::Idle | ControlState::Stopped) => {
                (Some(CleanAction::Start), ControlState::Cleaning)
            }
            (ControlAction::Pause, _) => (Some(CleanAction::Pause), ControlState::Paused),
            (ControlAction::Stop, _) => (Some(CleanAction::Stop), ControlState::Stopped),
        };

        if let Some(clean) = clean {
            client.clean(&self.device_name, clean).await?;
            debug!(
                "[{}] controlled {} {clean}",
                self.name(),
                self.description()
            );
        }
        self.kind = EntityKind::Control { state: next };
        self.updated = true;
        Ok(())
    }

    fn publish_payload(&mut self, data: &ControlData) {
        for (key, value) in data {
            if key == "ret" {
                continue;
            }
            let text = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_owned);
            self.attributes.insert(key.clone(), text);
        }
    }

    fn wrong_platform(&self, platform: Platform) -> CoreError {
        CoreError::EntityNotFound {
            device: self.device_name.clone(),
            platform,
            capability: self.capability,
        }
    }
}

fn with_param(base: &str, param: &str) -> String {
    if param.is_empty() {
        base.to_owned()
    } else {
        format!("{base} {param}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_catalog() {
        let sensor = Entity::new("Robot1", Capability::CleanState, "");
        assert_eq!(sensor.kind(), &EntityKind::Sensor { state: None });

        let button = Entity::new("Robot1", Capability::ReturnDock, "");
        assert!(matches!(button.kind(), EntityKind::Button { .. }));
        assert_eq!(button.state(), None);

        let control = Entity::new("Robot1", Capability::ControlClean, "");
        assert_eq!(control.state().as_deref(), Some("Idle"));
    }

    #[test]
    fn names_and_descriptions() {
        let plain = Entity::new("Robot1", Capability::StartClean, "");
        assert_eq!(plain.name(), "startClean");
        assert_eq!(plain.description(), "[Clean] Start");

        let with_param = Entity::new("Robot1", Capability::ChargeState, "dock");
        assert_eq!(with_param.name(), "chargeState dock");
        assert_eq!(with_param.description(), "Charge state dock");
    }

    #[test]
    fn icon_attribute_is_set_on_creation() {
        let entity = Entity::new("Robot1", Capability::ChargeState, "");
        assert_eq!(entity.attributes()["icon"], "mdi:lightning-bolt");
        assert!(!entity.is_updated());
    }

    #[test]
    fn disabled_entity_is_not_ready() {
        let mut entity = Entity::new("Robot1", Capability::CleanState, "");
        let device = DeviceState::new("Robot1");
        assert!(tokio_test::block_on(entity.is_ready(Some(&device))));
        entity.set_enabled(false);
        assert!(!tokio_test::block_on(entity.is_ready(Some(&device))));
        assert!(!tokio_test::block_on(entity.is_ready(None)));
    }
}
