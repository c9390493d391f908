// ── Device ──
//
// One robot vacuum: its status, its lazily discovered entities, and the
// per-cycle refresh that updates status first and entities second.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, warn};

use ecovacs_api::{
    EcovacsClient, Error, translate_charge_state, translate_clean_state,
};

use crate::entity::{ControlAction, Entity, EntitySnapshot};
use crate::error::CoreError;
use crate::model::{Capability, Platform};

/// Status before the first read. Distinct from the translated `Unknown`,
/// which means the robot answered with a code we do not recognize.
pub const INITIAL_STATUS: &str = "unknown";

/// Device-level state that entities consult before talking to the API.
#[derive(Debug, Clone)]
pub struct DeviceState {
    name: String,
    clean_status: String,
    charge_status: String,
    enabled: bool,
}

impl DeviceState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clean_status: INITIAL_STATUS.to_owned(),
            charge_status: INITIAL_STATUS.to_owned(),
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wake a dormant robot. These robots never sleep, so this always succeeds.
    #[allow(clippy::unused_async)]
    pub async fn wakeup(&self) -> bool {
        true
    }

    pub fn is_online(&self) -> bool {
        self.clean_status != INITIAL_STATUS || self.charge_status != INITIAL_STATUS
    }
}

/// Serializable view of a device and its entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub name: String,
    pub clean_status: String,
    pub charge_status: String,
    pub online: bool,
    pub enabled: bool,
    pub initialized: bool,
    pub entities: Vec<EntitySnapshot>,
}

/// A robot vacuum addressed by its account nickname.
pub struct Device {
    client: Arc<EcovacsClient>,
    state: DeviceState,
    entities: IndexMap<Platform, Vec<Entity>>,
    initialized: bool,
    enable_control: bool,
}

impl Device {
    pub fn new(client: Arc<EcovacsClient>, name: impl Into<String>) -> Self {
        let mut entities = IndexMap::new();
        for platform in [Platform::Sensor, Platform::Button, Platform::Control] {
            entities.insert(platform, Vec::new());
        }
        Self {
            client,
            state: DeviceState::new(name),
            entities,
            initialized: false,
            enable_control: false,
        }
    }

    /// Also register the `controlClean` entity on initialization.
    pub fn with_control(mut self, enabled: bool) -> Self {
        self.enable_control = enabled;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn api_client(&self) -> &Arc<EcovacsClient> {
        &self.client
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn clean_status(&self) -> &str {
        &self.state.clean_status
    }

    pub fn charge_status(&self) -> &str {
        &self.state.charge_status
    }

    /// Online once either status has been read.
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.state.enabled = value;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// All entities, sensors first, in catalog order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().flatten()
    }

    pub fn entities_by_platform(&self, platform: Platform) -> &[Entity] {
        self.entities
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entity(&self, capability: Capability) -> Option<&Entity> {
        self.entities_by_platform(capability.platform())
            .iter()
            .find(|e| e.capability() == capability)
    }

    pub fn entity_mut(&mut self, capability: Capability) -> Option<&mut Entity> {
        self.entities
            .get_mut(&capability.platform())?
            .iter_mut()
            .find(|e| e.capability() == capability)
    }

    /// Enable or disable every entity at once.
    pub fn set_entities_enabled(&mut self, value: bool) {
        for entity in self.entities.values_mut().flatten() {
            entity.set_enabled(value);
        }
    }

    /// Enable or disable one platform's entities and return their snapshots.
    pub fn set_platform_enabled(&mut self, platform: Platform, value: bool) -> Vec<EntitySnapshot> {
        let Some(entities) = self.entities.get_mut(&platform) else {
            return Vec::new();
        };
        entities
            .iter_mut()
            .map(|entity| {
                entity.set_enabled(value);
                debug!("[{}] adding {platform} {}", self.state.name, entity.description());
                entity.snapshot()
            })
            .collect()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            name: self.state.name.clone(),
            clean_status: self.state.clean_status.clone(),
            charge_status: self.state.charge_status.clone(),
            online: self.is_online(),
            enabled: self.state.enabled,
            initialized: self.initialized,
            entities: self.entities().map(Entity::snapshot).collect(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Discover the device's entities.
    ///
    /// Fails with `InvalidResponse` when the account does not list this
    /// device. The device is marked initialized either way, so a failed
    /// discovery is never retried by `refresh`.
    pub async fn initialize(&mut self) -> Result<(), Error> {
        let result = self.populate().await;
        if let Err(e) = &result {
            error!(device = %self.state.name, title = e.title(), "{}", e.trace());
        }
        self.initialized = true;
        result
    }

    async fn populate(&mut self) -> Result<(), Error> {
        let names = self.client.list_devices().await?;
        if !names.iter().any(|n| *n == self.state.name) {
            return Err(Error::InvalidResponse {
                message: format!("Device {} doesn't exist", self.state.name),
            });
        }

        for capability in Capability::DEFAULT_CATALOG {
            self.add_entity(capability);
        }
        if self.enable_control {
            self.add_entity(Capability::ControlClean);
        }
        Ok(())
    }

    fn add_entity(&mut self, capability: Capability) {
        let platform = capability.platform();
        if self.entity(capability).is_some() {
            return;
        }
        let entity = Entity::new(self.state.name.clone(), capability, "");
        self.entities.entry(platform).or_default().push(entity);
    }

    /// Read clean and charge status from the robot.
    pub async fn refresh_status(&mut self) -> Result<(), Error> {
        let clean = self.client.get_clean_state(&self.state.name).await?;
        self.state.clean_status = translate_clean_state(&clean);

        let charge = self.client.get_charge_state(&self.state.name).await?;
        self.state.charge_status = translate_charge_state(&charge);
        Ok(())
    }

    /// Run one poll cycle.
    ///
    /// Returns `false` without any network call when the device is
    /// disabled. Entities are updated one at a time, in catalog order, and
    /// only while the device is online.
    pub async fn refresh(&mut self) -> Result<bool, Error> {
        if !self.state.enabled {
            return Ok(false);
        }
        if !self.initialized {
            if let Err(e) = self.initialize().await {
                warn!(device = %self.state.name, error = %e, "continuing without entities");
            }
        }
        debug!("[{}] update requested", self.state.name);

        self.refresh_status().await?;

        if self.state.is_online() {
            for entity in self.entities.values_mut().flatten() {
                entity.update(&self.client, Some(&self.state)).await?;
            }
        }
        Ok(true)
    }

    /// Wake the robot. Reserved for models that sleep between commands.
    pub async fn wakeup(&self) -> bool {
        self.state.wakeup().await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Press a button entity.
    pub async fn press(&mut self, capability: Capability) -> Result<(), CoreError> {
        let entity = self
            .entities
            .get_mut(&Platform::Button)
            .and_then(|buttons| buttons.iter_mut().find(|e| e.capability() == capability))
            .ok_or_else(|| CoreError::EntityNotFound {
                device: self.state.name.clone(),
                platform: Platform::Button,
                capability,
            })?;
        entity.press(&self.client, Some(&self.state)).await
    }

    /// Send a request to a control entity.
    pub async fn control(
        &mut self,
        capability: Capability,
        action: ControlAction,
    ) -> Result<(), CoreError> {
        let entity = self
            .entities
            .get_mut(&Platform::Control)
            .and_then(|controls| controls.iter_mut().find(|e| e.capability() == capability))
            .ok_or_else(|| CoreError::EntityNotFound {
                device: self.state.name.clone(),
                platform: Platform::Control,
                capability,
            })?;
        entity.control(action, &self.client, Some(&self.state)).await
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.state.name)
            .field("clean_status", &self.state.clean_status)
            .field("charge_status", &self.state.charge_status)
            .field("initialized", &self.initialized)
            .field("entities", &self.entities().count())
            .finish_non_exhaustive()
    }
}
