// ── Runtime context ──
//
// Per-entry registry of running coordinators. Hosts construct one
// `Runtime`, set entries up and tear them down through it; nothing here is
// process-global.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::EntryConfig;
use crate::coordinator::Coordinator;
use crate::device::{Device, DeviceSnapshot};
use crate::entity::{ControlAction, EntitySnapshot};
use crate::error::CoreError;
use crate::model::{Capability, Platform};

/// Registry of loaded entries, keyed by entry id.
#[derive(Default)]
pub struct Runtime {
    entries: Mutex<IndexMap<String, Coordinator>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one entry: build the client and device, discover entities, run
    /// the first refresh and start polling.
    ///
    /// Entities start disabled; hosts enable them per platform with
    /// [`add_platform_entities`](Self::add_platform_entities). A failed
    /// first refresh yields [`CoreError::NotReady`].
    pub async fn setup_entry(
        &self,
        entry_id: &str,
        config: EntryConfig,
    ) -> Result<Coordinator, CoreError> {
        if self.entries.lock().await.contains_key(entry_id) {
            return Err(CoreError::EntryAlreadyLoaded {
                entry_id: entry_id.to_owned(),
            });
        }
        debug!("loading entry {entry_id}");
        debug!("setting up device {}", config.device_name);

        let client = config.build_client()?;
        let mut device = Device::new(Arc::new(client), config.device_name.as_str())
            .with_control(config.enable_control);
        device.initialize().await?;
        device.set_entities_enabled(false);

        let coordinator = Coordinator::new(device, config.scan_interval);
        if let Err(e) = coordinator.refresh().await {
            return Err(CoreError::NotReady {
                entry_id: entry_id.to_owned(),
                reason: e.to_string(),
            });
        }

        {
            let mut entries = self.entries.lock().await;
            if entries.contains_key(entry_id) {
                return Err(CoreError::EntryAlreadyLoaded {
                    entry_id: entry_id.to_owned(),
                });
            }
            entries.insert(entry_id.to_owned(), coordinator.clone());
        }
        coordinator.start().await;
        info!(entry = entry_id, device = %coordinator.device_name(), "entry loaded");
        Ok(coordinator)
    }

    /// Enable a platform's entities once the host has registered them.
    pub async fn add_platform_entities(
        &self,
        entry_id: &str,
        platform: Platform,
    ) -> Result<Vec<EntitySnapshot>, CoreError> {
        let coordinator = self.coordinator(entry_id).await?;
        Ok(coordinator.set_platform_enabled(platform, true).await)
    }

    pub async fn press(&self, entry_id: &str, capability: Capability) -> Result<(), CoreError> {
        let coordinator = self.coordinator(entry_id).await?;
        coordinator.press(capability).await?;
        debug!("[{}] pressed {capability}", coordinator.device_name());
        Ok(())
    }

    pub async fn control(
        &self,
        entry_id: &str,
        capability: Capability,
        action: ControlAction,
    ) -> Result<(), CoreError> {
        self.coordinator(entry_id)
            .await?
            .control(capability, action)
            .await
    }

    pub async fn snapshot(&self, entry_id: &str) -> Result<DeviceSnapshot, CoreError> {
        Ok(self.coordinator(entry_id).await?.snapshot().await)
    }

    pub async fn entry_ids(&self) -> Vec<String> {
        self.entries.lock().await.keys().cloned().collect()
    }

    pub async fn coordinator(&self, entry_id: &str) -> Result<Coordinator, CoreError> {
        self.entries
            .lock()
            .await
            .get(entry_id)
            .cloned()
            .ok_or_else(|| CoreError::EntryNotFound {
                entry_id: entry_id.to_owned(),
            })
    }

    /// Stop polling and drop the entry.
    pub async fn unload_entry(&self, entry_id: &str) -> Result<(), CoreError> {
        debug!("unloading entry {entry_id}");
        let coordinator = self
            .entries
            .lock()
            .await
            .shift_remove(entry_id)
            .ok_or_else(|| CoreError::EntryNotFound {
                entry_id: entry_id.to_owned(),
            })?;
        coordinator.shutdown().await;
        Ok(())
    }

    /// Unload then set up again with a (possibly changed) config.
    pub async fn reload_entry(
        &self,
        entry_id: &str,
        config: EntryConfig,
    ) -> Result<Coordinator, CoreError> {
        self.unload_entry(entry_id).await?;
        self.setup_entry(entry_id, config).await
    }

    /// Unload every entry.
    pub async fn shutdown(&self) {
        let coordinators: Vec<Coordinator> = self
            .entries
            .lock()
            .await
            .drain(..)
            .map(|(_, c)| c)
            .collect();
        for coordinator in coordinators {
            coordinator.shutdown().await;
        }
    }
}
