// ── Discovery ──
//
// Turns the account's device list into initialized `Device`s.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, error, warn};

use ecovacs_api::{EcovacsClient, Error};

use crate::device::Device;

/// Discovers the robots registered under one API key.
#[derive(Clone)]
pub struct DiscoveryService {
    client: Arc<EcovacsClient>,
}

impl DiscoveryService {
    pub fn new(client: Arc<EcovacsClient>) -> Self {
        Self { client }
    }

    /// Initialize every registered device, keyed by name.
    ///
    /// A failed device listing is returned as an error. A device that fails
    /// to initialize is logged and skipped; the remaining devices are still
    /// discovered.
    pub async fn discover_devices(&self) -> Result<IndexMap<String, Device>, Error> {
        debug!("starting discovery");
        let names = self.client.list_devices().await?;
        debug!("discovered {} registered devices", names.len());

        let mut devices = IndexMap::with_capacity(names.len());
        for name in names {
            let mut device = Device::new(Arc::clone(&self.client), name.as_str());
            match device.initialize().await {
                Ok(()) => {
                    devices.insert(name, device);
                }
                Err(e @ Error::InvalidResponse { .. }) => {
                    warn!(device = %name, error = %e, "skipping unrecognized or unsupported device");
                }
                Err(e) => {
                    error!(device = %name, title = e.title(), "skipping device: {e}");
                }
            }
        }
        Ok(devices)
    }
}
