// ── Polling coordinator ──
//
// Owns one `Device` and drives its refresh on a fixed interval. The device
// sits behind an async mutex, so a poll cycle and a button press never
// interleave and cycles never overlap.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::device::{Device, DeviceSnapshot};
use crate::entity::{ControlAction, EntitySnapshot};
use crate::error::CoreError;
use crate::model::{Capability, Platform};

/// Outcome of the most recent poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStatus {
    pub last_update_success: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Polls one device. Cheaply cloneable.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("device_name", &self.inner.device_name)
            .field("scan_interval", &self.inner.scan_interval)
            .finish_non_exhaustive()
    }
}

struct CoordinatorInner {
    device_name: String,
    device: Mutex<Device>,
    scan_interval: Duration,
    status: watch::Sender<UpdateStatus>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    pub fn new(device: Device, scan_interval: Duration) -> Self {
        let (status, _) = watch::channel(UpdateStatus::default());
        debug!(
            "initialized coordinator, scan interval {} seconds",
            scan_interval.as_secs()
        );
        Self {
            inner: Arc::new(CoordinatorInner {
                device_name: device.name().to_owned(),
                device: Mutex::new(device),
                scan_interval,
                status,
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.inner.device_name
    }

    pub fn scan_interval(&self) -> Duration {
        self.inner.scan_interval
    }

    /// Exclusive access to the device, waiting for any running cycle.
    pub async fn device(&self) -> MutexGuard<'_, Device> {
        self.inner.device.lock().await
    }

    pub fn status(&self) -> UpdateStatus {
        *self.inner.status.borrow()
    }

    pub fn last_update_success(&self) -> bool {
        self.status().last_update_success
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.status().last_updated
    }

    /// Receiver notified after every poll cycle.
    pub fn subscribe(&self) -> watch::Receiver<UpdateStatus> {
        self.inner.status.subscribe()
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Run one poll cycle and record its outcome.
    pub async fn refresh(&self) -> Result<bool, CoreError> {
        let result = self.inner.device.lock().await.refresh().await;
        let success = result.is_ok();
        self.inner.status.send_replace(UpdateStatus {
            last_update_success: success,
            last_updated: Some(Utc::now()),
        });

        result.map_err(|source| {
            error!(device = %self.inner.device_name, title = source.title(), "{}", source.trace());
            CoreError::UpdateFailed {
                device: self.inner.device_name.clone(),
                source,
            }
        })
    }

    /// Spawn the background poller. A zero interval disables polling.
    pub async fn start(&self) {
        let period = self.inner.scan_interval;
        if period.is_zero() {
            debug!(device = %self.inner.device_name, "polling disabled");
            return;
        }
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            return;
        }
        *task = Some(tokio::spawn(refresh_task(
            self.clone(),
            period,
            self.inner.cancel.clone(),
        )));
    }

    /// Stop the background poller and wait for it to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        debug!(device = %self.inner.device_name, "coordinator stopped");
    }

    // ── Entity access ────────────────────────────────────────────────

    pub async fn press(&self, capability: Capability) -> Result<(), CoreError> {
        self.device().await.press(capability).await
    }

    pub async fn control(
        &self,
        capability: Capability,
        action: ControlAction,
    ) -> Result<(), CoreError> {
        self.device().await.control(capability, action).await
    }

    pub async fn snapshot(&self) -> DeviceSnapshot {
        self.device().await.snapshot()
    }

    pub async fn set_platform_enabled(&self, platform: Platform, value: bool) -> Vec<EntitySnapshot> {
        self.device().await.set_platform_enabled(platform, value)
    }
}

/// Periodic refresh until cancelled. Failures are logged by `refresh` and
/// retried on the next tick.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                debug!(device = %coordinator.device_name(), "refresh tick");
                let _ = coordinator.refresh().await;
            }
        }
    }
}
