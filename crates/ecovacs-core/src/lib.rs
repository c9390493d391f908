//! Device and entity layer between `ecovacs-api` and hosts (CLI, automation).
//!
//! - **[`Device`]**: one robot vacuum. [`initialize()`](Device::initialize)
//!   discovers its entities from the fixed [`Capability`] catalog;
//!   [`refresh()`](Device::refresh) reads clean/charge status and then updates
//!   every entity in catalog order.
//!
//! - **[`Entity`]**: a sensor, button or control bound to one capability.
//!   Disabled entities never touch the network.
//!
//! - **[`DiscoveryService`]**: turns the account's device list into
//!   initialized devices.
//!
//! - **[`Coordinator`]**: owns a device and polls it on the scan interval in
//!   a background task, recording the outcome of each cycle.
//!
//! - **[`Runtime`]**: per-entry registry with setup/unload lifecycle.

pub mod config;
pub mod coordinator;
pub mod device;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod model;
pub mod runtime;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_SCAN_INTERVAL, EntryConfig};
pub use coordinator::{Coordinator, UpdateStatus};
pub use device::{Device, DeviceSnapshot, DeviceState, INITIAL_STATUS};
pub use discovery::DiscoveryService;
pub use entity::{ControlAction, ControlState, Entity, EntityKind, EntitySnapshot};
pub use error::CoreError;
pub use model::{ButtonCommand, Capability, Platform};
pub use runtime::Runtime;
