// ── Core error types ──
//
// Errors surfaced by the device/entity layer and the runtime context.
// API failures are wrapped unchanged so hosts can still read the stable
// `title()` of the underlying `ecovacs_api::Error`.

use thiserror::Error;

use crate::model::{Capability, Platform};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API errors (wrapped) ─────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] ecovacs_api::Error),

    // ── Lifecycle errors ─────────────────────────────────────────────
    /// Setup could not complete its first refresh; the host should retry later.
    #[error("Entry {entry_id} is not ready: {reason}")]
    NotReady { entry_id: String, reason: String },

    /// A poll cycle failed.
    #[error("Update failed for {device}: {source}")]
    UpdateFailed {
        device: String,
        #[source]
        source: ecovacs_api::Error,
    },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: String },

    #[error("Entry already loaded: {entry_id}")]
    EntryAlreadyLoaded { entry_id: String },

    #[error("Device {device} has no {platform} entity {capability}")]
    EntityNotFound {
        device: String,
        platform: Platform,
        capability: Capability,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Stable machine-readable title, delegating to the API error when wrapped.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Api(e) | Self::UpdateFailed { source: e, .. } => e.title(),
            Self::NotReady { .. } => "not_ready",
            Self::EntryNotFound { .. } => "entry_not_found",
            Self::EntryAlreadyLoaded { .. } => "entry_already_loaded",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::Config { .. } => "invalid_configuration",
        }
    }

    /// The wrapped API error, if any.
    pub fn api_error(&self) -> Option<&ecovacs_api::Error> {
        match self {
            Self::Api(e) | Self::UpdateFailed { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
