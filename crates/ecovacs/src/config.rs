//! CLI configuration: thin wrapper around `ecovacs_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --api-key, --device).
//! Without `--api-key`, entry keys resolve through `api_key_env`, then
//! `ECOVACS_API_KEY`, then the plaintext key.

use std::time::Duration;

use secrecy::SecretString;

use ecovacs_api::DEFAULT_API_URL;
use ecovacs_core::EntryConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ecovacs_config::{
    API_KEY_ENV, Config, Entry, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active entry name from CLI flags and config.
pub fn active_entry_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .entry
        .clone()
        .or_else(|| config.default_entry.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the runtime configuration for the active entry.
///
/// With a matching config entry, flags override its values. Without one,
/// the entry is assembled from flags alone; `require_device` controls
/// whether `--device` must then be present.
pub fn build_entry_config(
    global: &GlobalOpts,
    require_device: bool,
) -> Result<(String, EntryConfig), CliError> {
    let cfg = load_config_or_default();
    let name = active_entry_name(global, &cfg);

    let mut config = if let Some(entry) = cfg.entries.get(&name) {
        resolve_entry(entry, &name, &cfg, global)?
    } else if global.entry.is_some() {
        return Err(CliError::EntryNotFound {
            name,
            available: available_entries(&cfg),
        });
    } else {
        from_flags(global, &name, &cfg, require_device)?
    };

    if let Some(secs) = global.timeout {
        config.api_timeout = Some(Duration::from_secs(secs));
    }
    config.log_http_requests |= global.log_http;
    if global.no_redact {
        config.redact_log_messages = false;
    }

    Ok((name, config))
}

/// Translate a file `Entry` + global flags into an `EntryConfig`.
fn resolve_entry(
    entry: &Entry,
    entry_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<EntryConfig, CliError> {
    let mut entry = entry.clone();
    if let Some(ref url) = global.api_url {
        entry.api_url.clone_from(url);
    }
    if let Some(ref device) = global.device {
        entry.device_name.clone_from(device);
    }
    // an explicit --api-key wins over every configured key source
    if let Some(ref key) = global.api_key {
        entry.api_key = Some(key.clone());
        entry.api_key_env = None;
    }

    Ok(ecovacs_config::entry_to_config(&entry, entry_name, &cfg.defaults)?)
}

fn from_flags(
    global: &GlobalOpts,
    entry_name: &str,
    cfg: &Config,
    require_device: bool,
) -> Result<EntryConfig, CliError> {
    let device_name = match global.device.clone() {
        Some(device) => device,
        None if require_device => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        None => String::new(),
    };

    let api_url = global.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    url::Url::parse(api_url).map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {api_url}"),
    })?;

    let api_key = global
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            entry: entry_name.to_owned(),
        })?;

    Ok(EntryConfig {
        api_url: api_url.to_owned(),
        api_key,
        device_name,
        api_timeout: None,
        scan_interval: Duration::from_secs(cfg.defaults.scan_interval),
        log_http_requests: cfg.defaults.log_http_requests,
        redact_log_messages: cfg.defaults.redact_log_messages,
        enable_control: false,
    })
}

pub fn available_entries(cfg: &Config) -> String {
    if cfg.entries.is_empty() {
        "(none)".into()
    } else {
        cfg.entries.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
