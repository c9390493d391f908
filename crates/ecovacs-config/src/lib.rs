//! Shared configuration for the ecovacs tools.
//!
//! TOML entries (one per robot), API key resolution (env + plaintext),
//! and translation to `ecovacs_core::EntryConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ecovacs_api::DEFAULT_API_URL;
use ecovacs_core::EntryConfig;

/// Environment variable consulted for the API key when an entry names none.
pub const API_KEY_ENV: &str = "ECOVACS_API_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for entry '{entry}'")]
    NoCredentials { entry: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Entry used when `--entry` is not given.
    pub default_entry: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Configured robots, keyed by entry id.
    #[serde(default)]
    pub entries: BTreeMap<String, Entry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_entry: Some("default".into()),
            defaults: Defaults::default(),
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Polling interval in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(default)]
    pub log_http_requests: bool,

    #[serde(default = "default_true")]
    pub redact_log_messages: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            scan_interval: default_scan_interval(),
            log_http_requests: false,
            redact_log_messages: true,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_scan_interval() -> u64 {
    ecovacs_core::DEFAULT_SCAN_INTERVAL.as_secs()
}
fn default_true() -> bool {
    true
}
fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

/// Request timeout as stored in the file: seconds, or a string where
/// empty means "keep the client default".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ApiTimeout {
    Seconds(u64),
    Text(String),
}

/// One configured robot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entry {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Account nickname of the robot.
    pub device_name: String,

    /// Display name chosen in the setup wizard.
    pub name: Option<String>,

    pub api_timeout: Option<ApiTimeout>,

    /// Override the default scan interval (seconds).
    pub scan_interval: Option<u64>,

    /// Register the cleaning control entity.
    #[serde(default)]
    pub enable_control: bool,
}

impl Entry {
    pub fn new(api_url: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: None,
            api_key_env: None,
            device_name: device_name.into(),
            name: None,
            api_timeout: None,
            scan_interval: None,
            enable_control: false,
        }
    }

    /// The timeout override, if any.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match &self.api_timeout {
            None => Ok(None),
            Some(ApiTimeout::Seconds(secs)) => Ok(Some(Duration::from_secs(*secs))),
            Some(ApiTimeout::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(ApiTimeout::Text(text)) => text
                .trim()
                .parse::<u64>()
                .map(|secs| Some(Duration::from_secs(secs)))
                .map_err(|_| ConfigError::Validation {
                    field: "api_timeout".into(),
                    reason: format!("expected a number of seconds, got '{text}'"),
                }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("cn", "ecovacs", "ecovacs").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ecovacs");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layering `ECOVACS_`-prefixed environment
/// variables on top (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ECOVACS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the API key: `api_key_env` variable, then `ECOVACS_API_KEY`,
/// then the plaintext `api_key`.
pub fn resolve_api_key(entry: &Entry, entry_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = entry.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var(API_KEY_ENV) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref key) = entry.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        entry: entry_name.into(),
    })
}

/// Build an `EntryConfig` from a file entry, no CLI flag overrides.
pub fn entry_to_config(
    entry: &Entry,
    entry_name: &str,
    defaults: &Defaults,
) -> Result<EntryConfig, ConfigError> {
    url::Url::parse(&entry.api_url).map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {}", entry.api_url),
    })?;

    if entry.device_name.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "device_name".into(),
            reason: "must not be empty".into(),
        });
    }

    let api_key = resolve_api_key(entry, entry_name)?;
    let scan_interval = Duration::from_secs(entry.scan_interval.unwrap_or(defaults.scan_interval));

    Ok(EntryConfig {
        api_url: entry.api_url.clone(),
        api_key,
        device_name: entry.device_name.clone(),
        api_timeout: entry.timeout()?,
        scan_interval,
        log_http_requests: defaults.log_http_requests,
        redact_log_messages: defaults.redact_log_messages,
        enable_control: entry.enable_control,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn empty_timeout_means_no_override() {
        let mut entry = Entry::new(DEFAULT_API_URL, "Robot1");
        assert_eq!(entry.timeout().unwrap(), None);

        entry.api_timeout = Some(ApiTimeout::Text(String::new()));
        assert_eq!(entry.timeout().unwrap(), None);

        entry.api_timeout = Some(ApiTimeout::Text("20".into()));
        assert_eq!(entry.timeout().unwrap(), Some(Duration::from_secs(20)));

        entry.api_timeout = Some(ApiTimeout::Seconds(5));
        assert_eq!(entry.timeout().unwrap(), Some(Duration::from_secs(5)));

        entry.api_timeout = Some(ApiTimeout::Text("soon".into()));
        assert!(matches!(
            entry.timeout(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn api_key_env_wins_over_plaintext() {
        let mut entry = Entry::new(DEFAULT_API_URL, "Robot1");
        entry.api_key = Some("plain".into());
        entry.api_key_env = Some("CARGO_PKG_NAME".into());

        let key = resolve_api_key(&entry, "default").unwrap();
        assert_eq!(key.expose_secret(), env!("CARGO_PKG_NAME"));
    }

    #[test]
    fn missing_key_is_no_credentials() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let entry = Entry::new(DEFAULT_API_URL, "Robot1");
        let err = resolve_api_key(&entry, "living-room").unwrap_err();
        assert_eq!(err.to_string(), "no API key configured for entry 'living-room'");
    }

    #[test]
    fn entry_translates_to_runtime_config() {
        let mut entry = Entry::new("https://open.ecovacs.cn", "Robot1");
        entry.api_key = Some("k".into());
        entry.scan_interval = Some(30);
        entry.api_timeout = Some(ApiTimeout::Seconds(4));

        let config = entry_to_config(&entry, "default", &Defaults::default()).unwrap();
        assert_eq!(config.device_name, "Robot1");
        assert_eq!(config.scan_interval, Duration::from_secs(30));
        assert_eq!(config.api_timeout, Some(Duration::from_secs(4)));
        assert!(config.redact_log_messages);
        assert!(!config.enable_control);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let mut entry = Entry::new("not a url", "Robot1");
        entry.api_key = Some("k".into());
        let err = entry_to_config(&entry, "default", &Defaults::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid api_url: invalid URL: not a url");
    }
}
