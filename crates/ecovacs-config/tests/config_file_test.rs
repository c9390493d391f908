#![allow(clippy::unwrap_used)]
// File round-trips for the TOML config.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use ecovacs_config::{ApiTimeout, Config, Entry, entry_to_config, load_config_from, save_config_to};

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_config_from(&dir.path().join("config.toml")).unwrap();

    assert_eq!(config.default_entry.as_deref(), Some("default"));
    assert_eq!(config.defaults.scan_interval, 15);
    assert_eq!(config.defaults.output, "table");
    assert!(config.entries.is_empty());
}

#[test]
fn test_reads_entries_and_string_timeouts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_entry = "living-room"

[defaults]
scan_interval = 20

[entries.living-room]
device_name = "Robot1"
api_key = "k1"
api_timeout = ""

[entries.upstairs]
api_url = "https://example.test"
device_name = "Robot2"
api_key = "k2"
api_timeout = 7
scan_interval = 60
enable_control = true
"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.default_entry.as_deref(), Some("living-room"));

    let living = &config.entries["living-room"];
    assert_eq!(living.api_url, "https://open.ecovacs.cn");
    assert_eq!(living.api_timeout, Some(ApiTimeout::Text(String::new())));
    let runtime = entry_to_config(living, "living-room", &config.defaults).unwrap();
    assert_eq!(runtime.api_timeout, None);
    assert_eq!(runtime.scan_interval, Duration::from_secs(20));

    let upstairs = &config.entries["upstairs"];
    let runtime = entry_to_config(upstairs, "upstairs", &config.defaults).unwrap();
    assert_eq!(runtime.api_url, "https://example.test");
    assert_eq!(runtime.api_timeout, Some(Duration::from_secs(7)));
    assert_eq!(runtime.scan_interval, Duration::from_secs(60));
    assert!(runtime.enable_control);
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    let mut entry = Entry::new("https://open.ecovacs.cn", "Robot1");
    entry.api_key = Some("secret".into());
    entry.name = Some("Kitchen".into());
    config.entries.insert("default".into(), entry);
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let entry = &loaded.entries["default"];
    assert_eq!(entry.device_name, "Robot1");
    assert_eq!(entry.name.as_deref(), Some("Kitchen"));
    assert_eq!(entry.api_key.as_deref(), Some("secret"));
}
