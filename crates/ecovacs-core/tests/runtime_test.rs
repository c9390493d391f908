#![allow(clippy::unwrap_used)]
// Integration tests for `Runtime` and `Coordinator`.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::MockServer;

use ecovacs_core::{Capability, Coordinator, CoreError, Device, EntryConfig, Platform, Runtime};

use common::{API_KEY, ctl_calls, mount_ctl, mount_device_list, mount_states, setup};

fn entry(server: &MockServer, scan_interval: Duration) -> EntryConfig {
    EntryConfig {
        api_url: server.uri(),
        api_key: SecretString::from(API_KEY),
        device_name: "Robot1".into(),
        api_timeout: Some(Duration::from_secs(2)),
        scan_interval,
        ..EntryConfig::default()
    }
}

// ── Setup / unload ──────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_entry_starts_with_disabled_entities() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_states(&server, "p", "Idle").await;

    let runtime = Runtime::new();
    let coordinator = runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap();

    assert!(coordinator.last_update_success());
    assert!(coordinator.last_updated().is_some());

    let snapshot = runtime.snapshot("entry-1").await.unwrap();
    assert_eq!(snapshot.name, "Robot1");
    assert_eq!(snapshot.clean_status, "Paused");
    assert_eq!(snapshot.charge_status, "Idle");
    assert!(snapshot.online);
    assert!(snapshot.entities.iter().all(|e| !e.enabled));
    // entities disabled: only the two status reads
    assert_eq!(ctl_calls(&server, "GetCleanState").await, 1);

    assert_eq!(runtime.entry_ids().await, vec!["entry-1".to_owned()]);
}

#[tokio::test]
async fn test_add_platform_entities_enables_them() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_states(&server, "s", "Idle").await;

    let runtime = Runtime::new();
    let coordinator = runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap();

    let sensors = runtime
        .add_platform_entities("entry-1", Platform::Sensor)
        .await
        .unwrap();
    assert_eq!(sensors.len(), 2);
    assert!(sensors.iter().all(|s| s.enabled));

    coordinator.refresh().await.unwrap();
    let snapshot = runtime.snapshot("entry-1").await.unwrap();
    let clean = snapshot
        .entities
        .iter()
        .find(|e| e.capability == Capability::CleanState)
        .unwrap();
    assert_eq!(clean.state.as_deref(), Some("Cleaning"));
    assert!(clean.updated);
}

#[tokio::test]
async fn test_press_requires_enabled_button() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_states(&server, "h", "Idle").await;
    mount_ctl(&server, "Clean", Some("s"), json!({ "ret": "ok" })).await;

    let runtime = Runtime::new();
    runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap();

    runtime.press("entry-1", Capability::StartClean).await.unwrap();
    assert_eq!(ctl_calls(&server, "Clean").await, 0);

    runtime
        .add_platform_entities("entry-1", Platform::Button)
        .await
        .unwrap();
    runtime.press("entry-1", Capability::StartClean).await.unwrap();
    assert_eq!(ctl_calls(&server, "Clean").await, 1);
}

#[tokio::test]
async fn test_duplicate_and_missing_entries() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_states(&server, "h", "Idle").await;

    let runtime = Runtime::new();
    runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap();

    let err = runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::EntryAlreadyLoaded { .. }), "{err:?}");

    runtime.unload_entry("entry-1").await.unwrap();
    assert!(runtime.entry_ids().await.is_empty());

    let err = runtime.unload_entry("entry-1").await.unwrap_err();
    assert!(matches!(err, CoreError::EntryNotFound { .. }), "{err:?}");
    let err = runtime.snapshot("entry-1").await.unwrap_err();
    assert_eq!(err.title(), "entry_not_found");
}

#[tokio::test]
async fn test_setup_unknown_device_fails() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot2"]).await;

    let err = Runtime::new()
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.title(), "invalid_response");
}

#[tokio::test]
async fn test_failed_first_refresh_is_not_ready() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_ctl(&server, "GetCleanState", None, json!({ "ret": "offline" })).await;

    let runtime = Runtime::new();
    let err = runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotReady { .. }), "{err:?}");
    assert!(runtime.entry_ids().await.is_empty());
}

#[tokio::test]
async fn test_reload_entry() {
    let server = MockServer::start().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_states(&server, "h", "Idle").await;

    let runtime = Runtime::new();
    runtime
        .setup_entry("entry-1", entry(&server, Duration::ZERO))
        .await
        .unwrap();
    let reloaded = runtime
        .reload_entry("entry-1", entry(&server, Duration::from_secs(30)))
        .await
        .unwrap();
    assert_eq!(reloaded.scan_interval(), Duration::from_secs(30));

    runtime.shutdown().await;
    assert!(runtime.entry_ids().await.is_empty());
}

// ── Coordinator ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_coordinator_records_failure() {
    let (server, client) = setup().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_ctl(&server, "GetCleanState", None, json!({ "ret": "fail" })).await;

    let coordinator = Coordinator::new(Device::new(client, "Robot1"), Duration::ZERO);
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, CoreError::UpdateFailed { .. }), "{err:?}");
    assert_eq!(err.title(), "command_error");
    assert!(!coordinator.last_update_success());
    assert!(coordinator.last_updated().is_some());
}

#[tokio::test]
async fn test_coordinator_polls_until_shutdown() {
    let (server, client) = setup().await;
    mount_device_list(&server, &["Robot1"]).await;
    mount_states(&server, "s", "Idle").await;

    let coordinator = Coordinator::new(Device::new(client, "Robot1"), Duration::from_millis(50));
    let mut updates = coordinator.subscribe();
    coordinator.start().await;

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(updates.borrow().last_update_success);

    coordinator.shutdown().await;
    let polled = ctl_calls(&server, "GetCleanState").await;
    assert!(polled >= 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(ctl_calls(&server, "GetCleanState").await, polled);
}
