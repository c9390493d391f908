#![allow(clippy::unwrap_used)]
// Integration tests for `DiscoveryService`.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use ecovacs_core::DiscoveryService;

use common::{mount_device_list, setup};

#[tokio::test]
async fn test_discovers_every_listed_device() {
    let (server, client) = setup().await;
    mount_device_list(&server, &["Robot1", "Robot2"]).await;

    let devices = DiscoveryService::new(client).discover_devices().await.unwrap();

    let names: Vec<&str> = devices.keys().map(String::as_str).collect();
    assert_eq!(names, ["Robot1", "Robot2"]);
    assert!(devices.values().all(|d| d.is_initialized()));
    assert_eq!(devices["Robot2"].entities().count(), 8);
}

#[tokio::test]
async fn test_empty_account_yields_no_devices() {
    let (server, client) = setup().await;
    mount_device_list(&server, &[]).await;

    let devices = DiscoveryService::new(client).discover_devices().await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_failing_device_is_skipped() {
    let (server, client) = setup().await;

    // first listing sees two robots, later listings (per-device init) only one
    Mock::given(method("GET"))
        .and(path("/robot/deviceList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0", "msg": "ok", "data": ["Robot1", "Gone"]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_device_list(&server, &["Robot1"]).await;

    let devices = DiscoveryService::new(client).discover_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert!(devices.contains_key("Robot1"));
}

#[tokio::test]
async fn test_listing_failure_propagates() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/robot/deviceList"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = DiscoveryService::new(client)
        .discover_devices()
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API error: status code 503");
}
