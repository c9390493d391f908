// Shared wiremock fixtures for the core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ecovacs_api::EcovacsClient;

pub const API_KEY: &str = "test-key";

pub async fn setup() -> (MockServer, Arc<EcovacsClient>) {
    let server = MockServer::start().await;
    let client = EcovacsClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        SecretString::from(API_KEY),
    )
    .unwrap();
    (server, Arc::new(client))
}

pub async fn mount_device_list(server: &MockServer, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/robot/deviceList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0", "msg": "ok", "data": names
        })))
        .mount(server)
        .await;
}

/// Mount a `robot/ctl` responder for one `cmd` (and optionally one `act`).
pub async fn mount_ctl(server: &MockServer, cmd: &str, act: Option<&str>, inner: Value) {
    let mut body = json!({ "cmd": cmd });
    if let Some(act) = act {
        body["act"] = json!(act);
    }
    Mock::given(method("POST"))
        .and(path("/robot/ctl"))
        .and(body_partial_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0", "msg": "ok", "data": { "ctl": { "data": inner } }
        })))
        .mount(server)
        .await;
}

pub async fn mount_states(server: &MockServer, st: &str, charge: &str) {
    mount_ctl(server, "GetCleanState", None, json!({ "ret": "ok", "st": st })).await;
    mount_ctl(server, "GetChargeState", None, json!({ "ret": "ok", "type": charge })).await;
}

/// Number of `robot/ctl` requests carrying the given `cmd`.
pub async fn ctl_calls(server: &MockServer, cmd: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/robot/ctl")
        .filter(|r| {
            serde_json::from_slice::<Value>(&r.body)
                .map(|b| b["cmd"] == cmd)
                .unwrap_or(false)
        })
        .count()
}
