// Ecovacs open API HTTP client
//
// Wraps `reqwest::Client` with the vendor's connection gate, API key
// injection, and `{code, msg, data}` envelope validation. The robot
// operations live in `robot.rs` as inherent methods so this module stays
// focused on transport mechanics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, error};
use url::Url;

use crate::error::Error;
use crate::models::{API_KEY_PARAM, ControlData, MAX_RETRIES, scalar_to_string};
use crate::redact::redact;
use crate::transport::TransportConfig;

/// Raw HTTP client for the Ecovacs open API.
///
/// The remote side has no session token: [`connect`](Self::connect) only
/// flips a gate. Every request carries the API key as the `ak` parameter.
/// Cheap to share behind an `Arc`; the connection gate and retry counter
/// are atomics so all calls take `&self`.
pub struct EcovacsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    timeout: Duration,
    log_http_requests: bool,
    redact_log_messages: bool,
    connected: AtomicBool,
    retries: AtomicU32,
}

impl EcovacsClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url, api_key)?;
        client.timeout = transport.timeout;
        Ok(client)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: SecretString,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        debug!(url = %base_url, "initialized Ecovacs client");
        Ok(Self {
            http,
            base_url,
            api_key,
            timeout: TransportConfig::default().timeout,
            log_http_requests: false,
            redact_log_messages: true,
            connected: AtomicBool::new(false),
            retries: AtomicU32::new(0),
        })
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_base_url(&mut self, value: &str) -> Result<(), Error> {
        self.base_url = Url::parse(value)?;
        debug!(url = %self.base_url, "set endpoint URL");
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, value: Duration) {
        self.timeout = value;
        debug!(timeout_secs = value.as_secs(), "set API timeout");
    }

    /// Also dump HTTP requests and responses to the debug log.
    pub fn set_log_http_requests(&mut self, value: bool) {
        self.log_http_requests = value;
    }

    /// Mask sensitive fields in HTTP dumps (on by default).
    pub fn set_redact_log_messages(&mut self, value: bool) {
        self.redact_log_messages = value;
    }

    // ── Connection gate ──────────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Failed connection attempts since the last successful connect.
    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::Acquire)
    }

    /// Open the connection gate.
    ///
    /// The server needs no access token, so this never fails today; the
    /// signature leaves room for a real credential exchange.
    #[allow(clippy::unused_async)]
    pub async fn connect(&self) -> Result<(), Error> {
        if self.is_connected() {
            return Ok(());
        }
        self.connected.store(true, Ordering::Release);
        self.retries.store(0, Ordering::Release);
        debug!("connected");
        Ok(())
    }

    #[allow(clippy::unused_async)]
    pub async fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        debug!("disconnected");
    }

    pub async fn reconnect(&self) -> Result<(), Error> {
        self.disconnect().await;
        self.connect().await
    }

    /// Open the gate if needed, giving up after [`MAX_RETRIES`] failures.
    async fn ensure_connected(&self) -> Result<(), Error> {
        while !self.is_connected() {
            let attempt = self.retries();
            debug!("connection attempt {}/{}", attempt + 1, MAX_RETRIES);
            if attempt >= MAX_RETRIES {
                error!("too many unsuccessful connection attempts");
                break;
            }
            if let Err(e) = self.connect().await {
                error!(title = e.title(), "{}", e.trace());
                self.retries.fetch_add(1, Ordering::AcqRel);
            }
        }
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build `{base}/{endpoint}`.
    pub(crate) fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{endpoint}"))?)
    }

    /// Stringify every payload value and append the API key.
    ///
    /// An `ak` already present in `payload` is overwritten so the key is
    /// sent exactly once.
    pub fn build_params(&self, payload: &Map<String, Value>) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = payload
            .iter()
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect();
        params.insert(
            API_KEY_PARAM.to_owned(),
            self.api_key.expose_secret().to_owned(),
        );
        params
    }

    fn log_message(&self, data: &str) -> String {
        if self.redact_log_messages {
            redact(data)
        } else {
            data.to_owned()
        }
    }

    /// Submit a request and return the validated envelope.
    ///
    /// Fails with `ConnectionFailed` on transport errors, `Api` on a non-200
    /// status or non-zero `code`, and `InvalidResponse` when the body is not
    /// JSON or lacks `msg`/`code`.
    pub async fn call_api_envelope(
        &self,
        endpoint: &str,
        payload: &Map<String, Value>,
        method: Method,
    ) -> Result<Value, Error> {
        self.ensure_connected().await?;

        let url = self.endpoint_url(endpoint)?;
        let params = self.build_params(payload);

        if self.log_http_requests {
            let dump = serde_json::to_string(&params).unwrap_or_default();
            debug!("[HTTP_REQUEST] {url}: {}", self.log_message(&dump));
        }

        let builder = if method == Method::GET {
            self.http.get(url).query(&params)
        } else {
            self.http.request(method, url).json(&params)
        };
        let resp = builder.timeout(self.timeout).send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        if self.log_http_requests {
            debug!("[HTTP_RESPONSE] {status}: {}", self.log_message(&body));
        }

        if status != reqwest::StatusCode::OK {
            return Err(Error::Api {
                message: format!("status code {}", status.as_u16()),
            });
        }

        parse_envelope(&body)
    }

    /// Submit a request and return the envelope's `data` (empty map when
    /// absent).
    pub async fn call_api(
        &self,
        endpoint: &str,
        payload: &Map<String, Value>,
        method: Method,
    ) -> Result<Value, Error> {
        let mut envelope = self.call_api_envelope(endpoint, payload, method).await?;
        Ok(envelope
            .get_mut("data")
            .map_or_else(|| Value::Object(Map::new()), Value::take))
    }
}

/// Validate the outer `{code, msg, data}` envelope.
pub(crate) fn parse_envelope(body: &str) -> Result<Value, Error> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|_| Error::invalid_response(format!("unable to parse response text {body}")))?;

    let (Some(msg), Some(code)) = (envelope.get("msg"), envelope.get("code")) else {
        return Err(Error::invalid_response(format!(
            "cannot find msg, code in {envelope}"
        )));
    };

    let code = scalar_to_string(code);
    if code != "0" {
        return Err(Error::Api {
            message: format!("{code}: {}", scalar_to_string(msg)),
        });
    }

    Ok(envelope)
}

/// Validate a control acknowledgement.
///
/// Re-checks the outer `code` (as a `Command` error), then descends into
/// `data.ctl.data` and requires `ret == "ok"`. Returns the inner control
/// data on success.
pub fn check_control_response(response: &Value) -> Result<ControlData, Error> {
    if let Some(code) = response.get("code") {
        let code = scalar_to_string(code);
        if code != "0" {
            let msg = response.get("msg").map(scalar_to_string).unwrap_or_default();
            return Err(Error::Command {
                message: format!("{code}: {msg}"),
            });
        }
    }

    let ctl_data = response
        .get("data")
        .and_then(|d| d.get("ctl"))
        .and_then(|c| c.get("data"))
        .and_then(Value::as_object);

    let ret = ctl_data
        .and_then(|d| d.get("ret"))
        .map(scalar_to_string)
        .unwrap_or_default();

    if ret != "ok" {
        return Err(Error::Command { message: ret });
    }

    Ok(ctl_data.cloned().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn client() -> EcovacsClient {
        EcovacsClient::with_client(
            reqwest::Client::new(),
            "https://open.ecovacs.cn/",
            SecretString::from("secret123"),
        )
        .unwrap()
    }

    #[test]
    fn params_are_stringified_with_single_key() {
        let payload = json!({ "nickName": "Robot1", "n": 5, "flag": true, "ak": "spoofed" });
        let params = client().build_params(payload.as_object().unwrap());

        assert_eq!(params["nickName"], "Robot1");
        assert_eq!(params["n"], "5");
        assert_eq!(params["flag"], "true");
        assert_eq!(params["ak"], "secret123");
        assert_eq!(params.keys().filter(|k| *k == "ak").count(), 1);
    }

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let url = client().endpoint_url("robot/ctl").unwrap();
        assert_eq!(url.as_str(), "https://open.ecovacs.cn/robot/ctl");
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let client = client();
        assert!(!client.is_connected());
        client.connect().await.unwrap();
        client.connect().await.unwrap();
        assert!(client.is_connected());
        assert_eq!(client.retries(), 0);

        client.reconnect().await.unwrap();
        assert!(client.is_connected());
        client.disconnect().await;
        assert!(!client.is_connected());
    }

    #[test]
    fn envelope_requires_msg_and_code() {
        let err = parse_envelope(r#"{"code": "0"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }), "{err:?}");

        let err = parse_envelope(r#"{"msg": "ok"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }), "{err:?}");

        let err = parse_envelope("<html>").unwrap_err();
        match err {
            Error::InvalidResponse { message } => assert!(message.contains("<html>")),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[test]
    fn envelope_non_zero_code() {
        let err = parse_envelope(r#"{"code": 1003, "msg": "bad ak"}"#).unwrap_err();
        match err {
            Error::Api { message } => assert_eq!(message, "1003: bad ak"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn control_response_ok() {
        let resp = json!({
            "code": "0", "msg": "ok",
            "data": { "ctl": { "data": { "ret": "ok", "st": "s" } } }
        });
        let data = check_control_response(&resp).unwrap();
        assert_eq!(data["st"], "s");
    }

    #[test]
    fn control_response_failure_carries_raw_ret() {
        let resp = json!({
            "code": "0", "msg": "ok",
            "data": { "ctl": { "data": { "ret": "fail", "errno": 3 } } }
        });
        match check_control_response(&resp).unwrap_err() {
            Error::Command { message } => assert_eq!(message, "fail"),
            other => panic!("expected Command error, got {other:?}"),
        }

        let missing = json!({ "code": "0", "msg": "ok", "data": {} });
        match check_control_response(&missing).unwrap_err() {
            Error::Command { message } => assert_eq!(message, ""),
            other => panic!("expected Command error, got {other:?}"),
        }
    }
}
