// ── Runtime entry configuration ──
//
// Describes one configured robot: where the API lives, the key to use and
// which device to poll. Built by the CLI (or any other host) and handed to
// `Runtime::setup_entry`; core never reads config files.

use std::time::Duration;

use secrecy::SecretString;
use tracing::debug;

use ecovacs_api::{DEFAULT_API_URL, EcovacsClient, Error, TransportConfig};

/// Default polling interval.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(15);

/// Configuration for one robot entry.
#[derive(Debug, Clone)]
pub struct EntryConfig {
    /// API base URL (e.g. `https://open.ecovacs.cn`).
    pub api_url: String,
    pub api_key: SecretString,
    /// Account-registered nickname of the robot.
    pub device_name: String,
    /// Per-request timeout override. `None` keeps the client default.
    pub api_timeout: Option<Duration>,
    /// How often the coordinator polls the device.
    pub scan_interval: Duration,
    /// Dump HTTP traffic to the debug log.
    pub log_http_requests: bool,
    /// Mask sensitive fields in HTTP dumps.
    pub redact_log_messages: bool,
    /// Register the `controlClean` entity alongside the default catalog.
    pub enable_control: bool,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: SecretString::from(String::new()),
            device_name: String::new(),
            api_timeout: None,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            log_http_requests: false,
            redact_log_messages: true,
            enable_control: false,
        }
    }
}

impl EntryConfig {
    /// Transport settings for the entry's HTTP client.
    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig::default();
        match self.api_timeout {
            Some(timeout) => transport.with_timeout(timeout),
            None => transport,
        }
    }

    /// Build the API client for this entry with its timeout and logging
    /// toggles applied.
    pub fn build_client(&self) -> Result<EcovacsClient, Error> {
        let mut client = EcovacsClient::new(&self.api_url, self.api_key.clone(), &self.transport())?;
        if let Some(timeout) = self.api_timeout {
            debug!("setting API timeout to {}", timeout.as_secs());
            client.set_timeout(timeout);
        }
        client.set_log_http_requests(self.log_http_requests);
        client.set_redact_log_messages(self.redact_log_messages);
        Ok(client)
    }
}
