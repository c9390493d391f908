use std::error::Error as _;
use std::fmt::Write as _;

use thiserror::Error;

/// Top-level error type for the `ecovacs-api` crate.
///
/// Every variant maps to a stable, machine-readable [`title`](Error::title)
/// that hosts use as a translation key, plus free-text detail in the
/// `Display` output. `ecovacs-core` wraps these for device-level reporting.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// A call was attempted but the connection gate never opened.
    #[error("Not connected to the Ecovacs API")]
    NotConnected,

    /// HTTP transport failure (timeout, DNS, connection refused, ...).
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ── Configuration / authorization ───────────────────────────────
    /// Invalid API key, base URL, or other client configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Not authorized to operate on the device, or unknown device.
    #[error("Not authorized: {message}")]
    NotAuthorized { message: String },

    // ── Remote errors ───────────────────────────────────────────────
    /// Non-200 HTTP status or non-zero envelope `code`.
    #[error("API error: {message}")]
    Api { message: String },

    /// Control acknowledgement with `ret != "ok"`.
    #[error("Command error: {message}")]
    Command { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Malformed or unexpected response body, or a missing device.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The robot did not answer.
    #[error("Device {device} is offline")]
    DeviceOffline { device: String },
}

impl Error {
    /// Stable title used by hosts as a translation key.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::Api { .. } => "api_error",
            Self::Command { .. } => "command_error",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::DeviceOffline { .. } => "device_offline",
        }
    }

    /// Free-text detail carried by the variant, without the prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotConnected => "",
            Self::ConnectionFailed { message, .. }
            | Self::InvalidConfiguration { message }
            | Self::NotAuthorized { message }
            | Self::Api { message }
            | Self::Command { message }
            | Self::InvalidResponse { message } => message,
            Self::DeviceOffline { device } => device,
        }
    }

    /// Human-readable trace: title, message, and the full source chain.
    pub fn trace(&self) -> String {
        let mut out = format!("{}: {self}", self.title());
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = write!(out, "\n  caused by: {cause}");
            source = cause.source();
        }
        out
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { source: Some(e), .. } => e.is_timeout() || e.is_connect(),
            Self::ConnectionFailed { source: None, .. }
            | Self::NotConnected
            | Self::DeviceOffline { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request hit its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionFailed { source: Some(e), .. } if e.is_timeout())
    }

    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::ConnectionFailed {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidConfiguration {
            message: format!("invalid URL: {err}"),
        }
    }
}
