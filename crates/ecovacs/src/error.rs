//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, API and config errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ecovacs_config::ConfigError;
use ecovacs_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Ecovacs API: {reason}")]
    #[diagnostic(
        code(ecovacs::connection_failed),
        help(
            "Check network access and the API URL.\n\
             Override it with: ecovacs --api-url <URL> ..."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Not connected to the Ecovacs API")]
    #[diagnostic(
        code(ecovacs::not_connected),
        help("The client gave up after repeated connection attempts. Try again later.")
    )]
    NotConnected,

    #[error("Request timed out")]
    #[diagnostic(
        code(ecovacs::timeout),
        help("Increase the timeout with --timeout or set api_timeout on the entry.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not authorized: {message}")]
    #[diagnostic(
        code(ecovacs::not_authorized),
        help("Verify the API key and that the robot belongs to the account.")
    )]
    NotAuthorized { message: String },

    #[error("No API key configured for entry '{entry}'")]
    #[diagnostic(
        code(ecovacs::no_credentials),
        help(
            "Configure one with: ecovacs config init\n\
             Or set the ECOVACS_API_KEY environment variable."
        )
    )]
    NoCredentials { entry: String },

    // ── Robot ────────────────────────────────────────────────────────

    #[error("Robot '{device}' has no {platform} '{capability}'")]
    #[diagnostic(
        code(ecovacs::entity_not_found),
        help("Run: ecovacs status to see the robot's entities")
    )]
    EntityNotFound {
        device: String,
        platform: String,
        capability: String,
    },

    #[error("Robot '{device}' is offline")]
    #[diagnostic(code(ecovacs::device_offline))]
    DeviceOffline { device: String },

    #[error("Entry '{entry}' is not ready: {reason}")]
    #[diagnostic(
        code(ecovacs::not_ready),
        help("The first refresh failed. Check that the robot is powered on and online.")
    )]
    NotReady { entry: String, reason: String },

    #[error("No robots found on this account")]
    #[diagnostic(
        code(ecovacs::no_devices),
        help("Bind a robot to the account in the Ecovacs app first.")
    )]
    NoDevices,

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(ecovacs::api_error))]
    ApiError { code: String, message: String },

    #[error("Command rejected by the robot: {message}")]
    #[diagnostic(code(ecovacs::command_error))]
    CommandFailed { message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(ecovacs::invalid_response))]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ecovacs::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Entry '{name}' not found in configuration")]
    #[diagnostic(
        code(ecovacs::entry_not_found),
        help(
            "Available entries: {available}\n\
             Create one with: ecovacs config init"
        )
    )]
    EntryNotFound { name: String, available: String },

    #[error("Entry '{name}' is already loaded")]
    #[diagnostic(code(ecovacs::conflict))]
    Conflict { name: String },

    #[error("No robot configured")]
    #[diagnostic(
        code(ecovacs::no_config),
        help(
            "Create an entry with: ecovacs config init\n\
             Or pass --api-key and --device.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ecovacs::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(ecovacs::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::NotConnected | Self::DeviceOffline { .. } => {
                exit_code::CONNECTION
            }
            Self::NotAuthorized { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::EntityNotFound { .. } | Self::EntryNotFound { .. } | Self::NoDevices => {
                exit_code::NOT_FOUND
            }
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library errors → CliError ────────────────────────────────────────

impl From<ecovacs_api::Error> for CliError {
    fn from(err: ecovacs_api::Error) -> Self {
        use ecovacs_api::Error as ApiError;

        match err {
            ApiError::NotConnected => Self::NotConnected,

            err if err.is_timeout() => Self::Timeout,

            ApiError::ConnectionFailed { message, .. } => Self::ConnectionFailed { reason: message },

            ApiError::InvalidConfiguration { message } => Self::Validation {
                field: "configuration".into(),
                reason: message,
            },

            ApiError::NotAuthorized { message } => Self::NotAuthorized { message },

            ApiError::Api { message } => Self::ApiError {
                code: "api_error".into(),
                message,
            },

            ApiError::Command { message } => Self::CommandFailed { message },

            ApiError::InvalidResponse { message } => Self::InvalidResponse { message },

            ApiError::DeviceOffline { device } => Self::DeviceOffline { device },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) | CoreError::UpdateFailed { source: api, .. } => api.into(),

            CoreError::NotReady { entry_id, reason } => Self::NotReady {
                entry: entry_id,
                reason,
            },

            CoreError::EntryNotFound { entry_id } => Self::EntryNotFound {
                name: entry_id,
                available: String::new(),
            },

            CoreError::EntryAlreadyLoaded { entry_id } => Self::Conflict { name: entry_id },

            CoreError::EntityNotFound {
                device,
                platform,
                capability,
            } => Self::EntityNotFound {
                device,
                platform: platform.to_string(),
                capability: capability.to_string(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "entry".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { entry } => Self::NoCredentials { entry },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use ecovacs_core::{Capability, Platform};

    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let err: CliError = ecovacs_api::Error::NotAuthorized {
            message: "20001: invalid ak".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err: CliError = ecovacs_api::Error::ConnectionFailed {
            message: "dns".into(),
            source: None,
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);

        let err: CliError = ecovacs_api::Error::Command {
            message: "fail".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(err.to_string(), "Command rejected by the robot: fail");
    }

    #[test]
    fn update_failure_unwraps_the_api_error() {
        let err: CliError = CoreError::UpdateFailed {
            device: "Robot1".into(),
            source: ecovacs_api::Error::DeviceOffline {
                device: "Robot1".into(),
            },
        }
        .into();
        assert!(matches!(err, CliError::DeviceOffline { .. }));
    }

    #[test]
    fn missing_entity_is_not_found() {
        let err: CliError = CoreError::EntityNotFound {
            device: "Robot1".into(),
            platform: Platform::Control,
            capability: Capability::ControlClean,
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "Robot 'Robot1' has no control 'controlClean'");
    }

    #[test]
    fn config_errors_keep_their_kind() {
        let err: CliError = ConfigError::NoCredentials {
            entry: "default".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
