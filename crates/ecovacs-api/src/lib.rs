// ecovacs-api: Async Rust client for the Ecovacs open cloud robot API

pub mod client;
pub mod error;
pub mod models;
pub mod redact;
pub mod robot;
pub mod transport;

pub use client::{EcovacsClient, check_control_response};
pub use error::Error;
pub use models::{
    API_KEY_PARAM, ChargeAction, CleanAction, ControlCommand, ControlData, DEFAULT_API_URL,
    DEFAULT_TIMEOUT, ENDPOINT_CONTROL, ENDPOINT_DEVICE_LIST, MAX_RETRIES, UNKNOWN_STATE,
    clean_state_name,
};
pub use redact::redact;
pub use robot::{translate_charge_state, translate_clean_state};
pub use transport::TransportConfig;
