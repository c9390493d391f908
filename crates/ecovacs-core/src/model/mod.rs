// ── Domain model ──

pub mod capability;

pub use capability::{ButtonCommand, Capability, Platform};
