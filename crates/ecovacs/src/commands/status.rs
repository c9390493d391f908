//! `ecovacs status`: one refresh, then the device and entity view.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use ecovacs_core::{DeviceSnapshot, EntitySnapshot, Platform};

use super::Session;
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusView {
    entry: String,
    last_update_success: bool,
    last_updated: Option<String>,
    #[serde(flatten)]
    device: DeviceSnapshot,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Capability")]
    capability: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&EntitySnapshot> for EntityRow {
    fn from(e: &EntitySnapshot) -> Self {
        Self {
            capability: e.capability.to_string(),
            platform: e.platform.to_string(),
            description: e.description.clone(),
            state: e.state.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

fn detail(view: &StatusView, color: bool) -> String {
    let device = &view.device;
    let mut out = String::new();
    let online = output::paint_status(
        if device.online { "online" } else { "offline" },
        device.online,
        color,
    );
    let _ = writeln!(out, "Robot:     {}", device.name);
    let _ = writeln!(out, "Entry:     {}", view.entry);
    let _ = writeln!(out, "Status:    {online}");
    let _ = writeln!(out, "Cleaning:  {}", device.clean_status);
    let _ = writeln!(out, "Charging:  {}", device.charge_status);
    if let Some(ref at) = view.last_updated {
        let _ = writeln!(out, "Updated:   {at}");
    }
    let rows: Vec<EntityRow> = device.entities.iter().map(EntityRow::from).collect();
    let _ = write!(out, "\n{}", output::render_table(&rows));
    out
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let platforms = [Platform::Sensor, Platform::Button, Platform::Control];
    let session = Session::from_global(global, &platforms).await?;

    let refreshed = session.coordinator.refresh().await;
    let status = session.coordinator.status();
    let device = session.coordinator.snapshot().await;
    let entry = session.entry_id.clone();
    session.close().await;
    refreshed?;

    let view = StatusView {
        entry,
        last_update_success: status.last_update_success,
        last_updated: status.last_updated.map(|t| t.to_rfc3339()),
        device,
    };
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.format(),
        &view,
        |v| detail(v, color),
        |v| format!("{}\t{}", v.device.clean_status, v.device.charge_status),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
