//! `ecovacs discover`: list the robots bound to the account.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use ecovacs_core::{Capability, DiscoveryService};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct DiscoveredRobot {
    name: String,
    configured: bool,
    capabilities: Vec<Capability>,
}

#[derive(Tabled)]
struct RobotRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Configured")]
    configured: &'static str,
    #[tabled(rename = "Entities")]
    entities: usize,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let (_, entry) = config::build_entry_config(global, false)?;
    let client = Arc::new(entry.build_client()?);
    client.connect().await?;

    let devices = DiscoveryService::new(client).discover_devices().await?;
    let robots: Vec<DiscoveredRobot> = devices
        .values()
        .map(|device| DiscoveredRobot {
            name: device.name().to_owned(),
            configured: device.name() == entry.device_name,
            capabilities: device.entities().map(|e| e.capability()).collect(),
        })
        .collect();

    if robots.is_empty() && global.format() == crate::cli::OutputFormat::Table {
        eprintln!("No robots found on this account.");
        return Ok(());
    }

    let out = output::render_list(
        global.format(),
        &robots,
        |r| RobotRow {
            name: r.name.clone(),
            configured: if r.configured { "*" } else { "" },
            entities: r.capabilities.len(),
        },
        |r| r.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
