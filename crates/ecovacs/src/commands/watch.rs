//! `ecovacs watch`: poll the robot and report state changes.

use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use ecovacs_core::{DEFAULT_SCAN_INTERVAL, DeviceSnapshot, Platform};

use super::Session;
use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Observed {
    online: bool,
    clean_status: String,
    charge_status: String,
}

impl From<&DeviceSnapshot> for Observed {
    fn from(s: &DeviceSnapshot) -> Self {
        Self {
            online: s.online,
            clean_status: s.clean_status.clone(),
            charge_status: s.charge_status.clone(),
        }
    }
}

#[derive(Serialize)]
struct Event<'a> {
    at: String,
    device: &'a str,
    #[serde(flatten)]
    state: &'a Observed,
    ok: bool,
}

/// Describe what moved between two observations.
fn changes(prev: &Observed, next: &Observed) -> Vec<String> {
    let mut out = Vec::new();
    if prev.online != next.online {
        let word = if next.online { "online" } else { "offline" };
        out.push(word.to_owned());
    }
    if prev.clean_status != next.clean_status {
        out.push(format!("clean {} -> {}", prev.clean_status, next.clean_status));
    }
    if prev.charge_status != next.charge_status {
        out.push(format!("charge {} -> {}", prev.charge_status, next.charge_status));
    }
    out
}

fn emit(global: &GlobalOpts, device: &str, state: &Observed, ok: bool, line: &str) {
    let event = Event {
        at: Local::now().to_rfc3339(),
        device,
        state,
        ok,
    };
    let out = match global.format() {
        OutputFormat::Table | OutputFormat::Plain => {
            format!("{}  {device}  {line}", Local::now().format("%H:%M:%S"))
        }
        // one object per line so the stream stays parseable
        OutputFormat::Json | OutputFormat::JsonCompact => {
            serde_json::to_string(&event).unwrap_or_default()
        }
    };
    output::print_output(&out, global.quiet);
}

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (entry_id, mut entry) = config::build_entry_config(global, true)?;
    if let Some(secs) = args.interval {
        entry.scan_interval = Duration::from_secs(secs);
    }
    if entry.scan_interval.is_zero() {
        entry.scan_interval = DEFAULT_SCAN_INTERVAL;
    }

    let session = Session::open(entry_id, entry, &[Platform::Sensor]).await?;
    let device = session.coordinator.device_name().to_owned();
    let mut updates = session.coordinator.subscribe();

    let mut last = Observed::from(&session.coordinator.snapshot().await);
    emit(
        global,
        &device,
        &last,
        true,
        &format!("clean {}, charge {}", last.clean_status, last.charge_status),
    );
    info!(
        device = %device,
        interval_secs = session.coordinator.scan_interval().as_secs(),
        "watching for state changes"
    );

    let mut seen = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *updates.borrow_and_update();
                seen += 1;

                if status.last_update_success {
                    let next = Observed::from(&session.coordinator.snapshot().await);
                    let moved = changes(&last, &next);
                    if !moved.is_empty() {
                        info!(device = %device, "{}", moved.join(", "));
                        emit(global, &device, &next, true, &moved.join(", "));
                    }
                    last = next;
                } else {
                    warn!(device = %device, "update failed, keeping last known state");
                    emit(global, &device, &last, false, "update failed");
                }

                if args.count.is_some_and(|n| seen >= n) {
                    break;
                }
            }
        }
    }

    session.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(clean: &str, charge: &str) -> Observed {
        Observed {
            online: true,
            clean_status: clean.into(),
            charge_status: charge.into(),
        }
    }

    #[test]
    fn unchanged_state_reports_nothing() {
        let a = observed("Cleaning", "Idle");
        assert!(changes(&a, &a.clone()).is_empty());
    }

    #[test]
    fn each_moved_field_is_reported() {
        let a = observed("Cleaning", "Idle");
        let b = observed("Returning", "Going");
        assert_eq!(
            changes(&a, &b),
            vec!["clean Cleaning -> Returning", "charge Idle -> Going"]
        );

        let mut c = b.clone();
        c.online = false;
        assert_eq!(changes(&b, &c), vec!["offline"]);
    }
}
