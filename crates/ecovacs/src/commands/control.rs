//! `ecovacs control <start|pause|stop>`: drive the cleaning control.

use ecovacs_core::{Capability, Platform};

use super::Session;
use crate::cli::{ControlArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: ControlArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (entry_id, mut entry) = config::build_entry_config(global, true)?;
    // the control entity only exists when requested at setup
    entry.enable_control = true;
    let session = Session::one_shot(entry_id, entry, &[Platform::Control]).await?;

    let result = session
        .runtime
        .control(&session.entry_id, Capability::ControlClean, args.action)
        .await;
    let state = session
        .coordinator
        .device()
        .await
        .entity(Capability::ControlClean)
        .and_then(ecovacs_core::Entity::state);
    session.close().await;
    result?;

    if !global.quiet {
        eprintln!(
            "✓ {} -> {}",
            args.action,
            state.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}
