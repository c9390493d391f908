//! `ecovacs press <capability>`: fire a one-shot button.

use ecovacs_core::Platform;

use super::Session;
use crate::cli::{GlobalOpts, PressArgs};
use crate::error::CliError;

pub async fn handle(args: PressArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::from_global(global, &[Platform::Button]).await?;
    let device = session.coordinator.device_name().to_owned();

    let result = session
        .runtime
        .press(&session.entry_id, args.capability)
        .await;
    session.close().await;
    result?;

    if !global.quiet {
        eprintln!("✓ {} sent to {device}", args.capability.description());
    }
    Ok(())
}
