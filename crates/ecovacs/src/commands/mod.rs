//! Command handlers, one module per subcommand.

pub mod config_cmd;
pub mod control;
pub mod discover;
pub mod press;
pub mod status;
pub mod watch;

use std::time::Duration;

use ecovacs_core::{Coordinator, EntryConfig, Platform, Runtime};
use tracing::debug;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Route a robot command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Discover => discover::handle(global).await,
        Command::Status => status::handle(global).await,
        Command::Press(args) => press::handle(args, global).await,
        Command::Control(args) => control::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// A loaded entry: the runtime owning it plus its coordinator.
pub(crate) struct Session {
    pub runtime: Runtime,
    pub entry_id: String,
    pub coordinator: Coordinator,
}

impl Session {
    /// Set the entry up and register the given platforms with it.
    pub async fn open(
        entry_id: String,
        entry: EntryConfig,
        platforms: &[Platform],
    ) -> Result<Self, CliError> {
        debug!(entry = %entry_id, device = %entry.device_name, "opening session");
        let runtime = Runtime::new();
        let coordinator = runtime.setup_entry(&entry_id, entry).await?;
        for platform in platforms {
            runtime.add_platform_entities(&entry_id, *platform).await?;
        }
        Ok(Self {
            runtime,
            entry_id,
            coordinator,
        })
    }

    /// Open an entry for a single command: no background polling.
    pub async fn one_shot(
        entry_id: String,
        entry: EntryConfig,
        platforms: &[Platform],
    ) -> Result<Self, CliError> {
        Self::open(entry_id, without_polling(entry), platforms).await
    }

    /// One-shot session for the active entry, resolved from config and flags.
    pub async fn from_global(global: &GlobalOpts, platforms: &[Platform]) -> Result<Self, CliError> {
        let (entry_id, entry) = config::build_entry_config(global, true)?;
        Self::one_shot(entry_id, entry, platforms).await
    }

    pub async fn close(self) {
        self.runtime.shutdown().await;
    }
}

fn without_polling(mut entry: EntryConfig) -> EntryConfig {
    entry.scan_interval = Duration::ZERO;
    entry
}
