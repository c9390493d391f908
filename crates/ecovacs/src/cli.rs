//! Clap derive structures for the `ecovacs` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

use ecovacs_core::{Capability, ControlAction};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ecovacs -- drive Ecovacs robot vacuums through the open cloud API
#[derive(Debug, Parser)]
#[command(
    name = "ecovacs",
    version,
    about = "Control Ecovacs robot vacuums from the command line",
    long_about = "Talks to the Ecovacs open cloud API with an account API key.\n\n\
        Each configured entry binds one robot (by account nickname) to an\n\
        API endpoint and key. Run `ecovacs config init` to create one.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config entry to use
    #[arg(long, short = 'e', env = "ECOVACS_ENTRY", global = true)]
    pub entry: Option<String>,

    /// API base URL (overrides the entry)
    #[arg(long, env = "ECOVACS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Account API key (overrides every key source on the entry)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Robot nickname (overrides the entry)
    #[arg(long, short = 'd', env = "ECOVACS_DEVICE", global = true)]
    pub device: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "ECOVACS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: table, or `output` under [defaults]]
    #[arg(long, short = 'o', env = "ECOVACS_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Log raw HTTP requests and responses (at debug level)
    #[arg(long, global = true)]
    pub log_http: bool,

    /// Log response bodies without masking credentials
    #[arg(long, global = true, hide = true)]
    pub no_redact: bool,
}

impl GlobalOpts {
    /// The output format in effect once config defaults are applied.
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    /// Fill `--output` from the config's `[defaults] output` when unset.
    pub fn apply_output_default(&mut self, configured: &str) {
        if self.output.is_some() {
            return;
        }
        match <OutputFormat as ValueEnum>::from_str(configured, true) {
            Ok(format) => self.output = Some(format),
            Err(_) => warn!(value = configured, "ignoring unknown default output format"),
        }
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the robots registered on the account
    #[command(alias = "ls")]
    Discover,

    /// Refresh the configured robot once and show its state
    #[command(alias = "st")]
    Status,

    /// Trigger a one-shot command (start, pause, return to dock, ...)
    Press(PressArgs),

    /// Drive the cleaning control (requires control to be enabled)
    Control(ControlArgs),

    /// Poll the robot and report state changes until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Robot commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PressArgs {
    /// Button to press
    #[arg(value_parser = parse_button)]
    pub capability: Capability,
}

#[derive(Debug, Args)]
pub struct ControlArgs {
    /// Action for the cleaning control
    #[arg(value_parser = parse_control_action)]
    pub action: ControlAction,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling interval in seconds (overrides the entry)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many refreshes
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

fn parse_button(raw: &str) -> Result<Capability, String> {
    let buttons: Vec<String> = Capability::DEFAULT_CATALOG
        .iter()
        .filter(|c| c.button_command().is_some())
        .map(ToString::to_string)
        .collect();

    raw.parse::<Capability>()
        .ok()
        .filter(|c| c.button_command().is_some())
        .ok_or_else(|| format!("expected one of: {}", buttons.join(", ")))
}

fn parse_control_action(raw: &str) -> Result<ControlAction, String> {
    raw.parse::<ControlAction>()
        .map_err(|_| "expected one of: start, pause, stop".to_owned())
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard: connect, pick a robot, save an entry
    Init,

    /// Show current configuration (API keys masked)
    Show,

    /// List configured entries
    Entries,

    /// Set the default entry
    Use {
        /// Entry name
        name: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
