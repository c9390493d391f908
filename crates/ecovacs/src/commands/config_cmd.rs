//! Config subcommand handlers.

use std::sync::Arc;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use ecovacs_api::DEFAULT_API_URL;
use ecovacs_core::{DiscoveryService, EntryConfig};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Entry};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with every plaintext API key masked.
fn redacted(cfg: &Config) -> Config {
    Config {
        default_entry: cfg.default_entry.clone(),
        defaults: ecovacs_config::Defaults {
            output: cfg.defaults.output.clone(),
            ..cfg.defaults
        },
        entries: cfg
            .entries
            .iter()
            .map(|(name, entry)| {
                let mut entry = entry.clone();
                if entry.api_key.is_some() {
                    entry.api_key = Some(MASK.into());
                }
                (name.clone(), entry)
            })
            .collect(),
    }
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_entry {
        let _ = writeln!(out, "default_entry = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "scan_interval = {}", cfg.defaults.scan_interval);
    let _ = writeln!(out, "log_http_requests = {}", cfg.defaults.log_http_requests);
    let _ = writeln!(out, "redact_log_messages = {}", cfg.defaults.redact_log_messages);

    for (name, e) in &cfg.entries {
        let _ = writeln!(out);
        let _ = writeln!(out, "[entries.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", e.api_url);
        let _ = writeln!(out, "device_name = \"{}\"", e.device_name);
        if let Some(ref display) = e.name {
            let _ = writeln!(out, "name = \"{display}\"");
        }
        if e.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"{MASK}\"");
        }
        if let Some(ref env) = e.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        match e.api_timeout {
            Some(ecovacs_config::ApiTimeout::Seconds(secs)) => {
                let _ = writeln!(out, "api_timeout = {secs}");
            }
            Some(ecovacs_config::ApiTimeout::Text(ref text)) => {
                let _ = writeln!(out, "api_timeout = \"{text}\"");
            }
            None => {}
        }
        if let Some(interval) = e.scan_interval {
            let _ = writeln!(out, "scan_interval = {interval}");
        }
        if e.enable_control {
            let _ = writeln!(out, "enable_control = true");
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask where the API key should live. Returns the `(api_key, api_key_env)`
/// pair to store on the entry.
fn prompt_key_storage(key: String) -> Result<(Option<String>, Option<String>), CliError> {
    let choices = &[
        "Read from an environment variable (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to keep the API key?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        let var: String = Input::new()
            .with_prompt("Environment variable")
            .default(ecovacs_config::API_KEY_ENV.into())
            .interact_text()
            .map_err(prompt_err)?;
        eprintln!("   Remember to export {var} before running ecovacs");
        Ok((None, Some(var)))
    } else {
        Ok((Some(key), None))
    }
}

/// Connect with the given credentials and list the account's robots.
async fn discover_names(
    api_url: &str,
    api_key: SecretString,
    global: &GlobalOpts,
) -> Result<Vec<String>, CliError> {
    let entry = EntryConfig {
        api_url: api_url.to_owned(),
        api_key,
        api_timeout: global.timeout.map(std::time::Duration::from_secs),
        log_http_requests: global.log_http,
        ..EntryConfig::default()
    };
    let client = entry.build_client()?;
    client.connect().await?;

    let devices = DiscoveryService::new(Arc::new(client))
        .discover_devices()
        .await?;
    if devices.is_empty() {
        return Err(CliError::NoDevices);
    }
    Ok(devices.into_keys().collect())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global).await,

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.format(), &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Entries => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_entry.as_deref().unwrap_or("default");
            if cfg.entries.is_empty() {
                eprintln!("No entries configured. Run: ecovacs config init");
            } else {
                for (name, entry) in &cfg.entries {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", entry.device_name);
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.entries.contains_key(&name) {
                return Err(CliError::EntryNotFound {
                    available: config::available_entries(&cfg),
                    name,
                });
            }

            cfg.default_entry = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default entry set to '{name}'");
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

/// Interactive wizard: credentials, connect, pick a robot, save.
async fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("✨ Ecovacs CLI: configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();

    // 1. Entry name
    let entry_name: String = Input::new()
        .with_prompt("Entry name")
        .default(cfg.default_entry.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    // 2. API endpoint
    let api_url: String = Input::new()
        .with_prompt("API URL")
        .default(
            global
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.into()),
        )
        .interact_text()
        .map_err(prompt_err)?;
    url::Url::parse(&api_url).map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {api_url}"),
    })?;

    // 3. API key
    let key = match global.api_key.clone() {
        Some(key) => key,
        None => rpassword::prompt_password("API key: ").map_err(prompt_err)?,
    };
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }

    // 4. Connect and discover
    eprintln!("\n   Connecting to {api_url} ...");
    let names = discover_names(&api_url, SecretString::from(key.clone()), global).await?;
    eprintln!("   ✓ Found {} robot(s)\n", names.len());

    let selection = Select::new()
        .with_prompt("Robot")
        .items(&names)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let device_name = names
        .get(selection)
        .cloned()
        .ok_or_else(|| prompt_err("selection out of range"))?;

    // 5. Optional display name
    let display: String = Input::new()
        .with_prompt("Display name (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let (api_key, api_key_env) = prompt_key_storage(key)?;

    let mut entry = Entry::new(api_url, device_name.clone());
    entry.api_key = api_key;
    entry.api_key_env = api_key_env;
    entry.name = Some(display).filter(|d| !d.trim().is_empty());

    cfg.entries.insert(entry_name.clone(), entry);
    cfg.default_entry = Some(entry_name.clone());
    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Entry '{entry_name}' -> {device_name}");
    eprintln!("\n  Test it: ecovacs status");

    Ok(())
}
