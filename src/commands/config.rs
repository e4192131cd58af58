use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use smus_migrate::defaults::{self, Defaults, MigrateConfig};
use smus_migrate::json::{remove_json_pointer, set_json_pointer};
use smus_migrate::Error;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (config.json merged over built-in defaults)
    Show {
        /// Show only built-in defaults
        #[arg(long)]
        builtin: bool,
    },
    /// Set a configuration value at a JSON pointer path
    Set {
        /// JSON pointer path (e.g., /defaults/polling/delaySeconds)
        pointer: String,
        /// Value to set (JSON)
        value: String,
    },
    /// Remove a configuration value at a JSON pointer path
    Remove {
        pointer: String,
    },
    /// Delete config.json
    Reset,
    /// Show the path to config.json
    Path,
}

#[derive(Debug, Default, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<MigrateConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

pub fn run(args: ConfigArgs, _global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let output = match args.command {
        ConfigCommand::Show { builtin: true } => ConfigOutput {
            command: "config.show".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            ..Default::default()
        },
        ConfigCommand::Show { builtin: false } => ConfigOutput {
            command: "config.show".to_string(),
            config: Some(defaults::load_config()),
            ..Default::default()
        },
        ConfigCommand::Set { pointer, value } => {
            let value: Value = serde_json::from_str(&value)
                .map_err(|e| Error::validation_invalid_json(e, Some("parse value".to_string())))?;
            let config = edit(&pointer, |doc| set_json_pointer(doc, &pointer, value.clone()))?;
            ConfigOutput {
                command: "config.set".to_string(),
                config: Some(config),
                pointer: Some(pointer),
                value: Some(value),
                ..Default::default()
            }
        }
        ConfigCommand::Remove { pointer } => {
            let config = edit(&pointer, |doc| remove_json_pointer(doc, &pointer))?;
            ConfigOutput {
                command: "config.remove".to_string(),
                config: Some(config),
                pointer: Some(pointer),
                ..Default::default()
            }
        }
        ConfigCommand::Reset => ConfigOutput {
            command: "config.reset".to_string(),
            deleted: Some(defaults::reset_config()?),
            defaults: Some(defaults::builtin_defaults()),
            path: Some(defaults::config_path()?),
            ..Default::default()
        },
        ConfigCommand::Path => ConfigOutput {
            command: "config.path".to_string(),
            path: Some(defaults::config_path()?),
            exists: Some(defaults::config_exists()),
            ..Default::default()
        },
    };
    Ok((output, 0))
}

/// Apply `change` to the JSON form of the current config, validate the
/// result against the config schema and save it.
fn edit<F>(pointer: &str, change: F) -> smus_migrate::Result<MigrateConfig>
where
    F: FnOnce(&mut Value) -> smus_migrate::Result<()>,
{
    if !pointer.starts_with('/') {
        return Err(Error::validation_invalid_argument(
            "pointer",
            "JSON pointer must start with '/'",
            Some(pointer.to_string()),
            None,
        ));
    }

    let mut doc = serde_json::to_value(defaults::load_config())
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))?;
    change(&mut doc)?;

    let config: MigrateConfig = serde_json::from_value(doc).map_err(|e| {
        Error::config_invalid_value(pointer, None, format!("Value does not fit the config schema: {}", e))
    })?;
    defaults::save_config(&config)?;
    Ok(config)
}
