//! `landmask config`: inspect and edit the settings file.
//!
//! Every key is addressed as `section.key` (see [`ConfigKey`]). Writes are
//! validated by the library before the file is saved, so a rejected value
//! leaves the file untouched.

use clap::Subcommand;
use console::style;
use landmask::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Placeholder printed for settings without a value.
const UNSET: &str = "(unset)";

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of one setting
    Get {
        /// Setting name, e.g. inputs.polygons or export.scale
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name, e.g. inputs.years
        key: String,

        /// New value; lists are comma-separated (2013,2015,2017)
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print the location of the settings file
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = lookup(&key)?;
            println!("{}", shown(&key.get(&ConfigFile::load()?)));
        }
        ConfigCommands::Set { key, value } => {
            let key = lookup(&key)?;
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)?;
            config.save()?;
            println!("{} = {}", key, shown(&key.get(&config)));
        }
        ConfigCommands::List => print_all(&ConfigFile::load()?),
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn lookup(name: &str) -> Result<ConfigKey, CliError> {
    name.parse().map_err(|_| {
        CliError::Config(format!(
            "no setting named '{}' (run `landmask config list` for the known keys)",
            name
        ))
    })
}

fn shown(value: &str) -> &str {
    if value.is_empty() {
        UNSET
    } else {
        value
    }
}

fn print_all(config: &ConfigFile) {
    let width = ConfigKey::all()
        .iter()
        .map(|key| key.key_name().len())
        .max()
        .unwrap_or(0);

    let mut section = None;
    for key in ConfigKey::all() {
        if section != Some(key.section()) {
            if section.is_some() {
                println!();
            }
            section = Some(key.section());
            println!("{}", style(format!("[{}]", key.section())).bold());
        }
        println!(
            "{:width$} = {}",
            key.key_name(),
            shown(&key.get(config)),
            width = width
        );
    }
}
