//! Init command - initialize configuration file.

use landmask::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();

    if path.exists() {
        // Validates the existing file without touching it.
        ConfigFile::load_from(&path)?;
        println!("Configuration file already exists: {}", path.display());
        return Ok(());
    }

    let config = ConfigFile::default();
    config.save_to(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Polygons: {}", config.inputs.polygons);
    println!("Project:  {}", config.platform.project);
    println!();
    println!(
        "Export an access token in ${} before running 'landmask run'.",
        config.platform.token_env
    );
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
