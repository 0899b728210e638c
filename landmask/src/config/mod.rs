//! Configuration file handling.
//!
//! Settings live in an INI file, `~/.landmask/config.ini` by default (the
//! `LANDMASK_CONFIG` environment variable points elsewhere). Every setting
//! has a default matching the stock workflow, so a missing file or a missing
//! key is never an error.
//!
//! ```ini
//! [platform]
//! base_url = https://earthengine.googleapis.com
//! project = ee-komba
//! token_env = EE_ACCESS_TOKEN
//! timeout = 30
//!
//! [inputs]
//! polygons = projects/ee-komba/assets/kaya/wirong/mask_5_8
//! classification = ESA/WorldCover/v200
//! image_template = projects/ee-komba/assets/kaya/bbox-wirong-Landsat-{year}
//! years = 2013,2015,2017,2019,2021,2023
//!
//! [mask]
//! classes = 20,30,60
//!
//! [export]
//! name_prefix = NDFI_Masked
//! scale = 100
//! folder = earthengine
//! max_pixels = 10000000000000
//! file_format = GEO_TIFF
//!
//! [logging]
//! level = info
//! file =
//! ```

mod file;
mod keys;

pub use file::{
    ConfigFile, ExportConfig, InputsConfig, LoggingConfig, MaskConfig, PlatformConfig,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "LANDMASK_CONFIG";

/// Errors raised while reading, writing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Path of the configuration file.
///
/// `$LANDMASK_CONFIG` if set, else `~/.landmask/config.ini`, else
/// `.landmask/config.ini` relative to the working directory.
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    config_dir().join("config.ini")
}

/// Directory holding the configuration file and default log files.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".landmask"))
        .unwrap_or_else(|| PathBuf::from(".landmask"))
}
