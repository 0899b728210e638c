//! Configuration file model and INI persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::keys::ConfigKey;
use super::{config_file_path, ConfigError};
use crate::catalog::{ImageCatalog, Year, DEFAULT_IMAGE_TEMPLATE, DEFAULT_YEARS};
use crate::export::{ExportParams, FileFormat, DEFAULT_FOLDER, DEFAULT_MAX_PIXELS, DEFAULT_NAME_PREFIX, DEFAULT_SCALE};
use crate::mask::{ClassCode, DEFAULT_CLASSES, DEFAULT_CLASSIFICATION};

/// Default platform endpoint.
pub const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com";

/// Default cloud project.
pub const DEFAULT_PROJECT: &str = "ee-komba";

/// Default environment variable holding the bearer token.
pub const DEFAULT_TOKEN_ENV: &str = "EE_ACCESS_TOKEN";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default polygon table asset.
pub const DEFAULT_POLYGONS: &str = "projects/ee-komba/assets/kaya/wirong/mask_5_8";

/// Remote platform settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformConfig {
    /// REST endpoint root.
    pub base_url: String,

    /// Cloud project exports are billed to.
    pub project: String,

    /// Environment variable holding the bearer token.
    pub token_env: String,

    /// HTTP timeout in seconds.
    pub timeout: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Input asset settings.
#[derive(Debug, Clone, PartialEq)]
pub struct InputsConfig {
    /// Polygon table asset (or GeoJSON file for offline runs).
    pub polygons: String,

    /// Image collection whose first image holds the class codes.
    pub classification: String,

    /// Yearly image asset template containing `{year}`.
    pub image_template: String,

    /// Years to export.
    pub years: Vec<Year>,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            polygons: DEFAULT_POLYGONS.to_string(),
            classification: DEFAULT_CLASSIFICATION.to_string(),
            image_template: DEFAULT_IMAGE_TEMPLATE.to_string(),
            years: DEFAULT_YEARS.to_vec(),
        }
    }
}

impl InputsConfig {
    /// Build the yearly image catalog.
    pub fn catalog(&self) -> Result<ImageCatalog, crate::catalog::CatalogError> {
        ImageCatalog::from_template(&self.image_template, self.years.iter().copied())
    }
}

/// Mask settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskConfig {
    /// Target class codes.
    pub classes: Vec<ClassCode>,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            classes: DEFAULT_CLASSES.to_vec(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub name_prefix: String,
    pub scale: f64,
    pub folder: String,
    pub max_pixels: u64,
    pub file_format: FileFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            scale: DEFAULT_SCALE,
            folder: DEFAULT_FOLDER.to_string(),
            max_pixels: DEFAULT_MAX_PIXELS,
            file_format: FileFormat::default(),
        }
    }
}

impl ExportConfig {
    /// Convert into export parameters.
    pub fn params(&self) -> ExportParams {
        ExportParams::default()
            .with_name_prefix(self.name_prefix.clone())
            .with_scale(self.scale)
            .with_folder(self.folder.clone())
            .with_max_pixels(self.max_pixels)
            .with_file_format(self.file_format)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level filter (`RUST_LOG` takes precedence).
    pub level: String,

    /// Optional log file; console only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The complete configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub platform: PlatformConfig,
    pub inputs: InputsConfig,
    pub mask: MaskConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Load from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&text).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse INI text. Keys that are absent keep their defaults.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Export parameters for this configuration.
    pub fn export_params(&self) -> ExportParams {
        self.export.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_stock_workflow() {
        let config = ConfigFile::default();
        assert_eq!(config.inputs.polygons, "projects/ee-komba/assets/kaya/wirong/mask_5_8");
        assert_eq!(config.inputs.classification, "ESA/WorldCover/v200");
        assert_eq!(config.inputs.years, vec![2013, 2015, 2017, 2019, 2021, 2023]);
        assert_eq!(config.mask.classes, vec![20, 30, 60]);
        assert_eq!(config.export.scale, 100.0);
        assert_eq!(config.export.folder, "earthengine");
        assert_eq!(config.export.max_pixels, 10_000_000_000_000);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = ConfigFile::parse(
            "[platform]\nproject = my-project\n\n[mask]\nclasses = 10, 20\n",
        )
        .unwrap();

        assert_eq!(config.platform.project, "my-project");
        assert_eq!(config.platform.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.mask.classes, vec![10, 20]);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_parse_scientific_max_pixels() {
        let config = ConfigFile::parse("[export]\nmax_pixels = 1e13\n").unwrap();
        assert_eq!(config.export.max_pixels, 10_000_000_000_000);
    }

    #[test]
    fn test_parse_invalid_value() {
        let result = ConfigFile::parse("[inputs]\nyears = 2013,abc\n");
        match result {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "inputs.years"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.platform.project = "other".to_string();
        config.inputs.years = vec![2020, 2022];
        config.export.file_format = FileFormat::TfRecordImage;
        config.logging.file = Some(PathBuf::from("/tmp/landmask.log"));
        config.save_to(&path).unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_export_params_from_config() {
        let mut config = ConfigFile::default();
        config.export.scale = 30.0;
        let params = config.export_params();
        assert_eq!(params.scale, 30.0);
        assert_eq!(params.name_prefix, "NDFI_Masked");
    }

    #[test]
    fn test_catalog_from_inputs() {
        let catalog = ConfigFile::default().inputs.catalog().unwrap();
        assert_eq!(catalog, ImageCatalog::default());
    }
}
