//! Typed configuration keys.
//!
//! Each key maps a `section.key` name onto one field of [`ConfigFile`],
//! with validation on write. The INI reader and writer and the
//! `config get|set|list` commands all go through this table.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use super::ConfigError;
use crate::catalog::YEAR_PLACEHOLDER;
use crate::export::FileFormat;

/// Accepted log levels.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A configuration setting addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    PlatformBaseUrl,
    PlatformProject,
    PlatformTokenEnv,
    PlatformTimeout,
    InputsPolygons,
    InputsClassification,
    InputsImageTemplate,
    InputsYears,
    MaskClasses,
    ExportNamePrefix,
    ExportScale,
    ExportFolder,
    ExportMaxPixels,
    ExportFileFormat,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            PlatformBaseUrl,
            PlatformProject,
            PlatformTokenEnv,
            PlatformTimeout,
            InputsPolygons,
            InputsClassification,
            InputsImageTemplate,
            InputsYears,
            MaskClasses,
            ExportNamePrefix,
            ExportScale,
            ExportFolder,
            ExportMaxPixels,
            ExportFileFormat,
            LoggingLevel,
            LoggingFile,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            PlatformBaseUrl | PlatformProject | PlatformTokenEnv | PlatformTimeout => "platform",
            InputsPolygons | InputsClassification | InputsImageTemplate | InputsYears => "inputs",
            MaskClasses => "mask",
            ExportNamePrefix | ExportScale | ExportFolder | ExportMaxPixels | ExportFileFormat => {
                "export"
            }
            LoggingLevel | LoggingFile => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            PlatformBaseUrl => "base_url",
            PlatformProject => "project",
            PlatformTokenEnv => "token_env",
            PlatformTimeout => "timeout",
            InputsPolygons => "polygons",
            InputsClassification => "classification",
            InputsImageTemplate => "image_template",
            InputsYears => "years",
            MaskClasses => "classes",
            ExportNamePrefix => "name_prefix",
            ExportScale => "scale",
            ExportFolder => "folder",
            ExportMaxPixels => "max_pixels",
            ExportFileFormat => "file_format",
            LoggingLevel => "level",
            LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            PlatformBaseUrl => config.platform.base_url.clone(),
            PlatformProject => config.platform.project.clone(),
            PlatformTokenEnv => config.platform.token_env.clone(),
            PlatformTimeout => config.platform.timeout.to_string(),
            InputsPolygons => config.inputs.polygons.clone(),
            InputsClassification => config.inputs.classification.clone(),
            InputsImageTemplate => config.inputs.image_template.clone(),
            InputsYears => join(&config.inputs.years),
            MaskClasses => join(&config.mask.classes),
            ExportNamePrefix => config.export.name_prefix.clone(),
            ExportScale => config.export.scale.to_string(),
            ExportFolder => config.export.folder.clone(),
            ExportMaxPixels => config.export.max_pixels.to_string(),
            ExportFileFormat => config.export.file_format.to_string(),
            LoggingLevel => config.logging.level.clone(),
            LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        let required = || non_empty(value).ok_or_else(|| invalid("must not be empty"));

        match self {
            PlatformBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("expected an http(s) URL"));
                }
                config.platform.base_url = value.to_string();
            }
            PlatformProject => config.platform.project = required()?,
            PlatformTokenEnv => config.platform.token_env = required()?,
            PlatformTimeout => {
                config.platform.timeout = value
                    .parse::<u64>()
                    .ok()
                    .filter(|t| *t > 0)
                    .ok_or_else(|| invalid("expected a positive number of seconds"))?;
            }
            InputsPolygons => config.inputs.polygons = required()?,
            InputsClassification => config.inputs.classification = required()?,
            InputsImageTemplate => {
                if !value.contains(YEAR_PLACEHOLDER) {
                    return Err(invalid("template must contain {year}"));
                }
                config.inputs.image_template = value.to_string();
            }
            InputsYears => {
                config.inputs.years = parse_list::<u16>(value)
                    .ok_or_else(|| invalid("expected a comma-separated list of years"))?;
            }
            MaskClasses => {
                config.mask.classes = parse_list::<i32>(value)
                    .ok_or_else(|| invalid("expected a comma-separated list of class codes"))?;
            }
            ExportNamePrefix => config.export.name_prefix = required()?,
            ExportScale => {
                config.export.scale = value
                    .parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite() && *s > 0.0)
                    .ok_or_else(|| invalid("expected a positive number of meters"))?;
            }
            ExportFolder => config.export.folder = required()?,
            ExportMaxPixels => {
                config.export.max_pixels = parse_pixel_count(value)
                    .ok_or_else(|| invalid("expected a positive pixel count"))?;
            }
            ExportFileFormat => {
                config.export.file_format = value
                    .parse::<FileFormat>()
                    .map_err(|e| invalid(e.as_str()))?;
            }
            LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid("expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
            LoggingFile => config.logging.file = non_empty(value).map(PathBuf::from),
        }

        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .find(|key| key.name() == wanted)
            .copied()
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a non-empty, comma-separated list.
fn parse_list<T: FromStr>(value: &str) -> Option<Vec<T>> {
    let items = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().ok())
        .collect::<Option<Vec<T>>>()?;
    (!items.is_empty()).then_some(items)
}

/// Parse a pixel count given as an integer or in scientific notation (`1e13`).
fn parse_pixel_count(value: &str) -> Option<u64> {
    if let Ok(count) = value.parse::<u64>() {
        return (count > 0).then_some(count);
    }

    let count = value.parse::<f64>().ok()?;
    (count.is_finite() && count >= 1.0 && count.fract() == 0.0 && count <= u64::MAX as f64)
        .then_some(count as u64)
}
