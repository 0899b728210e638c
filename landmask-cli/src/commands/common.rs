//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use landmask::catalog::Year;
use landmask::config::ConfigFile;
use landmask::driver::{BoundInputs, InputSpec, Workflow};
use landmask::platform::{LocalFeatureSource, ReqwestClient, RestPlatform};

use crate::error::CliError;

/// Resolve workflow inputs from CLI args and config.
///
/// CLI values take precedence over the config file.
pub fn resolve_inputs(
    config: &ConfigFile,
    polygons_file: Option<&PathBuf>,
    years: Option<Vec<Year>>,
) -> InputSpec {
    let mut spec = InputSpec::from_config(config);
    if let Some(path) = polygons_file {
        spec = spec.with_polygons(path.display().to_string());
    }
    if let Some(years) = years {
        spec = spec.with_years(years);
    }
    spec
}

/// Build the REST platform client from config.
pub fn platform(config: &ConfigFile) -> Result<RestPlatform<ReqwestClient>, CliError> {
    let http = ReqwestClient::from_config(&config.platform)?;
    Ok(RestPlatform::new(http, &config.platform))
}

/// Bind inputs from a local file when given, the platform otherwise.
pub async fn bind_inputs(
    platform: &RestPlatform<ReqwestClient>,
    spec: &InputSpec,
    local: bool,
) -> Result<BoundInputs, CliError> {
    let inputs = if local {
        Workflow::bind(&LocalFeatureSource::new(), spec).await?
    } else {
        Workflow::bind(platform, spec).await?
    };
    Ok(inputs)
}
